use std::fmt::Write as _;

use crate::{config, Metric};

/// Formats a metric into a single line of text.
pub trait Formatter: Send + Sync {
    /// Formats the metric.
    fn format(&self, metric: &Metric) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&Metric) -> String + Send + Sync,
{
    fn format(&self, metric: &Metric) -> String {
        self(metric)
    }
}

/// Formats metrics in the [l2met] format:
///
/// ```text
/// count#user.signup=1
/// measure#request.time=6ms
/// source=web.1 sample#goroutine=12
/// ```
///
/// Unless a source is given explicitly, the globally configured source is used.
///
/// [l2met]: https://github.com/ryandotsmith/l2met
#[derive(Clone, Debug, Default)]
pub struct L2metFormatter {
    source: Option<String>,
}

impl L2metFormatter {
    /// Creates a new `L2metFormatter` that uses the global source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `L2metFormatter` with a fixed source.
    pub fn with_source<S: Into<String>>(source: S) -> Self {
        L2metFormatter { source: Some(source.into()) }
    }
}

impl Formatter for L2metFormatter {
    fn format(&self, metric: &Metric) -> String {
        match &self.source {
            Some(source) => format_l2met(metric, Some(source)),
            None => format_l2met(metric, config::source().as_deref()),
        }
    }
}

/// Formats a metric in the l2met format, prefixed with `source=<source> ` if the source is
/// non-empty.
pub fn format_l2met(metric: &Metric, source: Option<&str>) -> String {
    let mut out = String::with_capacity(metric.name().len() + metric.units().len() + 24);
    if let Some(source) = source.filter(|s| !s.is_empty()) {
        let _ = write!(out, "source={} ", source);
    }
    let _ = write!(out, "{}", metric);
    out
}

#[cfg(test)]
mod tests {
    use super::{format_l2met, Formatter, L2metFormatter};
    use crate::{Metric, MetricKind};
    use proptest::prelude::*;

    #[test]
    fn basic() {
        let cases = [
            (Metric::measure("request.time", 120.12, "ms"), "measure#request.time=120.12ms"),
            (Metric::count("goroutine", 1), "count#goroutine=1"),
            (Metric::sample("memory.heap", 1024u64, "bytes"), "sample#memory.heap=1024bytes"),
            (Metric::count("cache.evictions", -3), "count#cache.evictions=-3"),
            (Metric::measure("request.time", 12.14f32, "ms"), "measure#request.time=12.14ms"),
            (Metric::sample("cpu.idle", 1e-7, ""), "sample#cpu.idle=1e-07"),
        ];

        for (metric, expected) in cases {
            assert_eq!(format_l2met(&metric, None), expected);
        }
    }

    #[test]
    fn source_prefix() {
        let metric = Metric::count("user.signup", 1);
        assert_eq!(format_l2met(&metric, Some("web.1")), "source=web.1 count#user.signup=1");
        assert_eq!(format_l2met(&metric, Some("")), "count#user.signup=1");

        let formatter = L2metFormatter::with_source("worker");
        assert_eq!(formatter.format(&metric), "source=worker count#user.signup=1");
    }

    #[test]
    fn closures_are_formatters() {
        let formatter = |m: &Metric| format!("{}={}", m.name(), m.value());
        assert_eq!(formatter.format(&Metric::count("hits", 2)), "hits=2");
    }

    fn kind() -> impl Strategy<Value = MetricKind> {
        prop_oneof![Just(MetricKind::Count), Just(MetricKind::Sample), Just(MetricKind::Measure)]
    }

    proptest! {
        #[test]
        fn deterministic(
            kind in kind(),
            name in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
            value in any::<i64>(),
            units in prop::sample::select(vec!["", "ms", "bytes"]),
            source in proptest::option::of("[a-z0-9.]{1,8}"),
        ) {
            let metric = Metric::new(kind, name.clone(), value, units);
            let first = format_l2met(&metric, source.as_deref());
            let second = format_l2met(&metric, source.as_deref());
            prop_assert_eq!(&first, &second);

            let body = format!("{}#{}={}{}", kind, name, value, units);
            prop_assert!(first.ends_with(&body));
        }
    }
}
