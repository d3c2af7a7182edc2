use std::sync::Arc;

use metrics_l2met::{DrainError, Drainer, Metric, MetricKind, NameTemplate, TemplateError};

use crate::StatsdClient;

/// A drainer that forwards metrics to a statsd server.
///
/// For each metric, the drain:
///
/// 1. renders the wire name by executing its [`NameTemplate`] against the metric
/// 2. coerces the value to an `i64`: only integers are accepted
/// 3. dispatches on the kind of metric: counts are increments, samples and measures in `ms` are
///    timings, and all other samples and measures are gauges
///
/// Every failure, including any error from the client, is returned to the caller as-is. Nothing is
/// retried or buffered.
#[derive(Debug)]
pub struct StatsdDrain<C> {
    client: C,
    template: NameTemplate,
    source: Option<Arc<str>>,
}

impl<C: StatsdClient> StatsdDrain<C> {
    /// Creates a new `StatsdDrain` from a client and a name template.
    ///
    /// See [`NameTemplate`] for the fields available to the template.
    ///
    /// # Errors
    ///
    /// If the template cannot be parsed, an error is returned.
    pub fn new(client: C, template: &str) -> Result<Self, TemplateError> {
        Ok(Self::with_template(client, NameTemplate::parse(template)?))
    }

    /// Creates a new `StatsdDrain` from a client and an already parsed name template.
    pub fn with_template(client: C, template: NameTemplate) -> Self {
        StatsdDrain { client, template, source: None }
    }

    /// Sets the source exposed to the template as `{{.Source}}`.
    ///
    /// Defaults to the global source at the time each metric is drained.
    pub fn with_source<S: AsRef<str>>(mut self, source: S) -> Self {
        self.source = Some(Arc::from(source.as_ref()));
        self
    }

    /// Gets a reference to the client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Gets the name template.
    pub fn template(&self) -> &NameTemplate {
        &self.template
    }

    fn name(&self, metric: &Metric) -> Result<String, TemplateError> {
        let source = self.source.clone().or_else(metrics_l2met::source);
        self.template.render(metric, source.as_deref())
    }
}

impl<C: StatsdClient> Drainer for StatsdDrain<C> {
    fn drain(&self, metric: Metric) -> Result<(), DrainError> {
        let name = self.name(&metric)?;
        let value = metric.value().as_i64()?;

        let result = match metric.kind() {
            MetricKind::Count => self.client.incr(&name, value),
            MetricKind::Sample | MetricKind::Measure => {
                if metric.units() == "ms" {
                    self.client.timing(&name, value)
                } else {
                    self.client.gauge(&name, value)
                }
            }
        };

        result.map_err(DrainError::Backend)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fmt,
        sync::{Arc, Mutex},
    };

    use metrics_l2met::{
        with_local_drainer, BackendError, DrainError, Drainer, Metric, Namespace, TemplateError,
    };
    use proptest::prelude::*;

    use super::StatsdDrain;
    use crate::StatsdClient;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        Incr(String, i64),
        Gauge(String, i64),
        Timing(String, i64),
    }

    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingClient {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl StatsdClient for RecordingClient {
        fn incr(&self, name: &str, count: i64) -> Result<(), BackendError> {
            self.calls.lock().unwrap().push(Call::Incr(name.to_owned(), count));
            Ok(())
        }

        fn gauge(&self, name: &str, value: i64) -> Result<(), BackendError> {
            self.calls.lock().unwrap().push(Call::Gauge(name.to_owned(), value));
            Ok(())
        }

        fn timing(&self, name: &str, ms: i64) -> Result<(), BackendError> {
            self.calls.lock().unwrap().push(Call::Timing(name.to_owned(), ms));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Unreachable;

    impl fmt::Display for Unreachable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("statsd server unreachable")
        }
    }

    impl std::error::Error for Unreachable {}

    struct FailingClient;

    impl StatsdClient for FailingClient {
        fn incr(&self, _name: &str, _count: i64) -> Result<(), BackendError> {
            Err(Box::new(Unreachable))
        }

        fn gauge(&self, _name: &str, _value: i64) -> Result<(), BackendError> {
            Err(Box::new(Unreachable))
        }

        fn timing(&self, _name: &str, _ms: i64) -> Result<(), BackendError> {
            Err(Box::new(Unreachable))
        }
    }

    fn recording(template: &str) -> (StatsdDrain<Arc<RecordingClient>>, Arc<RecordingClient>) {
        let client = Arc::new(RecordingClient::default());
        let drain = StatsdDrain::new(client.clone(), template).unwrap().with_source("test");
        (drain, client)
    }

    #[test]
    fn dispatches_by_kind_and_units() {
        let (drain, client) = recording("{{.Name}}");

        drain.drain(Metric::count("user.signup", 1)).unwrap();
        drain.drain(Metric::sample("goroutine", 12, "")).unwrap();
        drain.drain(Metric::sample("memory.heap", 1024u64, "bytes")).unwrap();
        drain.drain(Metric::measure("request.time", 527, "ms")).unwrap();
        drain.drain(Metric::sample("gc.pause", 3u32, "ms")).unwrap();

        assert_eq!(
            client.calls(),
            vec![
                Call::Incr("user.signup".to_owned(), 1),
                Call::Gauge("goroutine".to_owned(), 12),
                Call::Gauge("memory.heap".to_owned(), 1024),
                Call::Timing("request.time".to_owned(), 527),
                Call::Timing("gc.pause".to_owned(), 3),
            ]
        );
    }

    #[test]
    fn name_template() {
        let (drain, client) = recording("{{.Name}}.source__{{.Source}}__");
        drain.drain(Metric::count("requests.count", 1)).unwrap();
        assert_eq!(client.calls(), vec![Call::Incr("requests.count.source__test__".to_owned(), 1)]);
    }

    #[test]
    fn unknown_template_field() {
        let (drain, client) = recording("{{.Name}}.{{.Host}}");
        let err = drain.drain(Metric::count("requests.count", 1)).unwrap_err();
        assert!(matches!(
            err,
            DrainError::Template(TemplateError::UnknownField { ref field }) if field == "Host"
        ));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn malformed_template() {
        let client = RecordingClient::default();
        assert!(matches!(
            StatsdDrain::new(client, "{{.Name"),
            Err(TemplateError::Parse { position: 0, .. })
        ));
    }

    #[test]
    fn overflowing_value() {
        let (drain, client) = recording("{{.Name}}");
        let err = drain.drain(Metric::sample("bytes.total", u64::MAX, "")).unwrap_err();
        assert!(matches!(err, DrainError::ValueOverflow { value } if value == u64::MAX));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn invalid_values() {
        let (drain, client) = recording("{{.Name}}");
        for metric in [
            Metric::measure("request.time", 120.12, "ms"),
            Metric::sample("version", "1.2.3", ""),
            Metric::count("hits", 1.0f32),
        ] {
            let err = drain.drain(metric).unwrap_err();
            assert!(matches!(err, DrainError::ValueInvalid { .. }));
        }
        assert!(client.calls().is_empty());
    }

    #[test]
    fn backend_errors_pass_through() {
        let drain = StatsdDrain::new(FailingClient, "{{.Name}}").unwrap();
        let err = drain.drain(Metric::count("hits", 1)).unwrap_err();
        match err {
            DrainError::Backend(inner) => assert!(inner.downcast_ref::<Unreachable>().is_some()),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn as_the_current_drainer() {
        let (drain, client) = recording("{{.Name}}");
        with_local_drainer(drain, || {
            let memcached = Namespace::new("memcached");
            memcached.count("hits", 1).unwrap();
            memcached.measure("get.time", 4, "ms").unwrap();
        });

        assert_eq!(
            client.calls(),
            vec![
                Call::Incr("memcached.hits".to_owned(), 1),
                Call::Timing("memcached.get.time".to_owned(), 4),
            ]
        );
    }

    proptest! {
        #[test]
        fn forwards_any_integer_width(v in 0u8..=u8::MAX) {
            let (drain, client) = recording("{{.Name}}");
            drain.drain(Metric::count("a", v)).unwrap();
            drain.drain(Metric::count("b", i16::from(v))).unwrap();
            drain.drain(Metric::count("c", u32::from(v))).unwrap();
            drain.drain(Metric::count("d", i64::from(v))).unwrap();
            drain.drain(Metric::count("e", usize::from(v))).unwrap();

            let expected = i64::from(v);
            for call in client.calls() {
                prop_assert!(matches!(call, Call::Incr(_, value) if value == expected));
            }
        }
    }
}
