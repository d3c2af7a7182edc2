use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::{
    drainer::set_global_drainer_arc, namespace::set_default_namespace, Drainer, LogDrain,
    LogOutput, Namespace, NullDrain,
};

static SOURCE: Lazy<RwLock<Option<Arc<str>>>> = Lazy::new(|| RwLock::new(None));

/// Sets the global source.
///
/// The source identifies where metrics come from, such as a host or dyno name. Formatters prefix
/// their output with `source=<source> ` and name templates expose it as `{{.Source}}`. Setting an
/// empty source clears it.
pub fn set_source<S: Into<String>>(source: S) {
    let source = source.into();
    let source = if source.is_empty() { None } else { Some(Arc::from(source)) };
    *SOURCE.write() = source;
}

/// Clears the global source.
pub fn clear_source() {
    *SOURCE.write() = None;
}

/// Gets the global source, if one is set.
pub fn source() -> Option<Arc<str>> {
    SOURCE.read().clone()
}

/// Builder for the process-wide metrics configuration.
///
/// Anything left unset is left as it is when the configuration is installed.
#[derive(Default)]
pub struct Builder {
    source: Option<String>,
    namespace: Option<Namespace>,
    drainer: Option<Arc<dyn Drainer>>,
}

impl Builder {
    /// Creates a new, empty `Builder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source. An empty source clears it.
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the namespace used by the free functions [`count`][crate::count],
    /// [`sample`][crate::sample], [`measure`][crate::measure], and [`time`][crate::time].
    pub fn with_namespace<N: Into<Namespace>>(mut self, namespace: N) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Drains metrics as l2met lines to the given output.
    pub fn with_log_output(self, output: LogOutput) -> Self {
        self.with_drainer(LogDrain::new().with_output(output))
    }

    /// Discards all metrics.
    pub fn with_null_drain(self) -> Self {
        self.with_drainer(NullDrain)
    }

    /// Drains metrics to the given drainer.
    pub fn with_drainer<D: Drainer + 'static>(mut self, drainer: D) -> Self {
        self.drainer = Some(Arc::new(drainer));
        self
    }

    /// Installs this configuration globally.
    pub fn install(self) {
        if let Some(source) = self.source {
            set_source(source);
        }

        if let Some(namespace) = self.namespace {
            debug!(namespace = %namespace, "installing default namespace");
            set_default_namespace(namespace);
        }

        if let Some(drainer) = self.drainer {
            set_global_drainer_arc(drainer);
        }
    }
}
