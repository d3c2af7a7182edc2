use std::{fmt, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use quanta::Clock;

use crate::{drainer, DrainError, Metric, Timer, Value};

static DEFAULT_NAMESPACE: Lazy<RwLock<Namespace>> = Lazy::new(|| RwLock::new(Namespace::root()));

/// A prefix applied to the name of every metric emitted through it.
///
/// Names are prefixed in the format of `<namespace>.<name>`. The root namespace applies no prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Namespace {
    prefix: Option<Arc<str>>,
}

impl Namespace {
    /// Creates a new `Namespace` with the given prefix.
    ///
    /// An empty prefix yields the root namespace.
    pub fn new<S: AsRef<str>>(prefix: S) -> Self {
        let prefix = prefix.as_ref();
        if prefix.is_empty() {
            Self::root()
        } else {
            Namespace { prefix: Some(Arc::from(prefix)) }
        }
    }

    /// Gets the root namespace.
    pub const fn root() -> Self {
        Namespace { prefix: None }
    }

    /// Returns `true` if this is the root namespace.
    pub fn is_root(&self) -> bool {
        self.prefix.is_none()
    }

    /// Gets the prefix, which is empty for the root namespace.
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }

    /// Creates a namespace nested under this one.
    pub fn child(&self, name: &str) -> Namespace {
        Namespace::new(self.key(name))
    }

    /// Gets the full name of a metric emitted in this namespace.
    pub fn key(&self, name: &str) -> String {
        match &self.prefix {
            None => name.to_owned(),
            Some(prefix) => {
                let mut key = String::with_capacity(prefix.len() + 1 + name.len());
                key.push_str(prefix);
                key.push('.');
                key.push_str(name);
                key
            }
        }
    }

    /// Drains a count metric.
    ///
    /// # Errors
    ///
    /// If the current drainer fails, its error is returned.
    pub fn count<V: Into<Value>>(&self, name: &str, value: V) -> Result<(), DrainError> {
        drainer::drain(Metric::count(self.key(name), value))
    }

    /// Drains a sample metric.
    ///
    /// # Errors
    ///
    /// If the current drainer fails, its error is returned.
    pub fn sample<V: Into<Value>>(
        &self,
        name: &str,
        value: V,
        units: &str,
    ) -> Result<(), DrainError> {
        drainer::drain(Metric::sample(self.key(name), value, units))
    }

    /// Drains a measure metric.
    ///
    /// # Errors
    ///
    /// If the current drainer fails, its error is returned.
    pub fn measure<V: Into<Value>>(
        &self,
        name: &str,
        value: V,
        units: &str,
    ) -> Result<(), DrainError> {
        drainer::drain(Metric::measure(self.key(name), value, units))
    }

    /// Starts a timer in this namespace.
    pub fn time(&self, name: &str) -> Timer {
        Timer::new(self.key(name))
    }

    /// Starts a timer in this namespace, reading time from the given clock.
    pub fn time_with_clock(&self, name: &str, clock: Clock) -> Timer {
        Timer::with_clock(self.key(name), clock)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl From<&str> for Namespace {
    fn from(prefix: &str) -> Self {
        Namespace::new(prefix)
    }
}

impl From<String> for Namespace {
    fn from(prefix: String) -> Self {
        Namespace::new(prefix)
    }
}

/// Sets the namespace used by the free functions.
pub fn set_default_namespace<N: Into<Namespace>>(namespace: N) {
    *DEFAULT_NAMESPACE.write() = namespace.into();
}

/// Gets the namespace used by the free functions.
pub fn default_namespace() -> Namespace {
    DEFAULT_NAMESPACE.read().clone()
}

/// Drains a count metric in the default namespace.
///
/// # Errors
///
/// If the current drainer fails, its error is returned.
pub fn count<V: Into<Value>>(name: &str, value: V) -> Result<(), DrainError> {
    default_namespace().count(name, value)
}

/// Drains a sample metric in the default namespace.
///
/// # Errors
///
/// If the current drainer fails, its error is returned.
pub fn sample<V: Into<Value>>(name: &str, value: V, units: &str) -> Result<(), DrainError> {
    default_namespace().sample(name, value, units)
}

/// Drains a measure metric in the default namespace.
///
/// # Errors
///
/// If the current drainer fails, its error is returned.
pub fn measure<V: Into<Value>>(name: &str, value: V, units: &str) -> Result<(), DrainError> {
    default_namespace().measure(name, value, units)
}

/// Starts a timer in the default namespace.
pub fn time(name: &str) -> Timer {
    default_namespace().time(name)
}
