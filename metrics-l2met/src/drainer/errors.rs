use thiserror::Error;

use crate::{TemplateError, Value};

/// Opaque error returned by a backend client.
///
/// Drains pass these through verbatim; callers can downcast to the concrete type of their client.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that could occur while draining a metric.
#[derive(Debug, Error)]
pub enum DrainError {
    /// The value could not be presented to a numeric-only backend.
    #[error("value `{value}` must be one of [i8, i16, i32, i64, isize, u8, u16, u32, u64, usize]")]
    ValueInvalid {
        /// The rejected value.
        value: Value,
    },

    /// The unsigned value is too large to be converted to `i64`.
    #[error("value {value} is too large to be converted to i64")]
    ValueOverflow {
        /// The rejected value.
        value: u64,
    },

    /// The metric kind is not one of `count`, `sample`, or `measure`.
    #[error("metric type must be one of [count, sample, measure], got `{kind}`")]
    InvalidMetricType {
        /// The unrecognized kind.
        kind: String,
    },

    /// The wire name of the metric could not be rendered.
    #[error("failed to render metric name: {0}")]
    Template(#[from] TemplateError),

    /// The backend client failed.
    #[error("backend error: {0}")]
    Backend(#[source] BackendError),
}

impl DrainError {
    /// Wraps a backend client error.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BackendError>,
    {
        DrainError::Backend(err.into())
    }
}

/// Errors that could occur while stopping or draining a [`Timer`][crate::Timer].
#[derive(Debug, Error)]
pub enum TimerError {
    /// The timer was stopped more than once.
    #[error("timer has already been stopped")]
    AlreadyStopped,

    /// The value of the timer was read before it was stopped.
    #[error("timer is still running")]
    Running,

    /// Draining the timer failed.
    #[error(transparent)]
    Drain(#[from] DrainError),
}
