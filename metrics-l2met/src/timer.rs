use std::{fmt, time::Duration};

use once_cell::sync::Lazy;
use quanta::{Clock, Instant};

use crate::{drainer, Metric, MetricKind, TimerError};

static DEFAULT_CLOCK: Lazy<Clock> = Lazy::new(Clock::new);

const UNITS: &str = "ms";

/// Times a piece of code, draining the elapsed time as a measure metric in milliseconds.
///
/// A timer starts running as soon as it is created and can be stopped exactly once: stopping it a
/// second time is an error, as is reading its value before it has been stopped.
///
/// ```
/// # use metrics_l2met::{Timer, LocalStoreDrain, with_local_drainer};
/// # let store = LocalStoreDrain::new();
/// # with_local_drainer(store.clone(), || {
/// let timer = Timer::new("request.time");
/// // ... handle the request ...
/// timer.done().expect("failed to drain timer");
/// # });
/// # assert_eq!(store.get("request.time").len(), 1);
/// ```
pub struct Timer {
    name: String,
    clock: Clock,
    start: Instant,
    end: Option<Instant>,
    value: Option<i64>,
}

impl Timer {
    /// Creates and starts a new `Timer`.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self::with_clock(name, DEFAULT_CLOCK.clone())
    }

    /// Creates and starts a new `Timer` that reads time from the given clock.
    ///
    /// Pass a mocked clock, from [`Clock::mock`], to control elapsed time in tests.
    pub fn with_clock<N: Into<String>>(name: N, clock: Clock) -> Self {
        let start = clock.now();
        Timer { name: name.into(), clock, start, end: None, value: None }
    }

    /// Name of the metric this timer drains.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the timer has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.end.is_some()
    }

    /// Stops the timer, returning the whole number of milliseconds elapsed.
    ///
    /// # Errors
    ///
    /// If the timer has already been stopped, [`TimerError::AlreadyStopped`] is returned and the
    /// timer is left untouched.
    pub fn stop(&mut self) -> Result<i64, TimerError> {
        if self.end.is_some() {
            return Err(TimerError::AlreadyStopped);
        }

        let end = self.clock.now();
        let nanos = end.duration_since(self.start).as_nanos();
        let value = i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX);

        self.end = Some(end);
        self.value = Some(value);
        Ok(value)
    }

    /// Gets the time elapsed between starting and stopping the timer.
    ///
    /// # Errors
    ///
    /// If the timer is still running, [`TimerError::Running`] is returned.
    pub fn elapsed(&self) -> Result<Duration, TimerError> {
        self.end.map(|end| end.duration_since(self.start)).ok_or(TimerError::Running)
    }

    /// Gets the whole number of milliseconds elapsed.
    ///
    /// # Errors
    ///
    /// If the timer is still running, [`TimerError::Running`] is returned.
    pub fn value(&self) -> Result<i64, TimerError> {
        self.value.ok_or(TimerError::Running)
    }

    /// Gets the measure metric for this timer.
    ///
    /// # Errors
    ///
    /// If the timer is still running, [`TimerError::Running`] is returned.
    pub fn metric(&self) -> Result<Metric, TimerError> {
        let value = self.value()?;
        Ok(Metric::new(MetricKind::Measure, self.name.clone(), value, UNITS))
    }

    /// Stops the timer and drains it to the current drainer.
    ///
    /// # Errors
    ///
    /// If the timer has already been stopped, or the drainer fails, an error is returned.
    pub fn done(mut self) -> Result<(), TimerError> {
        self.stop()?;
        drainer::drain(self.metric()?)?;
        Ok(())
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("name", &self.name)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
