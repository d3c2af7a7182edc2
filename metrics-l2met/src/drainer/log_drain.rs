use std::{
    fmt,
    io::{self, Write as _},
};

use tracing::debug;

use crate::{DrainError, Drainer, Formatter, L2metFormatter, Metric};

/// Where a [`LogDrain`] writes its lines.
#[derive(Default)]
pub enum LogOutput {
    /// Writes each line to standard output.
    #[default]
    Stdout,

    /// Writes each line to standard error.
    Stderr,

    /// Logs each line via the `log` crate at the given level.
    Log(log::Level),

    /// Hands each line to the given function.
    Func(Box<dyn Fn(&str) + Send + Sync>),
}

impl LogOutput {
    /// Creates an output that hands each line to the given function.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        LogOutput::Func(Box::new(f))
    }

    fn write_line(&self, line: &str) {
        let result = match self {
            LogOutput::Stdout => writeln!(io::stdout().lock(), "{}", line),
            LogOutput::Stderr => writeln!(io::stderr().lock(), "{}", line),
            LogOutput::Log(level) => {
                log::log!(*level, "{}", line);
                Ok(())
            }
            LogOutput::Func(f) => {
                f(line);
                Ok(())
            }
        };

        if let Err(e) = result {
            debug!(error = %e, "failed to write metric line");
        }
    }
}

impl fmt::Debug for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogOutput::Stdout => f.write_str("Stdout"),
            LogOutput::Stderr => f.write_str("Stderr"),
            LogOutput::Log(level) => f.debug_tuple("Log").field(level).finish(),
            LogOutput::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Drains metrics by formatting them and writing one line per metric.
///
/// By default, metrics are formatted with [`L2metFormatter`] and written to standard output. Write
/// failures are swallowed: a `LogDrain` never fails.
#[derive(Debug, Default)]
pub struct LogDrain<F = L2metFormatter> {
    formatter: F,
    output: LogOutput,
}

impl LogDrain {
    /// Creates a new `LogDrain` that writes l2met lines to standard output.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F> LogDrain<F> {
    /// Sets the formatter used to turn metrics into lines.
    pub fn with_formatter<G: Formatter>(self, formatter: G) -> LogDrain<G> {
        LogDrain { formatter, output: self.output }
    }

    /// Sets where lines are written.
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Gets the formatter.
    pub fn formatter(&self) -> &F {
        &self.formatter
    }
}

impl<F: Formatter> Drainer for LogDrain<F> {
    fn drain(&self, metric: Metric) -> Result<(), DrainError> {
        let line = self.formatter.format(&metric);
        self.output.write_line(&line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{LogDrain, LogOutput};
    use crate::{Drainer, L2metFormatter, Metric};

    fn capture() -> (LogOutput, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let output = LogOutput::func(move |line| sink.lock().unwrap().push(line.to_owned()));
        (output, lines)
    }

    #[test]
    fn writes_one_line_per_metric() {
        let (output, lines) = capture();
        let drain = LogDrain::new()
            .with_formatter(L2metFormatter::with_source("web.1"))
            .with_output(output);

        drain.drain(Metric::count("user.signup", 1)).unwrap();
        drain.drain(Metric::measure("request.time.2xx", 12.14, "ms")).unwrap();

        assert_eq!(
            *lines.lock().unwrap(),
            vec![
                "source=web.1 count#user.signup=1".to_owned(),
                "source=web.1 measure#request.time.2xx=12.14ms".to_owned(),
            ]
        );
    }

    #[test]
    fn custom_formatter() {
        let (output, lines) = capture();
        let drain = LogDrain::new()
            .with_formatter(|m: &Metric| format!("{} {}", m.name(), m.value()))
            .with_output(output);

        drain.drain(Metric::sample("goroutine", 12, "")).unwrap();
        assert_eq!(*lines.lock().unwrap(), vec!["goroutine 12".to_owned()]);
    }

    #[test]
    fn stdout_by_default() {
        assert!(matches!(LogOutput::default(), LogOutput::Stdout));
        assert!(matches!(LogDrain::new().output, LogOutput::Stdout));
    }

    #[test]
    fn never_fails() {
        let stdout = LogDrain::new().with_formatter(L2metFormatter::with_source(""));
        assert!(stdout.drain(Metric::count("user.signup", 1)).is_ok());

        let logged = LogDrain::new().with_output(LogOutput::Log(log::Level::Info));
        assert!(logged.drain(Metric::count("user.signup", 1)).is_ok());

        let stderr = LogDrain::new().with_output(LogOutput::Stderr);
        assert!(stderr.drain(Metric::count("user.signup", 1)).is_ok());
    }
}
