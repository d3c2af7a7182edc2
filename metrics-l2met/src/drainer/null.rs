use crate::{DrainError, Drainer, Metric};

/// A no-op drainer.
///
/// Useful for silencing telemetry entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDrain;

impl Drainer for NullDrain {
    fn drain(&self, _metric: Metric) -> Result<(), DrainError> {
        Ok(())
    }
}
