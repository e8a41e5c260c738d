//! Result output port: where per-image verdicts go.

use crate::domain::AnalysisResult;

/// Consumer of analysis results, called in input order.
pub trait ResultOutput: Send + Sync {
    /// Records the verdict for one image.
    ///
    /// # Errors
    ///
    /// Returns an error if the result cannot be recorded.
    fn write(&self, result: &AnalysisResult) -> anyhow::Result<()>;

    /// Ends the batch: emits anything held back and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the final write or flush fails.
    fn finish(&self) -> anyhow::Result<()>;
}
