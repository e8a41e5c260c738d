//! Progress reporting port for UI integration.

use crate::domain::AnalysisResult;

/// Events emitted during analysis for progress tracking.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Analysis started for an image.
    Started {
        /// Path to the image.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total images in batch, if known.
        total: Option<usize>,
    },
    /// Analysis completed for an image.
    Completed {
        /// The analysis result.
        result: AnalysisResult,
    },
    /// An image was skipped because it could not be read.
    Skipped {
        /// Path or position of the image.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All images have been processed.
    Finished {
        /// Images classified (including fail-safe verdicts).
        processed: usize,
        /// Images skipped.
        skipped: usize,
        /// Images classified as sharp.
        sharp: usize,
        /// Images classified as blurry.
        blurry: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that drops every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}
