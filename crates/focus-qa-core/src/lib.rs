//! Focus QA Core - sharp/blurry classification of still images.
//!
//! The pipeline normalizes an image to a luminance grid, scores it globally
//! (multi-scale Laplacian variance, Tenengrad, high-frequency FFT energy) and
//! per patch, and classifies it as blurry if either verdict says so. Ports
//! define how adapters feed images in and receive verdicts.

pub mod domain;
pub mod focus;
pub mod pipeline;
pub mod ports;

pub use domain::{
    AnalysisResult, FocusConfig, FocusError, FocusReport, FocusWeights, GlobalScore,
    ImageDimensions, ImageInfo, LuminanceGrid, PatchGrid, PatchReport, ScoreResult,
};
pub use focus::{fail_safe, FocusClassifier};
pub use pipeline::{BatchRunner, BatchSummary};
pub use ports::{ImageSource, NoProgress, ProgressEvent, ProgressSink, ResultOutput};
