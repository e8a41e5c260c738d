//! Core domain types for focus analysis.

mod config;
mod error;
mod grid;
mod report;
mod result;
mod threshold;

pub use config::{FocusConfig, FocusWeights, PatchGrid};
pub use error::FocusError;
pub use grid::{reflect_101, variance, LuminanceGrid, Rect};
pub use report::{FocusReport, GlobalScore, PatchReport, ScoreResult};
pub use result::{AnalysisResult, ImageDimensions, ImageInfo};
pub use threshold::{intensity_factor, AdaptiveThreshold};
