//! The focus measurement pipeline.
//!
//! Preprocessing normalizes the input to a luminance grid; the global and
//! patch scorers read that grid independently; the classifier ORs their
//! verdicts.

mod classifier;
pub mod fft;
pub mod global;
pub mod laplacian;
pub mod patch;
pub mod preprocess;
pub mod tenengrad;

pub use classifier::{fail_safe, FocusClassifier};
pub use global::score_global;
pub use patch::score_patches;
pub use preprocess::normalize;
