//! Traits the batch runner talks to; adapters live outside the core.

mod image_source;
mod progress;
mod result_output;

pub use image_source::ImageSource;
pub use progress::{NoProgress, ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
