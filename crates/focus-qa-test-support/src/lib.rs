//! Fixtures shared by the focus-qa test suites: recording port mocks and
//! images whose verdict is known in advance.
//!
//! # Example
//!
//! ```
//! use focus_qa_test_support::{MockImageSource, SyntheticImageBuilder};
//!
//! let sharp = SyntheticImageBuilder::checkerboard(128, 128);
//! let blurry = SyntheticImageBuilder::gaussian_blurred(&sharp, 4.0);
//!
//! let source = MockImageSource::new(vec![sharp, blurry]);
//! ```

mod builders;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use mocks::{MockImageSource, MockProgressSink, MockResultOutput};
