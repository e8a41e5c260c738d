//! Errors at the boundary of the focus pipeline.

/// Why an image could not be scored.
///
/// Callers decide how to map these; [`crate::focus::fail_safe`] turns every
/// variant into the conservative "blurry, score 0" verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FocusError {
    /// The input bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),
    /// A configuration value is out of range.
    #[error("invalid focus configuration: {0}")]
    InvalidConfig(String),
    /// A focus measure came out non-finite.
    #[error("numeric anomaly in {0}")]
    NumericAnomaly(&'static str),
}
