//! Errors.

use thiserror::Error;

/// Errors returned by the engine.
///
/// Everything except [`Error::Config`] is an invalid argument: the call was rejected before any
/// state changed. Ignored and interrupted view changes are not errors; see
/// [`ViewChangeResult`](crate::ViewChangeResult).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{name} must be a finite number (got {value})")]
    NonFinite { name: &'static str, value: f64 },

    #[error("snap point interval must be positive (got {0})")]
    NonPositiveInterval(f64),

    #[error("snap point end ({end}) must be greater than its start ({start})")]
    EmptyRange { start: f64, end: f64 },

    #[error("snap point offset {offset} lies outside of [{start}, {end}]")]
    OffsetOutOfRange { offset: f64, start: f64, end: f64 },

    #[error("snap point applicable range must be positive (got {0})")]
    NonPositiveApplicableRange(f64),

    #[error("snap point overlaps the range of a registered repeated snap point")]
    OverlappingSnapPoint,

    #[error("snap point is already registered in this collection")]
    DuplicateSnapPoint,

    #[error("invalid zoom factor bounds: min {min}, max {max}")]
    InvalidZoomBounds { min: f64, max: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if the call was rejected because of an invalid argument.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, Error::Config(_))
    }

    /// Returns `value` if it is finite.
    pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::NonFinite { name, value })
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
