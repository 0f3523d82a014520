//! Shape Derivation
//!
//! Pure geometry for each feature kind. Every function maps a kind's input
//! parameters (and, for dimensions, already-resolved reference points) to
//! its derived geometry. Nothing in here knows about properties or the
//! document graph.

pub mod circle;
pub mod dimension;
pub mod format;
pub mod line;
pub mod polygon;
pub mod rectangle;
pub mod text;

use thiserror::Error;

pub use format::{FormatError, format_value};

/// Errors raised by shape derivation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid format specification '{spec}': {source}")]
    InvalidFormat {
        spec: String,
        #[source]
        source: FormatError,
    },
}

/// Result type for shape derivation
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Fail with `InvalidGeometry` unless `value` is finite
pub(crate) fn ensure_finite(name: &str, value: f64) -> ShapeResult<()> {
    if !value.is_finite() {
        return Err(ShapeError::InvalidGeometry(format!("{name} is not finite")));
    }
    Ok(())
}

/// Fail with `InvalidGeometry` unless `value` is a finite, non-negative length
pub(crate) fn ensure_length(name: &str, value: f64) -> ShapeResult<()> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(ShapeError::InvalidGeometry(format!(
            "{name} must not be negative (got {value})"
        )));
    }
    Ok(())
}
