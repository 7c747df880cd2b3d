//! Error types for scene construction.
//!
//! Geometry and texture builders reject bad input with [`SceneError`]. Everything that touches
//! the GPU or the window returns `anyhow::Result` instead, as there is nothing a caller could do
//! about a missing adapter except give up.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("invalid argument `{what}`: {reason}")]
    InvalidArgument { what: &'static str, reason: String },
    #[error("texture rasterization failed: {0}")]
    Raster(String),
}

impl SceneError {
    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        SceneError::InvalidArgument {
            what,
            reason: reason.into(),
        }
    }
}

/// Rejects zero, negative, NaN and infinite values.
pub(crate) fn ensure_positive(what: &'static str, value: f32) -> Result<f32, SceneError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SceneError::invalid(
            what,
            format!("expected a positive finite number, got {value}"),
        ))
    }
}
