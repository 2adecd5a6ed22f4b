use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::SurfaceId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to initialize chart instance on surface {surface}: {reason}")]
    InitializationFailure { surface: SurfaceId, reason: String },

    #[error("engine rejected specification (top-level keys: [{}]): {reason}", top_level_keys.join(", "))]
    UpdateFailure {
        top_level_keys: Vec<String>,
        reason: String,
    },

    #[error("field `{field}` is missing from records (available: [{}])", available.join(", "))]
    FieldMissing {
        field: String,
        available: Vec<String>,
    },

    #[error("resize failed on surface {surface}: {reason}")]
    ResizeFailure { surface: SurfaceId, reason: String },

    #[error("series name `{name}` is declared more than once")]
    DuplicateSeries { name: String },

    #[error("instance handle for surface {surface} is not ready")]
    StaleHandle { surface: SurfaceId },

    #[error("failed to load asset `{url}`: {reason}")]
    AssetLoad { url: String, reason: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ChartError {
    /// Returns `true` when the host may retry on its next layout or update pass.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InitializationFailure { .. }
            | Self::UpdateFailure { .. }
            | Self::FieldMissing { .. }
            | Self::ResizeFailure { .. }
            | Self::DuplicateSeries { .. }
            | Self::AssetLoad { .. } => true,
            Self::StaleHandle { .. } | Self::InvalidData(_) => false,
        }
    }

    /// Builds the fallback state a host renders in place of the chart.
    #[must_use]
    pub fn fallback(&self) -> FallbackState {
        FallbackState {
            message: self.to_string(),
            retryable: self.is_recoverable(),
        }
    }
}

/// Human-readable failure state shown by the host with an optional retry affordance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackState {
    pub message: String,
    pub retryable: bool,
}

/// Failure reported by the external rendering engine.
///
/// Never returned to callers directly: the lifecycle manager wraps it into a
/// [`ChartError`] carrying the surface or specification context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChartError;
    use crate::core::SurfaceId;

    #[test]
    fn field_missing_message_lists_available_fields() {
        let err = ChartError::FieldMissing {
            field: "revenue".to_owned(),
            available: vec!["month".to_owned(), "sales".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "field `revenue` is missing from records (available: [month, sales])"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn stale_handle_is_not_retryable() {
        let fallback = ChartError::StaleHandle {
            surface: SurfaceId::new(3),
        }
        .fallback();
        assert!(!fallback.retryable);
        assert!(fallback.message.contains("surface #3"));
    }
}
