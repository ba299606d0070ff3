//! Correlator error types

use contracts::{ContractError, ModelError};
use thiserror::Error;

/// Failure scoped to a single color frame.
///
/// The frame is abandoned; depth state and later frames are unaffected.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Color buffer does not match its declared geometry
    #[error("invalid color frame {frame_id:?}: {message}")]
    InvalidColorFrame {
        frame_id: Option<u64>,
        message: String,
    },

    /// Detection model failed on this frame
    #[error(transparent)]
    ModelInvocation(#[from] ModelError),
}

impl FrameError {
    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidColorFrame { .. } => "invalid_color_frame",
            Self::ModelInvocation(_) => "model_invocation",
        }
    }
}

impl From<ContractError> for FrameError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::InvalidColorFrame { frame_id, message } => {
                Self::InvalidColorFrame { frame_id, message }
            }
            other => Self::InvalidColorFrame {
                frame_id: None,
                message: other.to_string(),
            },
        }
    }
}

/// Correlator Result type alias
pub type Result<T> = std::result::Result<T, FrameError>;
