//! Ingestion error types

use thiserror::Error;

/// Depth decode failure
///
/// Every variant leaves the depth store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Encoding tag is not one of the recognized depth encodings
    #[error("unsupported depth encoding '{encoding}'")]
    UnsupportedEncoding {
        /// Tag as received
        encoding: String,
    },

    /// Declared width or height is zero
    #[error("depth image has zero dimension {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    /// Row stride cannot hold one row of samples
    #[error("row step {step} is smaller than the minimum {min_step} bytes")]
    StepTooSmall { step: usize, min_step: usize },

    /// Payload length disagrees with the declared geometry
    #[error("depth payload is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

impl DecodeError {
    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedEncoding { .. } => "unsupported_encoding",
            Self::ZeroDimension { .. } => "zero_dimension",
            Self::StepTooSmall { .. } => "step_too_small",
            Self::SizeMismatch { .. } => "size_mismatch",
        }
    }

    /// Unsupported encodings are expected in mixed deployments; the rest mean
    /// a broken producer.
    pub fn is_unsupported_encoding(&self) -> bool {
        matches!(self, Self::UnsupportedEncoding { .. })
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, DecodeError>;
