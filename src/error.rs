//! Central error type for the viewer core.
//!
//! Format and decode errors are fatal to a load attempt and surface to the
//! caller. Attribute-synthesis degradation is deliberately *not* an error:
//! it is reported as flags on [`crate::synthesis::AttributeReport`] and
//! logged, because a mesh without tangents is still renderable.

use thiserror::Error;

/// Errors surfaced by the lifecycle manager, decoders and the marker.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The URL extension matches no known decoder. Raised before any I/O or
    /// parsing is attempted.
    #[error("unsupported model format: {url}")]
    UnsupportedFormat { url: String },

    /// A decoder rejected the file contents. The previous model has already
    /// been cleared at this point; the manager is back in the empty state.
    #[error("failed to decode model: {reason}")]
    DecodeFailure { reason: String },

    #[error("i/o error while reading model: {0}")]
    Io(#[from] std::io::Error),

    /// Marker positioning was requested for a vertex the surface does not
    /// have. The marker is left untouched.
    #[error("vertex index {index} out of range for surface with {vertex_count} vertices")]
    InvalidVertexIndex { index: usize, vertex_count: usize },
}

impl ViewerError {
    pub fn decode<T: ToString>(reason: T) -> Self {
        ViewerError::DecodeFailure {
            reason: reason.to_string(),
        }
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(e: gltf::Error) -> Self {
        ViewerError::decode(e)
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(e: serde_json::Error) -> Self {
        ViewerError::decode(e)
    }
}
