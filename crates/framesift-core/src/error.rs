use thiserror::Error;

/// Contract violations in sampling inputs. Fatal for the call that raised them.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("sampling interval must be positive and finite, got {interval_seconds}")]
    InvalidInterval { interval_seconds: f64 },

    /// Duration cannot be derived from a non-positive frame rate.
    #[error("frame rate must be positive to define a duration, got {fps}")]
    UndefinedDuration { fps: f64 },
}

/// Failures while probing a video source. Never yields partial metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("source cannot be opened or probed: {0}")]
    Unreadable(String),

    #[error("source reports a non-positive frame rate ({fps})")]
    UndefinedFrameRate { fps: f64 },
}

impl MetadataError {
    pub fn unreadable(reason: impl std::fmt::Display) -> Self {
        MetadataError::Unreadable(reason.to_string())
    }
}

/// Per-frame decode failures. These are recorded in the skip list of a
/// [`FrameSet`](crate::video::frame::FrameSet) and never abort an extraction.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream ended before the requested index, e.g. the container's
    /// frame count overstates the actual stream length.
    #[error("no frame available at index {index}, stream ended early")]
    PastEndOfStream { index: u32 },

    #[error("frame data truncated: read {read} of {expected} bytes")]
    Truncated { read: usize, expected: usize },

    #[error("decoder backend failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
