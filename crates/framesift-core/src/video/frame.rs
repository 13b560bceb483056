use image::RgbImage;

use crate::error::DecodeError;

/// A single decoded video frame with metadata. Immutable once created;
/// ownership passes to the caller of the extraction that produced it.
#[derive(Debug)]
pub struct ExtractedFrame {
    /// The frame's image data.
    pub image: RgbImage,
    /// Absolute frame index from the start of the source (0-based).
    pub index: u32,
    /// Elapsed seconds from the start of the source (`index / fps`).
    pub timestamp_seconds: f64,
}

/// A requested frame index that could not be decoded, with the reason.
#[derive(Debug)]
pub struct SkippedFrame {
    pub index: u32,
    pub reason: DecodeError,
}

/// The result of one extraction call: successfully decoded frames in
/// ascending index order, no duplicate indices, plus the indices that
/// failed to decode.
#[derive(Debug, Default)]
pub struct FrameSet {
    pub frames: Vec<ExtractedFrame>,
    pub skipped: Vec<SkippedFrame>,
}

impl FrameSet {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total number of indices that were requested, decoded or not.
    pub fn requested(&self) -> usize {
        self.frames.len() + self.skipped.len()
    }
}
