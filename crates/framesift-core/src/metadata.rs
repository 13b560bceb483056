/// Timing metadata of a video source, derived once per source and read-only
/// thereafter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    /// Number of frames in the full decoded sequence.
    pub total_frames: u32,
    /// Frames per second. May be zero or negative for broken containers;
    /// callers must treat the duration as undefined in that case.
    pub fps: f64,
}

impl VideoMetadata {
    /// Duration in seconds, or `None` when the frame rate is non-positive
    /// (dividing by it would be meaningless, not just infinite).
    pub fn duration_seconds(&self) -> Option<f64> {
        if self.fps > 0.0 && self.fps.is_finite() {
            Some(self.total_frames as f64 / self.fps)
        } else {
            None
        }
    }
}
