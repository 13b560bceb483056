pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod sampler;
pub mod sink;
pub mod video;

pub use error::{DecodeError, MetadataError, SampleError};
pub use metadata::VideoMetadata;
pub use sampler::{compute_sample_points, extract_frames, SamplePoint, SamplingPolicy};
pub use video::frame::{ExtractedFrame, FrameSet, SkippedFrame};
pub use video::probe::{probe, ProbeResult};
pub use video::source::{FfmpegVideoSource, SeekableVideoSource};
