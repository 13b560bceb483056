use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::metadata::VideoMetadata;
use crate::sampler::{self, SamplePoint, SamplingPolicy};
use crate::sink::DirectorySink;
use crate::video::source::FfmpegVideoSource;

/// Parameters for an extraction run.
pub struct PipelineConfig {
    /// Seconds between sampled frames.
    pub interval_seconds: f64,
    /// Maximum number of frames to sample, or None for the full plan.
    pub max_frames: Option<u32>,
    /// How many frames to decode per extraction batch.
    pub batch_size: usize,
    /// Stamp index and timestamp text onto saved frames.
    pub annotate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 1.0,
            max_frames: None,
            batch_size: 16,
            annotate: false,
        }
    }
}

/// A frame that made it all the way to storage.
#[derive(Debug)]
pub struct StoredFrame {
    pub index: u32,
    pub timestamp_seconds: f64,
    pub path: PathBuf,
}

/// Outcome of one extraction run.
#[derive(Debug)]
pub struct ExtractionSummary {
    pub metadata: VideoMetadata,
    pub stored: Vec<StoredFrame>,
    /// Indices that could not be decoded, with the reason.
    pub skipped: Vec<(u32, String)>,
}

impl ExtractionSummary {
    /// Total number of frames the sample plan requested.
    pub fn requested(&self) -> usize {
        self.stored.len() + self.skipped.len()
    }
}

/// Sample a video at a fixed interval and write the frames as JPEG files.
///
/// Probes the source, computes the sample plan, then decodes in batches of
/// `batch_size`, writing each decoded frame through a [`DirectorySink`].
/// The pipeline owns the source handle for the duration of the run; per-frame
/// decode failures end up in the summary's skip list, everything else is
/// surfaced as an error.
pub fn run_pipeline(
    input: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
) -> Result<ExtractionSummary> {
    if config.batch_size == 0 {
        bail!("batch_size must be >= 1");
    }
    if !input.exists() {
        bail!("input video does not exist: {}", input.display());
    }

    info!(
        ?input,
        ?output_dir,
        interval_seconds = config.interval_seconds,
        max_frames = ?config.max_frames,
        batch_size = config.batch_size,
        "pipeline starting"
    );

    let mut source = FfmpegVideoSource::open(input).context("failed to open video")?;
    let metadata = source.metadata();

    let policy = SamplingPolicy::every_seconds(config.interval_seconds);
    let mut points =
        sampler::compute_sample_points(&metadata, &policy).context("invalid sample plan")?;
    truncate_plan(&mut points, config.max_frames);

    info!(sample_count = points.len(), "sample plan ready");

    let sink = DirectorySink::new(output_dir, config.annotate)?;

    let mut stored = Vec::new();
    let mut skipped = Vec::new();

    for batch in points.chunks(config.batch_size) {
        let indices: Vec<u32> = batch.iter().map(|p| p.index).collect();
        let set = sampler::extract_frames(&mut source, metadata.fps, &indices)
            .context("extraction batch failed")?;

        for frame in &set.frames {
            let path = sink.store(frame)?;
            stored.push(StoredFrame {
                index: frame.index,
                timestamp_seconds: frame.timestamp_seconds,
                path,
            });
        }
        skipped.extend(
            set.skipped
                .into_iter()
                .map(|s| (s.index, s.reason.to_string())),
        );
    }

    info!(
        stored = stored.len(),
        skipped = skipped.len(),
        "pipeline complete"
    );

    Ok(ExtractionSummary {
        metadata,
        stored,
        skipped,
    })
}

/// Keep only the first `max` planned samples.
fn truncate_plan(points: &mut Vec<SamplePoint>, max: Option<u32>) {
    if let Some(max) = max {
        points.truncate(max as usize);
    }
}
