//! Periodic frame sampling: decide which frame indices to pull from a video,
//! then pull them from a seekable source.
//!
//! `compute_sample_points` is a pure function of its inputs and performs no
//! I/O; `extract_frames` does the decoding and degrades per-frame failures
//! into a skip list instead of aborting.

use tracing::{debug, info, warn};

use crate::error::SampleError;
use crate::metadata::VideoMetadata;
use crate::video::frame::{ExtractedFrame, FrameSet, SkippedFrame};
use crate::video::source::SeekableVideoSource;

/// Rule determining which timestamps of a video are sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPolicy {
    /// Seconds between sampled timestamps. Must be positive and finite.
    pub interval_seconds: f64,
}

impl SamplingPolicy {
    pub fn every_seconds(interval_seconds: f64) -> Self {
        Self { interval_seconds }
    }

    fn validate(&self) -> Result<(), SampleError> {
        if self.interval_seconds > 0.0 && self.interval_seconds.is_finite() {
            Ok(())
        } else {
            Err(SampleError::InvalidInterval {
                interval_seconds: self.interval_seconds,
            })
        }
    }
}

/// One planned sample: the frame index to decode and the policy timestamp
/// that selected it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub index: u32,
    pub timestamp_seconds: f64,
}

/// Compute the deterministic set of frame indices to extract.
///
/// Timestamps are `0, interval, 2*interval, ...` strictly below the video's
/// duration; each maps to index `floor(fps * t)`, clamped to
/// `[0, total_frames - 1]`. Timestamps that clamp to an already-emitted index
/// (low frame rates, or intervals much shorter than a frame) are collapsed,
/// so the result is strictly ascending with no duplicates. A video shorter
/// than one interval still yields the sample at `t = 0`; an empty video
/// yields nothing.
pub fn compute_sample_points(
    metadata: &VideoMetadata,
    policy: &SamplingPolicy,
) -> Result<Vec<SamplePoint>, SampleError> {
    policy.validate()?;
    let duration = metadata
        .duration_seconds()
        .ok_or(SampleError::UndefinedDuration { fps: metadata.fps })?;

    if metadata.total_frames == 0 {
        debug!("source has no frames, nothing to sample");
        return Ok(Vec::new());
    }

    let max_index = metadata.total_frames - 1;
    let mut points = Vec::new();
    let mut next_index: u32 = 0;

    // Advance by index, not by timestamp: jump straight to the first interval
    // multiple that reaches the next unseen index. Stepping one timestamp at a
    // time would take duration/interval iterations, which is unbounded for
    // tiny intervals even though every collapsed step discards its point.
    loop {
        // First multiple of the interval at or past next_index's timestamp.
        let step = ((next_index as f64 / metadata.fps) / policy.interval_seconds).ceil();
        let t = step * policy.interval_seconds;
        if t >= duration {
            break;
        }

        // The quotient above can round a hair low, landing one sample early;
        // the real timestamp is at or past next_index, so clamp up to it.
        let index = ((metadata.fps * t).floor() as u64)
            .clamp(next_index as u64, max_index as u64) as u32;

        points.push(SamplePoint {
            index,
            timestamp_seconds: t,
        });
        if index == max_index {
            break;
        }
        next_index = index + 1;
    }

    debug!(
        sample_count = points.len(),
        total_frames = metadata.total_frames,
        interval_seconds = policy.interval_seconds,
        "sample plan computed"
    );
    Ok(points)
}

/// Decode the frames at the given indices from a seekable source.
///
/// `indices` must be sorted ascending with no duplicates, which
/// [`compute_sample_points`] guarantees for its output. The source is
/// explicitly re-positioned before every read. A frame that fails to decode
/// is recorded in the result's skip list and extraction continues; only
/// contract violations (`fps <= 0`) abort the call. An empty index list
/// returns an empty [`FrameSet`] without touching the source.
pub fn extract_frames<S: SeekableVideoSource>(
    source: &mut S,
    fps: f64,
    indices: &[u32],
) -> Result<FrameSet, SampleError> {
    if !(fps > 0.0) || !fps.is_finite() {
        return Err(SampleError::UndefinedDuration { fps });
    }
    assert!(
        indices.windows(2).all(|w| w[0] < w[1]),
        "indices must be sorted ascending with no duplicates"
    );

    let mut set = FrameSet::default();

    for &index in indices {
        source.seek(index);
        match source.read_current() {
            Ok(image) => {
                let timestamp_seconds = index as f64 / fps;
                debug!(index, timestamp_seconds, "frame decoded");
                set.frames.push(ExtractedFrame {
                    image,
                    index,
                    timestamp_seconds,
                });
            }
            Err(reason) => {
                warn!(index, %reason, "frame decode failed, skipping");
                set.skipped.push(SkippedFrame { index, reason });
            }
        }
    }

    info!(
        decoded = set.frames.len(),
        skipped = set.skipped.len(),
        "extraction finished"
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use image::RgbImage;
    use tracing_test::traced_test;

    fn meta(total_frames: u32, fps: f64) -> VideoMetadata {
        VideoMetadata { total_frames, fps }
    }

    fn indices(points: &[SamplePoint]) -> Vec<u32> {
        points.iter().map(|p| p.index).collect()
    }

    fn timestamps(points: &[SamplePoint]) -> Vec<f64> {
        points.iter().map(|p| p.timestamp_seconds).collect()
    }

    /// A scripted in-memory source: `None` entries fail to decode.
    struct ScriptedSource {
        frames: Vec<Option<RgbImage>>,
        cursor: u32,
        reads: u32,
        seeks: Vec<u32>,
    }

    impl ScriptedSource {
        fn new(total: u32, failing: &[u32]) -> Self {
            let frames = (0..total)
                .map(|i| {
                    if failing.contains(&i) {
                        None
                    } else {
                        Some(RgbImage::new(4, 4))
                    }
                })
                .collect();
            Self {
                frames,
                cursor: 0,
                reads: 0,
                seeks: Vec::new(),
            }
        }
    }

    impl SeekableVideoSource for ScriptedSource {
        fn seek(&mut self, index: u32) {
            self.seeks.push(index);
            self.cursor = index;
        }

        fn read_current(&mut self) -> Result<RgbImage, DecodeError> {
            self.reads += 1;
            match self.frames.get(self.cursor as usize) {
                Some(Some(img)) => Ok(img.clone()),
                Some(None) => Err(DecodeError::Backend("scripted failure".into())),
                None => Err(DecodeError::PastEndOfStream { index: self.cursor }),
            }
        }
    }

    #[test]
    fn one_sample_per_second_at_30fps() {
        let points = compute_sample_points(
            &meta(300, 30.0),
            &SamplingPolicy::every_seconds(1.0),
        )
        .unwrap();
        assert_eq!(indices(&points), vec![0, 30, 60, 90, 120, 150, 180, 210, 240, 270]);
        assert_eq!(timestamps(&points)[1], 1.0);
    }

    #[test]
    fn end_of_video_is_exclusive() {
        // duration 10s: t=6 is in, t=12 is not.
        let points = compute_sample_points(
            &meta(100, 10.0),
            &SamplingPolicy::every_seconds(6.0),
        )
        .unwrap();
        assert_eq!(timestamps(&points), vec![0.0, 6.0]);

        // interval longer than the whole video: exactly one sample at t=0.
        let points = compute_sample_points(
            &meta(100, 10.0),
            &SamplingPolicy::every_seconds(11.0),
        )
        .unwrap();
        assert_eq!(timestamps(&points), vec![0.0]);
        assert_eq!(indices(&points), vec![0]);
    }

    #[test]
    fn exact_multiple_does_not_sample_the_end() {
        // duration exactly 10s with interval 5s: t=10 equals the duration
        // and must not be sampled.
        let points = compute_sample_points(
            &meta(100, 10.0),
            &SamplingPolicy::every_seconds(5.0),
        )
        .unwrap();
        assert_eq!(timestamps(&points), vec![0.0, 5.0]);
    }

    #[test]
    fn empty_video_yields_no_samples() {
        let points = compute_sample_points(
            &meta(0, 30.0),
            &SamplingPolicy::every_seconds(1.0),
        )
        .unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn indices_stay_within_frame_count() {
        let metadata = meta(100, 30.0);
        let points = compute_sample_points(
            &metadata,
            &SamplingPolicy::every_seconds(0.5),
        )
        .unwrap();
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.index <= 99));
    }

    #[test]
    fn low_fps_duplicates_are_collapsed() {
        // 1 fps, 3 frames, sampled every 0.4s: floor(t) repeats.
        let points = compute_sample_points(
            &meta(3, 1.0),
            &SamplingPolicy::every_seconds(0.4),
        )
        .unwrap();
        let idx = indices(&points);
        assert_eq!(idx, vec![0, 1, 2]);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sub_frame_interval_plans_every_frame_promptly() {
        // duration / interval is ~1e13 timestamps; the plan must not walk
        // them one by one, and the step counter must not wrap.
        let points = compute_sample_points(
            &meta(100, 10.0),
            &SamplingPolicy::every_seconds(1e-12),
        )
        .unwrap();
        assert_eq!(indices(&points), (0u32..=99).collect::<Vec<_>>());
        assert!(points
            .windows(2)
            .all(|w| w[0].timestamp_seconds < w[1].timestamp_seconds));
    }

    #[test]
    fn output_is_deterministic() {
        let metadata = meta(7215, 29.97);
        let policy = SamplingPolicy::every_seconds(3.7);
        let a = compute_sample_points(&metadata, &policy).unwrap();
        let b = compute_sample_points(&metadata, &policy).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn positive_inputs_always_yield_ascending_samples() {
        for &(frames, fps, interval) in &[
            (1u32, 24.0, 10.0),
            (50, 12.5, 0.3),
            (100_000, 60.0, 7.0),
            (2, 0.5, 1.0),
        ] {
            let points = compute_sample_points(
                &meta(frames, fps),
                &SamplingPolicy::every_seconds(interval),
            )
            .unwrap();
            assert!(!points.is_empty(), "frames={frames} fps={fps} interval={interval}");
            assert!(
                points
                    .windows(2)
                    .all(|w| w[0].timestamp_seconds < w[1].timestamp_seconds),
                "timestamps must strictly ascend"
            );
        }
    }

    #[test]
    fn rejects_non_positive_interval() {
        let err = compute_sample_points(&meta(100, 30.0), &SamplingPolicy::every_seconds(0.0))
            .unwrap_err();
        assert!(matches!(err, SampleError::InvalidInterval { .. }));

        let err = compute_sample_points(&meta(100, 30.0), &SamplingPolicy::every_seconds(-1.0))
            .unwrap_err();
        assert!(matches!(err, SampleError::InvalidInterval { .. }));

        let err =
            compute_sample_points(&meta(100, 30.0), &SamplingPolicy::every_seconds(f64::NAN))
                .unwrap_err();
        assert!(matches!(err, SampleError::InvalidInterval { .. }));
    }

    #[test]
    fn rejects_zero_fps() {
        let err = compute_sample_points(&meta(100, 0.0), &SamplingPolicy::every_seconds(1.0))
            .unwrap_err();
        assert!(matches!(err, SampleError::UndefinedDuration { .. }));
    }

    #[test]
    fn extracts_requested_frames_with_timestamps() {
        let mut source = ScriptedSource::new(100, &[]);
        let set = extract_frames(&mut source, 25.0, &[0, 10, 50]).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.skipped.is_empty());
        assert_eq!(set.frames[1].index, 10);
        assert!((set.frames[1].timestamp_seconds - 10.0 / 25.0).abs() < 1e-9);
        assert_eq!(source.seeks, vec![0, 10, 50]);
    }

    #[test]
    fn empty_indices_never_touch_the_source() {
        let mut source = ScriptedSource::new(100, &[]);
        let set = extract_frames(&mut source, 25.0, &[]).unwrap();
        assert!(set.is_empty());
        assert!(set.skipped.is_empty());
        assert_eq!(source.reads, 0);
        assert!(source.seeks.is_empty());
    }

    #[traced_test]
    #[test]
    fn decode_failure_is_isolated_to_its_index() {
        let mut source = ScriptedSource::new(100, &[40]);
        let set = extract_frames(&mut source, 25.0, &[0, 20, 40, 60, 80]).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.skipped.len(), 1);
        assert_eq!(set.requested(), 5);
        assert_eq!(set.skipped[0].index, 40);
        assert_eq!(
            set.frames.iter().map(|f| f.index).collect::<Vec<_>>(),
            vec![0, 20, 60, 80]
        );
        assert!(logs_contain("frame decode failed"));
    }

    #[test]
    fn repeat_extraction_is_idempotent() {
        let mut source = ScriptedSource::new(100, &[]);
        let first = extract_frames(&mut source, 25.0, &[5, 15]).unwrap();
        let second = extract_frames(&mut source, 25.0, &[5, 15]).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(first.frames[0].index, second.frames[0].index);
    }

    #[test]
    fn index_past_stream_end_is_skipped_not_fatal() {
        // Metadata drift: the container claims more frames than decode.
        let mut source = ScriptedSource::new(10, &[]);
        let set = extract_frames(&mut source, 25.0, &[5, 9, 12]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.skipped.len(), 1);
        assert!(matches!(
            set.skipped[0].reason,
            DecodeError::PastEndOfStream { index: 12 }
        ));
    }

    #[test]
    fn extract_rejects_zero_fps() {
        let mut source = ScriptedSource::new(10, &[]);
        let err = extract_frames(&mut source, 0.0, &[0]).unwrap_err();
        assert!(matches!(err, SampleError::UndefinedDuration { .. }));
        assert_eq!(source.reads, 0);
    }
}
