use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{error, info, warn};

use crate::error::MetadataError;
use crate::metadata::VideoMetadata;

/// Everything ffprobe tells us about a video stream: pixel dimensions for
/// the decoder plus the timing metadata the sampler works from.
#[derive(Debug, Clone, Copy)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
    pub metadata: VideoMetadata,
}

/// Probe a video file with ffprobe.
///
/// Fails with [`MetadataError::Unreadable`] if the source cannot be opened or
/// parsed, and with [`MetadataError::UndefinedFrameRate`] if the container
/// reports a non-positive frame rate. Never returns partial metadata.
pub fn probe(path: &Path) -> Result<ProbeResult, MetadataError> {
    info!(?path, "probing video metadata with ffprobe");

    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height,r_frame_rate,nb_frames",
            "-show_entries", "format=duration",
            "-of", "csv=p=0",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| MetadataError::unreadable(format!("failed to run ffprobe — is ffmpeg installed? ({e})")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(%stderr, ?path, "ffprobe failed");
        return Err(MetadataError::unreadable(format!("ffprobe failed: {}", stderr.trim())));
    }

    // First line: "width,height,num/den,nb_frames", second line: "duration".
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.trim().lines();
    let stream_line = lines
        .next()
        .ok_or_else(|| MetadataError::unreadable("empty ffprobe output"))?;
    let format_line = lines.next();

    let parts: Vec<&str> = stream_line.split(',').collect();
    if parts.len() < 3 {
        error!(%stream_line, "unexpected ffprobe output format, expected width,height,fps,nb_frames");
        return Err(MetadataError::unreadable(format!("unexpected ffprobe output: {stream_line}")));
    }

    let width: u32 = parts[0]
        .parse()
        .map_err(|_| MetadataError::unreadable(format!("failed to parse width: {}", parts[0])))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| MetadataError::unreadable(format!("failed to parse height: {}", parts[1])))?;

    let fps = parse_frame_rate(parts[2])
        .ok_or_else(|| MetadataError::unreadable(format!("failed to parse frame rate: {}", parts[2])))?;
    if fps <= 0.0 || !fps.is_finite() {
        error!(fps, ?path, "source has no usable frame rate");
        return Err(MetadataError::UndefinedFrameRate { fps });
    }

    // nb_frames is "N/A" for many containers; fall back to duration * fps.
    let total_frames = match parts.get(3).and_then(|s| s.parse::<u32>().ok()) {
        Some(n) => n,
        None => {
            let duration: f64 = format_line
                .and_then(|l| l.trim().parse().ok())
                .ok_or_else(|| {
                    MetadataError::unreadable("container reports neither nb_frames nor duration")
                })?;
            let n = (duration * fps).floor() as u32;
            warn!(duration, fps, total_frames = n, "nb_frames missing, derived frame count from duration");
            n
        }
    };

    info!(width, height, fps, total_frames, "probe completed");
    Ok(ProbeResult {
        width,
        height,
        metadata: VideoMetadata { total_frames, fps },
    })
}

/// Parse an ffprobe rate, either "num/den" or a plain number.
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            Some(num / den)
        } else {
            Some(0.0)
        }
    } else {
        s.parse().ok()
    }
}
