use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::RgbImage;
use tracing::{debug, info, warn};

use super::probe::probe;
use crate::error::{DecodeError, MetadataError};
use crate::metadata::VideoMetadata;

/// Random access to the frames of a video stream.
///
/// Seeking and decoding are blocking, sequential operations; a handle is not
/// meant to be shared across concurrent callers. The caller owns the handle's
/// lifetime — implementations must not require being closed by the sampler.
pub trait SeekableVideoSource {
    /// Position the source at the given frame index. The next
    /// [`read_current`](Self::read_current) decodes exactly that frame.
    fn seek(&mut self, index: u32);

    /// Decode the frame at the current position. Re-reading the same
    /// position yields the same frame.
    fn read_current(&mut self) -> Result<RgbImage, DecodeError>;
}

/// A [`SeekableVideoSource`] backed by the ffmpeg CLI.
///
/// Each read spawns ffmpeg with an accurate `-ss` seek and decodes exactly
/// one raw RGB24 frame from its stdout pipe. Slower than a persistent decode
/// session, but it makes every read independent of decode order, which is
/// what sparse sampling needs.
pub struct FfmpegVideoSource {
    path: PathBuf,
    width: u32,
    height: u32,
    metadata: VideoMetadata,
    frame_bytes: usize,
    cursor: u32,
}

impl FfmpegVideoSource {
    /// Open a video file for random-access decoding. Probes the file once;
    /// the handle holds no child process between reads.
    pub fn open(path: &Path) -> Result<Self, MetadataError> {
        let info = probe(path)?;
        if info.width == 0 || info.height == 0 {
            return Err(MetadataError::unreadable(format!(
                "invalid video dimensions: {}x{}",
                info.width, info.height
            )));
        }

        let frame_bytes = (info.width as usize) * (info.height as usize) * 3;

        info!(
            ?path,
            width = info.width,
            height = info.height,
            fps = info.metadata.fps,
            total_frames = info.metadata.total_frames,
            frame_bytes,
            "video source opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            width: info.width,
            height: info.height,
            metadata: info.metadata,
            frame_bytes,
            cursor: 0,
        })
    }

    pub fn metadata(&self) -> VideoMetadata {
        self.metadata
    }
}

impl SeekableVideoSource for FfmpegVideoSource {
    fn seek(&mut self, index: u32) {
        debug!(index, "seek");
        self.cursor = index;
    }

    fn read_current(&mut self) -> Result<RgbImage, DecodeError> {
        let index = self.cursor;
        let timestamp = index as f64 / self.metadata.fps;

        debug!(index, timestamp, "spawning ffmpeg for single-frame decode");

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-ss"])
            .arg(format!("{timestamp:.6}"))
            .arg("-i")
            .arg(&self.path)
            .args([
                "-frames:v", "1",
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "pipe:1",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DecodeError::Backend(format!("failed to spawn ffmpeg: {e}")))?;

        let stdout = child
            .stdout
            .as_mut()
            .ok_or_else(|| DecodeError::Backend("ffmpeg stdout not available".into()))?;

        let mut buf = vec![0u8; self.frame_bytes];
        let mut read = 0;

        while read < self.frame_bytes {
            match stdout.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DecodeError::Io(e));
                }
            }
        }

        let status = child.wait();

        if read == 0 {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            let stderr = stderr.trim();
            if !stderr.is_empty() {
                warn!(index, %stderr, "ffmpeg produced no frame");
                return Err(DecodeError::Backend(stderr.to_string()));
            }
            return Err(DecodeError::PastEndOfStream { index });
        }

        if read < self.frame_bytes {
            return Err(DecodeError::Truncated {
                read,
                expected: self.frame_bytes,
            });
        }

        if let Ok(status) = status {
            if !status.success() {
                warn!(index, ?status, "ffmpeg exited with failure after full frame read");
            }
        }

        RgbImage::from_raw(self.width, self.height, buf)
            .ok_or_else(|| DecodeError::Backend("raw frame data did not form an image".into()))
    }
}
