use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::Rgb;
use imageproc::drawing::draw_text_mut;
use tracing::{debug, info, warn};

use crate::video::frame::ExtractedFrame;

const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

const TEXT_SCALE: f32 = 28.0;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_LINE_HEIGHT: i32 = 30;

/// Writes extracted frames as JPEG files into a directory, optionally
/// stamping index and timestamp text onto each image.
///
/// This is a persistence collaborator of the sampler, not part of it: the
/// sampler hands frames out and never touches the filesystem itself.
pub struct DirectorySink {
    dir: PathBuf,
    font: Option<FontVec>,
    annotate: bool,
}

impl DirectorySink {
    pub fn new(dir: &Path, annotate: bool) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        info!(?dir, annotate, "frame sink ready");

        let font = if annotate { load_font() } else { None };
        Ok(Self {
            dir: dir.to_path_buf(),
            font,
            annotate,
        })
    }

    /// Write one frame, returning the path it was stored at.
    pub fn store(&self, frame: &ExtractedFrame) -> Result<PathBuf> {
        let path = self.dir.join(frame_file_name(frame.index));

        if self.annotate {
            let mut img = frame.image.clone();
            self.draw_label(&mut img, frame);
            img.save(&path)
                .with_context(|| format!("failed to save frame to {}", path.display()))?;
        } else {
            frame
                .image
                .save(&path)
                .with_context(|| format!("failed to save frame to {}", path.display()))?;
        }

        debug!(?path, index = frame.index, "frame stored");
        Ok(path)
    }

    fn draw_label(&self, img: &mut image::RgbImage, frame: &ExtractedFrame) {
        let Some(font) = &self.font else { return };
        let scale = PxScale::from(TEXT_SCALE);
        let x = 10;
        let mut y = 10;

        let header = format!("F:{}", frame.index);
        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &header);
        y += TEXT_LINE_HEIGHT;

        let ts = format!("T:{:.2}s", frame.timestamp_seconds);
        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &ts);
    }
}

fn frame_file_name(index: u32) -> String {
    format!("frame_{index:08}.jpg")
}

fn load_font() -> Option<FontVec> {
    for path in FONT_PATHS {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(_) => continue,
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                info!(path, "loaded annotation font");
                return Some(font);
            }
            Err(e) => {
                warn!(path, error = %e, "failed to parse font file");
            }
        }
    }
    warn!("no annotation font found, frames will be saved without labels");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_zero_padded_by_index() {
        assert_eq!(frame_file_name(0), "frame_00000000.jpg");
        assert_eq!(frame_file_name(1234), "frame_00001234.jpg");
    }
}
