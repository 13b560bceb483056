use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "framesift", about = "Periodic video frame sampler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Probe a video file and print its metadata.
    Probe {
        /// Path to the video file.
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Sample frames at a fixed interval and write them as JPEG files.
    Extract {
        /// Path to the input video file (MP4, etc.).
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to write sampled frames into.
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Seconds between sampled frames.
        #[arg(long, default_value_t = 1.0)]
        interval: f64,

        /// Stop after this many sampled frames.
        #[arg(long)]
        max_frames: Option<u32>,

        /// Stamp frame index and timestamp onto saved images.
        #[arg(long)]
        annotate: bool,

        /// Path to write a protobuf extraction report.
        #[arg(long)]
        report: Option<PathBuf>,
    },
}
