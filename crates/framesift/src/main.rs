mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use prost::Message;
use tracing::{info, warn};

use framesift_core::pipeline::{self, ExtractionSummary, PipelineConfig};
use framesift_core::video::probe;
use framesift_proto::proto::{ExtractionReport, SampledFrame, SkippedFrame, VideoInfo};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Probe { input } => {
            let info = probe::probe(&input).context("probe failed")?;
            let duration = info
                .metadata
                .duration_seconds()
                .map(|d| format!("{d:.2}s"))
                .unwrap_or_else(|| "undefined".to_string());

            println!("source:       {}", input.display());
            println!("dimensions:   {}x{}", info.width, info.height);
            println!("total frames: {}", info.metadata.total_frames);
            println!("fps:          {:.3}", info.metadata.fps);
            println!("duration:     {duration}");
            Ok(())
        }

        cli::Command::Extract {
            input,
            output_dir,
            interval,
            max_frames,
            annotate,
            report,
        } => {
            info!(?input, ?output_dir, interval, ?max_frames, "starting extraction");

            let config = PipelineConfig {
                interval_seconds: interval,
                max_frames,
                annotate,
                ..Default::default()
            };

            let summary =
                pipeline::run_pipeline(&input, &output_dir, &config).context("pipeline failed")?;

            if !summary.skipped.is_empty() {
                warn!(
                    "{} of {} frames could not be extracted",
                    summary.skipped.len(),
                    summary.requested()
                );
            }

            if let Some(report_path) = report {
                write_report(&summary, &input, &report_path)?;
            }

            info!(
                stored = summary.stored.len(),
                skipped = summary.skipped.len(),
                ?output_dir,
                "extraction complete"
            );

            Ok(())
        }
    }
}

/// Serialize the run summary as length-delimited protobuf and write to file.
fn write_report(summary: &ExtractionSummary, input: &Path, output: &Path) -> Result<()> {
    info!(?output, "writing protobuf report");

    let report = ExtractionReport {
        source_path: input.to_string_lossy().into_owned(),
        video: Some(VideoInfo {
            total_frames: summary.metadata.total_frames,
            fps: summary.metadata.fps,
            duration_seconds: summary.metadata.duration_seconds().unwrap_or(0.0),
        }),
        frames: summary
            .stored
            .iter()
            .map(|f| SampledFrame {
                index: f.index,
                timestamp_seconds: f.timestamp_seconds,
                file_path: f.path.to_string_lossy().into_owned(),
            })
            .collect(),
        skipped: summary
            .skipped
            .iter()
            .map(|(index, reason)| SkippedFrame {
                index: *index,
                reason: reason.clone(),
            })
            .collect(),
    };

    let mut buf = Vec::new();
    report
        .encode_length_delimited(&mut buf)
        .context("failed to encode ExtractionReport")?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).context("failed to create report directory")?;
    }

    std::fs::write(output, &buf)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(?output, bytes = buf.len(), "report written");
    Ok(())
}
