//! Command-line entry point for the export pipeline.
//!
//! Reads an annotation list from a JSON file, runs one export against a
//! local (or rooted) source file, writes the resulting artifacts to an
//! output directory and prints a JSON summary to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cuenote::core::annotations::Annotation;
use cuenote::core::export::{ExportEngine, ExportOutcome, ExportRequest, DEFAULT_SAMPLE_RATE};
use cuenote::core::ffmpeg::FfmpegCli;
use cuenote::core::storage::LocalStorageClient;
use cuenote::core::voice::VoiceTrackFailure;

#[derive(Parser)]
#[command(name = "cuenote", version, about = "Annotated audio export pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a source asset with annotation markers embedded
    Export {
        /// Source audio file (path, or reference under --root)
        #[arg(long)]
        source: String,

        /// JSON file holding the annotation list
        #[arg(long)]
        annotations: PathBuf,

        /// Display title, used for output filenames
        #[arg(long)]
        title: String,

        /// Directory to write artifacts into
        #[arg(long)]
        out: PathBuf,

        /// Directory storage references resolve against
        #[arg(long)]
        root: Option<PathBuf>,

        /// Target sample rate when the source needs normalization
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,
    },
}

/// Summary printed to stdout after a successful export
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportSummary {
    files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<VoiceTrackFailure>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Export {
            source,
            annotations,
            title,
            out,
            root,
            sample_rate,
        } => run_export(source, annotations, title, out, root, sample_rate).await,
    }
}

async fn run_export(
    source: String,
    annotations_path: PathBuf,
    title: String,
    out: PathBuf,
    root: Option<PathBuf>,
    sample_rate: u32,
) -> Result<()> {
    let raw = std::fs::read_to_string(&annotations_path)
        .with_context(|| format!("reading annotations from {}", annotations_path.display()))?;
    let annotations: Vec<Annotation> =
        serde_json::from_str(&raw).context("parsing annotation JSON")?;

    let storage = Arc::new(match root {
        Some(root) => LocalStorageClient::with_root(root),
        None => LocalStorageClient::new(),
    });

    let ffmpeg = Arc::new(FfmpegCli::detect().context("locating ffmpeg/ffprobe")?);
    info!(version = %ffmpeg.info().version, "using system ffmpeg");

    let engine = ExportEngine::new(storage, ffmpeg.clone(), ffmpeg.clone(), ffmpeg);

    let mut request = ExportRequest::new(source, annotations, title);
    request.sample_rate = sample_rate;

    let outcome = engine.export(request).await?;

    std::fs::create_dir_all(&out)
        .with_context(|| format!("creating output directory {}", out.display()))?;

    let summary = match outcome {
        ExportOutcome::Single(artifact) => {
            let path = out.join(&artifact.filename);
            std::fs::write(&path, &artifact.data)
                .with_context(|| format!("writing {}", path.display()))?;
            ExportSummary {
                files: vec![artifact.filename],
                skipped: Vec::new(),
            }
        }
        ExportOutcome::Bundle(bundle) => {
            let mut files = Vec::with_capacity(bundle.files.len());
            for file in &bundle.files {
                let bytes = BASE64
                    .decode(&file.content)
                    .context("decoding bundle file content")?;
                let path = out.join(&file.filename);
                std::fs::write(&path, bytes)
                    .with_context(|| format!("writing {}", path.display()))?;
                files.push(file.filename.clone());
            }
            ExportSummary {
                files,
                skipped: bundle.skipped,
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
