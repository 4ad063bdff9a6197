//! Export Orchestration Module
//!
//! Drives one export request end to end: fetch the source, generate
//! markers, embed them (normalizing first when the source is not a
//! WAV), assemble voice tracks, and shape the response. The only
//! component that talks to external collaborators, all of which are
//! injected at construction.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::annotations::Annotation;
use crate::core::ffmpeg::{Mixer, Prober, Transcoder};
use crate::core::markers::{generate_markers, Marker};
use crate::core::storage::StorageClient;
use crate::core::voice::{VoiceTrackAssembler, VoiceTrackFailure};
use crate::core::wav::{embed_markers, is_wave};
use crate::core::{sanitize_filename_component, ExportError, ExportResult, StorageRef};

/// Canonical container MIME type
pub const WAV_MIME: &str = "audio/wav";

/// Default target sample rate when the source has to be normalized
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

// =============================================================================
// Request / Response Types
// =============================================================================

/// One export request
#[derive(Clone, Debug)]
pub struct ExportRequest {
    /// Byte-fetch reference for the source audio asset
    pub source_ref: StorageRef,
    /// Flat annotation list, roots and replies mixed
    pub annotations: Vec<Annotation>,
    /// Display title, used for output filenames
    pub title: String,
    /// Target sample rate for normalization and cue positions
    pub sample_rate: u32,
}

impl ExportRequest {
    pub fn new(source_ref: impl Into<StorageRef>, annotations: Vec<Annotation>, title: impl Into<String>) -> Self {
        Self {
            source_ref: source_ref.into(),
            annotations,
            title: title.into(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Single binary artifact (no voice clips involved)
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Role of a file within a bundle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleFileKind {
    Main,
    Voice,
}

/// One file of a multi-artifact response
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleFile {
    pub filename: String,
    /// Base64-encoded bytes
    pub content: String,
    #[serde(rename = "type")]
    pub kind: BundleFileKind,
}

/// Multi-artifact response: main track plus one file per voice track
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub files: Vec<BundleFile>,
    /// Clips that were skipped (per-clip failures are not fatal)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<VoiceTrackFailure>,
    /// RFC 3339 completion timestamp
    pub exported_at: String,
}

/// What one export produced
#[derive(Clone, Debug)]
pub enum ExportOutcome {
    /// The modified (or passed-through) container alone
    Single(ExportArtifact),
    /// Main track plus synchronized voice tracks
    Bundle(ExportBundle),
}

// =============================================================================
// Export Engine
// =============================================================================

/// Orchestrates one export request at a time; holds no per-request
/// state, so one engine serves concurrent jobs.
pub struct ExportEngine {
    storage: Arc<dyn StorageClient>,
    transcoder: Arc<dyn Transcoder>,
    prober: Arc<dyn Prober>,
    mixer: Arc<dyn Mixer>,
}

impl ExportEngine {
    pub fn new(
        storage: Arc<dyn StorageClient>,
        transcoder: Arc<dyn Transcoder>,
        prober: Arc<dyn Prober>,
        mixer: Arc<dyn Mixer>,
    ) -> Self {
        Self {
            storage,
            transcoder,
            prober,
            mixer,
        }
    }

    /// Runs one export to completion or fatal failure.
    ///
    /// Source retrieval, container parsing and transcoding errors abort
    /// the request; individual voice-clip failures are collected into
    /// the bundle's `skipped` list instead.
    pub async fn export(&self, request: ExportRequest) -> ExportResult<ExportOutcome> {
        info!(
            source_ref = %request.source_ref,
            annotations = request.annotations.len(),
            "starting export"
        );

        let source = self.storage.fetch(&request.source_ref).await?;
        if source.is_empty() {
            return Err(ExportError::UnsupportedSource(format!(
                "{} resolved to zero bytes",
                request.source_ref
            )));
        }

        let markers = generate_markers(&request.annotations);
        debug!(markers = markers.len(), "generated marker sequence");

        let main_track = self.prepare_main_track(source, &markers, request.sample_rate).await?;

        let filename = format!("{}.wav", sanitize_filename_component(&request.title));
        let artifact = ExportArtifact {
            filename,
            mime_type: WAV_MIME.to_string(),
            data: main_track,
        };

        let has_voice_clips = request.annotations.iter().any(Annotation::has_voice_clip);
        if !has_voice_clips {
            info!(filename = %artifact.filename, bytes = artifact.data.len(), "export finished");
            return Ok(ExportOutcome::Single(artifact));
        }

        let assembler = VoiceTrackAssembler::new(
            Arc::clone(&self.storage),
            Arc::clone(&self.prober),
            Arc::clone(&self.mixer),
        );
        let (voice_tracks, skipped) = assembler
            .build_voice_tracks(
                &request.annotations,
                &artifact.data,
                request.sample_rate,
                &request.title,
            )
            .await;

        let mut files = Vec::with_capacity(1 + voice_tracks.len());
        files.push(BundleFile {
            filename: artifact.filename.clone(),
            content: BASE64.encode(&artifact.data),
            kind: BundleFileKind::Main,
        });
        for track in voice_tracks {
            files.push(BundleFile {
                filename: track.filename,
                content: BASE64.encode(&track.data),
                kind: BundleFileKind::Voice,
            });
        }

        info!(
            files = files.len(),
            skipped = skipped.len(),
            "export finished with voice tracks"
        );

        Ok(ExportOutcome::Bundle(ExportBundle {
            files,
            skipped,
            exported_at: chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// Decides the main-track path: pass through, direct embed, or
    /// normalize then embed.
    async fn prepare_main_track(
        &self,
        source: Vec<u8>,
        markers: &[Marker],
        sample_rate: u32,
    ) -> ExportResult<Vec<u8>> {
        if is_wave(&source) {
            if markers.is_empty() {
                debug!("source already canonical and no markers, passing through");
                return Ok(source);
            }
            // Cue positions must match the file's actual rate, not the
            // normalization target. A buffer with WAVE magic but an
            // unreadable header would mislocate every cue, so it is an
            // error rather than a fallback.
            let actual_rate = wav_sample_rate(&source).ok_or_else(|| {
                ExportError::ContainerParse(
                    "could not read the sample rate from the WAVE header".to_string(),
                )
            })?;
            return embed_markers(source, markers, actual_rate);
        }

        debug!("source is not canonical, normalizing before embed");
        let normalized = self.transcoder.normalize(&source, sample_rate).await?;
        embed_markers(normalized, markers, sample_rate)
    }
}

/// Reads the sample rate out of a WAV header.
fn wav_sample_rate(buf: &[u8]) -> Option<u32> {
    hound::WavReader::new(std::io::Cursor::new(buf))
        .ok()
        .map(|r| r.spec().sample_rate)
}
