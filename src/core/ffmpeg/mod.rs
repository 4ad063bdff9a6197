//! FFmpeg Integration Module
//!
//! External-tool backends for the three audio operations the pipeline
//! cannot do in-process: normalizing arbitrary codecs to canonical
//! PCM WAV, probing media duration, and placing a voice clip on a
//! silent bed. The core logic only sees the [`Transcoder`], [`Prober`]
//! and [`Mixer`] traits, so a different backend (an in-process audio
//! library, a remote service) can slot in without touching callers.

mod detection;
mod mixer;
mod transcoder;

pub use detection::{detect_system_ffmpeg, FfmpegInfo};

use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::{ExportResult, TimeSec};

/// Normalizes an arbitrary input codec into canonical PCM WAV
/// (16-bit, stereo, caller-chosen sample rate).
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn normalize(&self, input: &[u8], sample_rate: u32) -> ExportResult<Vec<u8>>;
}

/// Reports the duration of a media buffer.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn duration_sec(&self, media: &[u8]) -> ExportResult<TimeSec>;
}

/// Places a clip on a silent full-length bed at a millisecond delay,
/// producing a PCM WAV track equal in duration to the bed.
#[async_trait]
pub trait Mixer: Send + Sync {
    async fn place_clip(
        &self,
        clip: &[u8],
        delay_ms: u64,
        total_duration_sec: TimeSec,
        sample_rate: u32,
    ) -> ExportResult<Vec<u8>>;
}

/// FFmpeg-backed implementation of all three tool traits
#[derive(Clone)]
pub struct FfmpegCli {
    info: std::sync::Arc<FfmpegInfo>,
}

impl FfmpegCli {
    /// Wraps a detected FFmpeg installation
    pub fn new(info: FfmpegInfo) -> Self {
        Self {
            info: std::sync::Arc::new(info),
        }
    }

    /// Detects a system FFmpeg installation and wraps it
    pub fn detect() -> ExportResult<Self> {
        Ok(Self::new(detect_system_ffmpeg()?))
    }

    pub fn info(&self) -> &FfmpegInfo {
        &self.info
    }
}

// =============================================================================
// Scoped Temp Files
// =============================================================================

/// Returns a collision-resistant temp path under the job's scratch
/// directory, creating the directory if needed.
pub(crate) fn scratch_path(extension: &str) -> ExportResult<PathBuf> {
    let dir = std::env::temp_dir().join("cuenote_export");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(format!("{}.{}", uuid::Uuid::new_v4(), extension)))
}

/// Deletes the wrapped path on drop. Cleanup failures are ignored;
/// they must never escalate past the tool boundary.
pub(crate) struct TempFileGuard(pub PathBuf);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.0.exists() {
            let _ = std::fs::remove_file(&self.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_paths_are_unique() {
        let a = scratch_path("wav").unwrap();
        let b = scratch_path("wav").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.extension().unwrap(), "wav");
    }

    #[test]
    fn temp_file_guard_removes_file_on_drop() {
        let path = scratch_path("tmp").unwrap();
        std::fs::write(&path, b"scratch").unwrap();
        {
            let _guard = TempFileGuard(path.clone());
        }
        assert!(!path.exists());
    }

    #[test]
    fn temp_file_guard_tolerates_missing_file() {
        let path = scratch_path("tmp").unwrap();
        // Never created; drop must not panic.
        let _guard = TempFileGuard(path);
    }
}
