//! FFmpeg Transcoding and Probing
//!
//! Normalizes arbitrary input codecs to canonical PCM WAV and probes
//! media duration via ffprobe. Both operate on in-memory buffers,
//! staging them through UUID-named temp files that are removed on
//! every exit path.

use async_trait::async_trait;

use crate::core::process::configure_tokio_command;
use crate::core::{ExportError, ExportResult, TimeSec};

use super::{scratch_path, FfmpegCli, Prober, TempFileGuard, Transcoder};

#[async_trait]
impl Transcoder for FfmpegCli {
    async fn normalize(&self, input: &[u8], sample_rate: u32) -> ExportResult<Vec<u8>> {
        let input_path = scratch_path("input")?;
        let output_path = scratch_path("wav")?;
        let _input_guard = TempFileGuard(input_path.clone());
        let _output_guard = TempFileGuard(output_path.clone());

        tokio::fs::write(&input_path, input).await?;

        let mut cmd = tokio::process::Command::new(&self.info.ffmpeg_path);
        configure_tokio_command(&mut cmd);
        let output = cmd
            .args([
                "-i",
                &input_path.to_string_lossy(),
                "-ar",
                &sample_rate.to_string(),
                "-ac",
                "2", // stereo
                "-c:a",
                "pcm_s16le", // 16-bit PCM
                "-y",
                &output_path.to_string_lossy(),
            ])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::Transcode(stderr.trim().to_string()));
        }

        let normalized = tokio::fs::read(&output_path).await?;
        tracing::debug!(
            input_len = input.len(),
            output_len = normalized.len(),
            sample_rate,
            "normalized source to canonical WAV"
        );
        Ok(normalized)
    }
}

#[async_trait]
impl Prober for FfmpegCli {
    async fn duration_sec(&self, media: &[u8]) -> ExportResult<TimeSec> {
        let input_path = scratch_path("media")?;
        let _input_guard = TempFileGuard(input_path.clone());

        tokio::fs::write(&input_path, media).await?;

        let mut cmd = tokio::process::Command::new(&self.info.ffprobe_path);
        configure_tokio_command(&mut cmd);
        let output = cmd
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                &input_path.to_string_lossy(),
            ])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::Probe(stderr.trim().to_string()));
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses `format.duration` out of ffprobe JSON output.
fn parse_duration(json_str: &str) -> ExportResult<TimeSec> {
    let json: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| ExportError::Probe(format!("failed to parse ffprobe output: {e}")))?;

    json.get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|s| s.parse::<TimeSec>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ExportError::Probe("ffprobe output carries no duration".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_from_ffprobe_json() {
        let json = r#"{
            "format": {
                "duration": "183.4266",
                "format_name": "wav",
                "size": "32342044"
            }
        }"#;

        let duration = parse_duration(json).unwrap();
        assert!((duration - 183.4266).abs() < 1e-9);
    }

    #[test]
    fn missing_duration_is_a_probe_error() {
        let err = parse_duration(r#"{"format": {"format_name": "wav"}}"#).unwrap_err();
        assert!(matches!(err, ExportError::Probe(_)));
    }

    #[test]
    fn malformed_json_is_a_probe_error() {
        let err = parse_duration("not json").unwrap_err();
        assert!(matches!(err, ExportError::Probe(_)));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = parse_duration(r#"{"format": {"duration": "-1.0"}}"#).unwrap_err();
        assert!(matches!(err, ExportError::Probe(_)));
    }
}
