//! FFmpeg Clip Placement
//!
//! Mixes one voice clip onto a silent full-length stereo bed at a
//! millisecond delay. `anullsrc` provides the bed, `adelay` shifts the
//! clip, and `amix` with `duration=first` keeps the output exactly as
//! long as the bed.

use async_trait::async_trait;

use crate::core::process::configure_tokio_command;
use crate::core::{ExportError, ExportResult, TimeSec};

use super::{scratch_path, FfmpegCli, Mixer, TempFileGuard};

#[async_trait]
impl Mixer for FfmpegCli {
    async fn place_clip(
        &self,
        clip: &[u8],
        delay_ms: u64,
        total_duration_sec: TimeSec,
        sample_rate: u32,
    ) -> ExportResult<Vec<u8>> {
        let clip_path = scratch_path("clip")?;
        let output_path = scratch_path("wav")?;
        let _clip_guard = TempFileGuard(clip_path.clone());
        let _output_guard = TempFileGuard(output_path.clone());

        tokio::fs::write(&clip_path, clip).await?;

        let bed = format!(
            "anullsrc=channel_layout=stereo:sample_rate={}",
            sample_rate
        );
        // adelay wants one value per channel.
        let filter = format!(
            "[1:a]adelay={delay_ms}|{delay_ms}[clip];\
             [0:a][clip]amix=inputs=2:duration=first:normalize=0"
        );

        let mut cmd = tokio::process::Command::new(&self.info.ffmpeg_path);
        configure_tokio_command(&mut cmd);
        let output = cmd
            .args([
                "-f",
                "lavfi",
                "-t",
                &format!("{:.6}", total_duration_sec),
                "-i",
                &bed,
                "-i",
                &clip_path.to_string_lossy(),
                "-filter_complex",
                &filter,
                "-ar",
                &sample_rate.to_string(),
                "-ac",
                "2",
                "-c:a",
                "pcm_s16le",
                "-y",
                &output_path.to_string_lossy(),
            ])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::Mix(stderr.trim().to_string()));
        }

        Ok(tokio::fs::read(&output_path).await?)
    }
}
