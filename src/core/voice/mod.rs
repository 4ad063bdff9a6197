//! Voice Track Assembly
//!
//! Builds one independent full-length track per voice annotation: a
//! silent bed the exact duration of the main mix, with the voice clip
//! mixed in starting at the annotation's timestamp. Each clip is
//! processed independently; a failing clip is logged and skipped so
//! the remaining clips and the overall export still succeed.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::core::annotations::Annotation;
use crate::core::ffmpeg::{Mixer, Prober};
use crate::core::storage::StorageClient;
use crate::core::{
    format_timecode_for_filename, sanitize_filename_component, AnnotationId,
};

/// At most this many clip builds run concurrently within one export.
const MAX_CONCURRENT_CLIP_BUILDS: usize = 4;

/// A finished synchronized voice track
#[derive(Clone, Debug)]
pub struct VoiceTrack {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A clip whose track could not be built. Never fatal to the export.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceTrackFailure {
    pub annotation_id: AnnotationId,
    pub reason: String,
}

/// Builds voice tracks against a shared read-only main mix
pub struct VoiceTrackAssembler {
    storage: Arc<dyn StorageClient>,
    prober: Arc<dyn Prober>,
    mixer: Arc<dyn Mixer>,
}

impl VoiceTrackAssembler {
    pub fn new(
        storage: Arc<dyn StorageClient>,
        prober: Arc<dyn Prober>,
        mixer: Arc<dyn Mixer>,
    ) -> Self {
        Self {
            storage,
            prober,
            mixer,
        }
    }

    /// Builds one track per voice annotation, in annotation order.
    ///
    /// Accumulates per-clip results explicitly: successes and failures
    /// come back side by side and the caller decides what a partial
    /// result means. The main mix is only ever read.
    pub async fn build_voice_tracks(
        &self,
        annotations: &[Annotation],
        main_mix: &[u8],
        sample_rate: u32,
        title: &str,
    ) -> (Vec<VoiceTrack>, Vec<VoiceTrackFailure>) {
        let voice_annotations: Vec<&Annotation> =
            annotations.iter().filter(|a| a.has_voice_clip()).collect();
        if voice_annotations.is_empty() {
            return (Vec::new(), Vec::new());
        }

        // One probe for the whole batch; every track shares the bed duration.
        let total_duration_sec = match self.prober.duration_sec(main_mix).await {
            Ok(duration) => duration,
            Err(e) => {
                warn!("failed to probe main mix duration, skipping all voice tracks: {e}");
                let failures = voice_annotations
                    .iter()
                    .map(|a| VoiceTrackFailure {
                        annotation_id: a.id.clone(),
                        reason: format!("main mix probe failed: {e}"),
                    })
                    .collect();
                return (Vec::new(), failures);
            }
        };

        let title = sanitize_filename_component(title);
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_CLIP_BUILDS));

        let builds = voice_annotations.iter().enumerate().map(|(idx, ann)| {
            let semaphore = Arc::clone(&semaphore);
            let title = title.as_str();
            async move {
                // Semaphore is never closed while we hold it.
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                self.build_one(ann, idx + 1, total_duration_sec, sample_rate, title)
                    .await
            }
        });

        let mut tracks = Vec::new();
        let mut failures = Vec::new();
        for result in futures::future::join_all(builds).await {
            match result {
                Ok(track) => tracks.push(track),
                Err(failure) => {
                    warn!(
                        annotation_id = %failure.annotation_id,
                        "skipping voice track: {}",
                        failure.reason
                    );
                    failures.push(failure);
                }
            }
        }

        (tracks, failures)
    }

    async fn build_one(
        &self,
        annotation: &Annotation,
        voice_index: usize,
        total_duration_sec: f64,
        sample_rate: u32,
        title: &str,
    ) -> Result<VoiceTrack, VoiceTrackFailure> {
        let fail = |reason: String| VoiceTrackFailure {
            annotation_id: annotation.id.clone(),
            reason,
        };

        let clip_ref = annotation
            .voice_clip_ref
            .as_ref()
            .ok_or_else(|| fail("annotation has no voice clip reference".to_string()))?;

        let clip = self
            .storage
            .fetch(clip_ref)
            .await
            .map_err(|e| fail(format!("clip fetch failed: {e}")))?;

        let delay_ms = (annotation.timestamp.max(0.0) * 1000.0).round() as u64;
        let data = self
            .mixer
            .place_clip(&clip, delay_ms, total_duration_sec, sample_rate)
            .await
            .map_err(|e| fail(format!("clip placement failed: {e}")))?;

        let filename = format!(
            "{}_voice{}_{}_{}.wav",
            title,
            voice_index,
            sanitize_filename_component(&annotation.author.display_name),
            format_timecode_for_filename(annotation.timestamp)
        );

        debug!(
            annotation_id = %annotation.id,
            filename = %filename,
            delay_ms,
            "built voice track"
        );

        Ok(VoiceTrack { filename, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotations::{AnnotationKind, Author};
    use crate::core::storage::MemoryStorageClient;
    use crate::core::{ExportError, ExportResult, TimeSec};
    use async_trait::async_trait;

    struct StubProber {
        duration: ExportResult<TimeSec>,
    }

    #[async_trait]
    impl Prober for StubProber {
        async fn duration_sec(&self, _media: &[u8]) -> ExportResult<TimeSec> {
            match &self.duration {
                Ok(d) => Ok(*d),
                Err(_) => Err(ExportError::Probe("stub probe failure".to_string())),
            }
        }
    }

    /// Deterministic stand-in for the ffmpeg mixer: `delay_ms` zero
    /// bytes followed by the clip content.
    struct StubMixer;

    #[async_trait]
    impl Mixer for StubMixer {
        async fn place_clip(
            &self,
            clip: &[u8],
            delay_ms: u64,
            _total_duration_sec: TimeSec,
            _sample_rate: u32,
        ) -> ExportResult<Vec<u8>> {
            let mut out = vec![0u8; delay_ms as usize];
            out.extend_from_slice(clip);
            Ok(out)
        }
    }

    fn voice_annotation(id: &str, timestamp: TimeSec, clip_ref: &str, author: &str) -> Annotation {
        Annotation {
            id: id.to_string(),
            timestamp,
            text: "voice note".to_string(),
            kind: AnnotationKind::Voice,
            priority: None,
            parent_id: None,
            voice_clip_ref: Some(clip_ref.to_string()),
            author: Author {
                id: format!("u-{author}"),
                display_name: author.to_string(),
            },
        }
    }

    fn assembler_with(storage: MemoryStorageClient) -> VoiceTrackAssembler {
        VoiceTrackAssembler::new(
            Arc::new(storage),
            Arc::new(StubProber {
                duration: Ok(180.0),
            }),
            Arc::new(StubMixer),
        )
    }

    #[tokio::test]
    async fn builds_one_track_per_voice_annotation() {
        let mut storage = MemoryStorageClient::new();
        storage.insert("clips/a", b"AAAA".to_vec());
        storage.insert("clips/b", b"BBBB".to_vec());

        let annotations = vec![
            voice_annotation("a1", 2.0, "clips/a", "Sam"),
            voice_annotation("a2", 65.5, "clips/b", "Riley"),
        ];

        let (tracks, failures) = assembler_with(storage)
            .build_voice_tracks(&annotations, b"mix", 44100, "Final Mix")
            .await;

        assert!(failures.is_empty());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].filename, "Final_Mix_voice1_Sam_0m2s.wav");
        assert_eq!(tracks[1].filename, "Final_Mix_voice2_Riley_1m5s.wav");
        // Stub mixer encodes the delay as leading zero bytes.
        assert_eq!(tracks[0].data.len(), 2000 + 4);
        assert_eq!(tracks[1].data.len(), 65500 + 4);
    }

    #[tokio::test]
    async fn one_failing_clip_does_not_abort_the_rest() {
        let mut storage = MemoryStorageClient::new();
        storage.insert("clips/a", b"AAAA".to_vec());
        storage.insert("clips/c", b"CCCC".to_vec());
        // clips/b is deliberately absent.

        let annotations = vec![
            voice_annotation("a1", 1.0, "clips/a", "Sam"),
            voice_annotation("a2", 2.0, "clips/b", "Riley"),
            voice_annotation("a3", 3.0, "clips/c", "Ash"),
        ];

        let (tracks, failures) = assembler_with(storage)
            .build_voice_tracks(&annotations, b"mix", 44100, "Mix")
            .await;

        assert_eq!(tracks.len(), 2);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].annotation_id, "a2");
        assert!(failures[0].reason.contains("fetch failed"));
        // Successes keep annotation order and numbering.
        assert!(tracks[0].filename.contains("voice1"));
        assert!(tracks[1].filename.contains("voice3"));
    }

    #[tokio::test]
    async fn probe_failure_fails_every_clip_but_not_the_call() {
        let mut storage = MemoryStorageClient::new();
        storage.insert("clips/a", b"AAAA".to_vec());

        let assembler = VoiceTrackAssembler::new(
            Arc::new(storage),
            Arc::new(StubProber {
                duration: Err(ExportError::Probe("unreadable".to_string())),
            }),
            Arc::new(StubMixer),
        );

        let annotations = vec![voice_annotation("a1", 1.0, "clips/a", "Sam")];
        let (tracks, failures) = assembler
            .build_voice_tracks(&annotations, b"mix", 44100, "Mix")
            .await;

        assert!(tracks.is_empty());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].reason.contains("probe failed"));
    }

    #[tokio::test]
    async fn non_voice_annotations_are_ignored() {
        let mut plain = voice_annotation("a1", 1.0, "clips/a", "Sam");
        plain.kind = AnnotationKind::Comment;

        let (tracks, failures) = assembler_with(MemoryStorageClient::new())
            .build_voice_tracks(&[plain], b"mix", 44100, "Mix")
            .await;

        assert!(tracks.is_empty());
        assert!(failures.is_empty());
    }
}
