//! WAV Container Codec
//!
//! Parses and rewrites the chunk structure of RIFF/WAVE buffers to
//! inject cue-point and label metadata, leaving the audio payload
//! byte-for-byte untouched. Pure in-memory transformation, no I/O.

mod codec;
mod cursor;

pub use codec::{embed_markers, is_wave, sample_position};
pub use cursor::{ChunkId, ChunkReader, ChunkWriter};
