//! Cuenote Export Engine
//!
//! Core export pipeline module.
//! Handles marker generation, WAV metadata embedding, transcoding,
//! voice-track assembly and export orchestration.

pub mod annotations;
pub mod export;
pub mod ffmpeg;
pub mod markers;
pub mod process;
pub mod storage;
pub mod voice;
pub mod wav;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
