//! Cuenote Core Library
//!
//! Annotated-audio export engine. Takes a flat list of timestamped
//! collaboration comments plus a source audio asset and produces a
//! deliverable WAV with embedded cue-point markers that professional
//! audio editors read as navigation points. Comments with attached
//! voice clips additionally yield full-length synchronized voice
//! tracks, one per clip.
//!
//! The surrounding system (accounts, storage, billing, HTTP routing)
//! is out of scope; the engine consumes an injected [`core::storage::StorageClient`]
//! and returns binary artifacts.

pub mod core;
