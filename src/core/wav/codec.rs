//! Cue/Label Chunk Injection
//!
//! Builds a `cue ` chunk and an associated `LIST`/`adtl` label chunk
//! for a marker sequence and splices both in front of the `data`
//! chunk. DAWs (Reaper, Pro Tools, Audacity, ...) read these as
//! navigation markers.

use crate::core::markers::Marker;
use crate::core::{ExportError, ExportResult, TimeSec};

use super::cursor::{ChunkReader, ChunkWriter};

const RIFF_HEADER_LEN: usize = 12;
const CUE_RECORD_LEN: u32 = 24;

/// Whether a buffer already is a RIFF/WAVE container
pub fn is_wave(buf: &[u8]) -> bool {
    buf.len() >= RIFF_HEADER_LEN && &buf[0..4] == b"RIFF" && &buf[8..12] == b"WAVE"
}

/// Converts a timeline position to a sample offset into the payload
pub fn sample_position(timestamp: TimeSec, sample_rate: u32) -> u32 {
    (timestamp * sample_rate as TimeSec).round() as u32
}

/// Embeds a marker sequence into a WAVE buffer.
///
/// The markers must already be sorted by timestamp; cue ids are
/// assigned densely `1..=n` in input order. An empty marker list
/// returns the buffer unchanged. The audio payload is never touched;
/// the new chunks land immediately before `data` and the top-level
/// RIFF size field is rewritten to match.
pub fn embed_markers(buf: Vec<u8>, markers: &[Marker], sample_rate: u32) -> ExportResult<Vec<u8>> {
    if markers.is_empty() {
        return Ok(buf);
    }

    let data_offset = find_data_chunk(&buf)?;

    let cue_chunk = build_cue_chunk(markers, sample_rate);
    let label_chunk = build_label_chunk(markers);

    let mut out = Vec::with_capacity(buf.len() + cue_chunk.len() + label_chunk.len());
    out.extend_from_slice(&buf[..data_offset]);
    out.extend_from_slice(&cue_chunk);
    out.extend_from_slice(&label_chunk);
    out.extend_from_slice(&buf[data_offset..]);

    let riff_size = (out.len() - 8) as u32;
    out[4..8].copy_from_slice(&riff_size.to_le_bytes());

    Ok(out)
}

/// Walks the chunk sequence and returns the byte offset of the `data`
/// chunk header.
fn find_data_chunk(buf: &[u8]) -> ExportResult<usize> {
    if !is_wave(buf) {
        return Err(ExportError::ContainerParse(
            "buffer is not a RIFF/WAVE container".to_string(),
        ));
    }

    let mut reader = ChunkReader::new(buf);
    reader.skip(RIFF_HEADER_LEN)?;

    while reader.remaining() > 0 {
        let chunk_offset = reader.position();
        let id = reader.read_id()?;
        let size = reader.read_u32_le()? as usize;

        if &id == b"data" {
            return Ok(chunk_offset);
        }

        // Chunks are even-aligned; odd sizes carry one pad byte.
        reader.skip(size + size % 2)?;
    }

    Err(ExportError::ContainerParse(
        "no data chunk found before end of buffer".to_string(),
    ))
}

/// `cue ` chunk: count plus one 24-byte record per marker.
///
/// `play_order` mirrors the sample offset, and `chunk_start`/
/// `block_start` are zero for uncompressed single-data-chunk files.
fn build_cue_chunk(markers: &[Marker], sample_rate: u32) -> Vec<u8> {
    let mut w = ChunkWriter::new();
    w.write_id(b"cue ");
    w.write_u32_le(4 + markers.len() as u32 * CUE_RECORD_LEN);
    w.write_u32_le(markers.len() as u32);

    for (idx, marker) in markers.iter().enumerate() {
        let cue_id = idx as u32 + 1;
        let position = sample_position(marker.timestamp, sample_rate);

        w.write_u32_le(cue_id);
        w.write_u32_le(position); // play order
        w.write_id(b"data"); // target chunk
        w.write_u32_le(0); // chunk start
        w.write_u32_le(0); // block start
        w.write_u32_le(position); // sample offset
    }

    // 4 + n*24 payload bytes: always even, no pad needed.
    w.into_inner()
}

/// `LIST`/`adtl` chunk: one `labl` sub-chunk per marker, associating
/// the cue id with its detailed label text.
fn build_label_chunk(markers: &[Marker]) -> Vec<u8> {
    let mut inner = ChunkWriter::new();
    inner.write_id(b"adtl");

    for (idx, marker) in markers.iter().enumerate() {
        let text = marker.detailed_label();
        // Declared size excludes the pad byte: cue id + text + NUL.
        let labl_size = 4 + text.len() as u32 + 1;

        inner.write_id(b"labl");
        inner.write_u32_le(labl_size);
        inner.write_u32_le(idx as u32 + 1);
        inner.write_bytes(text.as_bytes());
        inner.write_bytes(&[0]);
        inner.pad_to_even();
    }

    let mut w = ChunkWriter::new();
    w.write_id(b"LIST");
    w.write_u32_le(inner.len() as u32);
    w.write_bytes(&inner.into_inner());
    w.into_inner()
}
