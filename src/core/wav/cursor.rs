//! Bounds-Checked Chunk Cursor
//!
//! Small reader/writer pair for RIFF-style byte buffers. All offset
//! arithmetic in the codec goes through these, so a malformed size
//! field surfaces as a [`ExportError::ContainerParse`] instead of a
//! silent out-of-range slice.

use crate::core::{ExportError, ExportResult};

/// Four-byte chunk identifier (e.g. `RIFF`, `data`, `cue `)
pub type ChunkId = [u8; 4];

// =============================================================================
// Reader
// =============================================================================

/// Sequential reader over a chunked byte buffer
pub struct ChunkReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> ExportResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(ExportError::ContainerParse(format!(
                "unexpected end of buffer reading {} at offset {} (need {}, have {})",
                what,
                self.pos,
                len,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads a four-byte chunk id
    pub fn read_id(&mut self) -> ExportResult<ChunkId> {
        let bytes = self.take(4, "chunk id")?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads a little-endian u32 (chunk sizes, header fields)
    pub fn read_u32_le(&mut self) -> ExportResult<u32> {
        let bytes = self.take(4, "u32 field")?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Skips over `len` bytes of chunk payload
    pub fn skip(&mut self, len: usize) -> ExportResult<()> {
        self.take(len, "chunk payload")?;
        Ok(())
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Append-only writer producing chunked byte buffers
#[derive(Default)]
pub struct ChunkWriter {
    buf: Vec<u8>,
}

impl ChunkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_id(&mut self, id: &ChunkId) {
        self.buf.extend_from_slice(id);
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends one zero pad byte when the current length is odd.
    /// RIFF chunks must start on even offsets.
    pub fn pad_to_even(&mut self) {
        if self.buf.len() % 2 != 0 {
            self.buf.push(0);
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
