//! Bevy Accumulation and Index Format
//!
//! A bevy is a pack of consecutive compressed chunks, persisted as two
//! volume members:
//!
//! ```text
//! <stream>/<NNNNNNNN>        concatenated compressed chunk payloads
//! <stream>/<NNNNNNNN>/index  packed little-endian u32[], one entry per
//!                            chunk: the byte offset where that chunk's
//!                            payload starts in the data member
//! ```
//!
//! `NNNNNNNN` is the bevy number, decimal, zero-padded to eight digits.
//!
//! The index carries offsets only; a chunk's compressed size is recovered
//! by arithmetic: `index[i+1] - index[i]` for interior chunks, and
//! `data_len - index[last]` for the final chunk.

use bytes::{BufMut, BytesMut};

use aff4_core::{Error, Result};

/// Width of one index entry on disk.
const INDEX_ENTRY_SIZE: usize = 4;

/// Format the data-member name component for bevy `number`.
pub fn bevy_member_name(number: u32) -> String {
    format!("{number:08}")
}

/// In-memory accumulator for the bevy currently being written.
///
/// Two parallel buffers grow in lockstep: `append` records the pre-append
/// data length as the new chunk's index entry, then adds the payload.
pub struct BevyWriter {
    data: BytesMut,
    index: BytesMut,
    chunk_count: usize,
}

impl BevyWriter {
    pub fn new() -> Self {
        BevyWriter {
            data: BytesMut::new(),
            index: BytesMut::new(),
            chunk_count: 0,
        }
    }

    /// Append one compressed chunk payload, recording its offset.
    pub fn append(&mut self, compressed: &[u8]) {
        self.index.put_u32_le(self.data.len() as u32);
        self.data.extend_from_slice(compressed);
        self.chunk_count += 1;
    }

    /// Number of chunks appended since the last reset.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_count == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn index(&self) -> &[u8] {
        &self.index
    }

    /// Discard all accumulated chunks.
    pub fn reset(&mut self) {
        self.data.clear();
        self.index.clear();
        self.chunk_count = 0;
    }
}

impl Default for BevyWriter {
    fn default() -> Self {
        BevyWriter::new()
    }
}

/// Decode a bevy index member into offsets.
///
/// The on-disk integers are little-endian regardless of host, so each
/// entry is assembled explicitly rather than viewed through a cast.
pub fn decode_index(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.len() % INDEX_ENTRY_SIZE != 0 {
        return Err(Error::InvalidIndex(format!(
            "index length {} is not a multiple of {INDEX_ENTRY_SIZE}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(INDEX_ENTRY_SIZE)
        .map(|entry| u32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]))
        .collect())
}
