//! Stream Configuration
//!
//! Parameters fixed at stream creation time. They determine the persisted
//! chunk/bevy layout, so they are recorded in the resolver on flush and
//! must be read back, not guessed, when a stream is reopened.
//!
//! - **chunk_size**: bytes per uncompressed chunk (default 32 KiB)
//! - **chunks_per_segment**: chunks packed per bevy (default 1024)
//! - **compression**: Stored, Zlib, or Snappy (default Zlib)

use aff4_core::lexicon::{DEFAULT_CHUNKS_PER_SEGMENT, DEFAULT_CHUNK_SIZE};
use aff4_core::{Compression, Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Bytes per uncompressed chunk (default: 32 KiB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunks packed into each bevy (default: 1024)
    #[serde(default = "default_chunks_per_segment")]
    pub chunks_per_segment: usize,

    /// Chunk compression method (default: Zlib)
    #[serde(default)]
    pub compression: Compression,
}

impl ImageConfig {
    /// Reject degenerate layouts before any member is written.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Metadata("chunk_size must be positive".to_string()));
        }
        if self.chunks_per_segment == 0 {
            return Err(Error::Metadata(
                "chunks_per_segment must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunks_per_segment: default_chunks_per_segment(),
            compression: Compression::default(),
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunks_per_segment() -> usize {
    DEFAULT_CHUNKS_PER_SEGMENT
}
