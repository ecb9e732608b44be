//! Compression Methods
//!
//! A stream compresses every chunk under one method, recorded in the
//! resolver as a URN. Three methods exist in the chunked stream format:
//!
//! - **Stored**: identity, no compression
//! - **Zlib**: standard zlib stream, fast compression level
//! - **Snappy**: raw snappy block, one block per chunk
//!
//! The URN is parsed once at load time. An unrecognized URN is rejected
//! there, so the per-chunk codec never sees an unknown method. When no
//! compression URN is recorded at all, the format convention is Zlib.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lexicon;

/// Chunk compression method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compression {
    /// Chunks are stored verbatim.
    Stored,
    /// Zlib deflate, the format default.
    #[default]
    Zlib,
    /// Raw snappy blocks.
    Snappy,
}

impl Compression {
    /// Parse a compression method URN.
    ///
    /// Unknown URNs are an error: a stream written with a method we cannot
    /// decode must be rejected before any data is read.
    pub fn from_urn(urn: &str) -> Result<Self, Error> {
        match urn {
            lexicon::AFF4_IMAGE_COMPRESSION_STORED => Ok(Compression::Stored),
            lexicon::AFF4_IMAGE_COMPRESSION_ZLIB => Ok(Compression::Zlib),
            lexicon::AFF4_IMAGE_COMPRESSION_SNAPPY => Ok(Compression::Snappy),
            other => Err(Error::UnsupportedCompression(other.to_string())),
        }
    }

    /// The canonical URN for this method.
    pub fn as_urn(&self) -> &'static str {
        match self {
            Compression::Stored => lexicon::AFF4_IMAGE_COMPRESSION_STORED,
            Compression::Zlib => lexicon::AFF4_IMAGE_COMPRESSION_ZLIB,
            Compression::Snappy => lexicon::AFF4_IMAGE_COMPRESSION_SNAPPY,
        }
    }
}
