//! Error Types for AFF4 Streams
//!
//! This module defines all error types that can occur while reading or
//! writing an AFF4 image stream.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! - `Io`: volume member read/write failure, short reads, seek failures
//!
//! ### Lookup Errors
//! - `NotFound`: missing parent volume, missing bevy data or index member
//!
//! ### Compression Errors
//! - `UnsupportedCompression`: a compression URN this implementation does
//!   not recognize (rejected at load time, before any data is touched)
//! - `Compression`: failed to compress a chunk
//! - `Decompression`: failed to decompress a chunk (likely corruption), or
//!   a chunk that inflates past the configured chunk size
//!
//! ### Data Integrity Errors
//! - `InvalidIndex`: empty, truncated, or non-monotonic bevy index
//!
//! ### Collaborator Errors
//! - `Volume`: the containing volume refused to create a member
//! - `Metadata`: a resolver attribute carried a value of the wrong type
//!
//! ## Usage
//!
//! All fallible operations return `Result<T>` which is aliased to
//! `Result<T, Error>`, so `?` propagation works throughout the engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Invalid bevy index: {0}")]
    InvalidIndex(String),

    #[error("Volume error: {0}")]
    Volume(String),

    #[error("Metadata error: {0}")]
    Metadata(String),
}
