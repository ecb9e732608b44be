//! Chunk Codecs
//!
//! One chunk in, one buffer out. Every chunk of a stream is transformed
//! under the stream's single compression method:
//!
//! - **Stored**: identity copy
//! - **Zlib**: standard zlib stream at the fast compression level - imaging
//!   workloads are write-throughput bound, so we trade a few percent of
//!   ratio for speed
//! - **Snappy**: one raw snappy block per chunk; the compressed length is
//!   known from index arithmetic, so no framing is needed
//!
//! Decompression is bounded: a decoded chunk can never legitimately exceed
//! the stream's `chunk_size`, so both decoders cap their output and report
//! corruption instead of inflating an attacker-controlled buffer.

use std::io::{Read, Write};

use aff4_core::{Compression, Error, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// Compress one chunk under `method`.
pub fn compress(method: Compression, data: &[u8]) -> Result<Vec<u8>> {
    match method {
        Compression::Stored => Ok(data.to_vec()),
        Compression::Zlib => compress_zlib(data),
        Compression::Snappy => snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(|e| Error::Compression(format!("snappy: {e}"))),
    }
}

/// Decompress one chunk under `method`.
///
/// `chunk_size` bounds the decoded length: every chunk except the final one
/// decodes to exactly `chunk_size` bytes, and the final chunk to less.
/// Anything larger is corruption.
pub fn decompress(method: Compression, data: &[u8], chunk_size: usize) -> Result<Vec<u8>> {
    match method {
        Compression::Stored => Ok(data.to_vec()),
        Compression::Zlib => decompress_zlib(data, chunk_size),
        Compression::Snappy => decompress_snappy(data, chunk_size),
    }
}

fn compress_zlib(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 64),
        flate2::Compression::new(1),
    );
    encoder
        .write_all(data)
        .map_err(|e| Error::Compression(format!("zlib: {e}")))?;
    encoder
        .finish()
        .map_err(|e| Error::Compression(format!("zlib: {e}")))
}

fn decompress_zlib(data: &[u8], chunk_size: usize) -> Result<Vec<u8>> {
    // Read one byte past the cap so oversized output is detectable.
    let mut decoder = ZlibDecoder::new(data).take(chunk_size as u64 + 1);
    let mut out = Vec::with_capacity(chunk_size);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Decompression(format!("zlib: {e}")))?;
    if out.len() > chunk_size {
        return Err(Error::Decompression(format!(
            "chunk decoded past chunk size {chunk_size}"
        )));
    }
    Ok(out)
}

fn decompress_snappy(data: &[u8], chunk_size: usize) -> Result<Vec<u8>> {
    let decoded_len = snap::raw::decompress_len(data)
        .map_err(|e| Error::Decompression(format!("snappy: {e}")))?;
    if decoded_len > chunk_size {
        return Err(Error::Decompression(format!(
            "chunk decoded past chunk size {chunk_size}"
        )));
    }
    snap::raw::Decoder::new()
        .decompress_vec(data)
        .map_err(|e| Error::Decompression(format!("snappy: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK_SIZE: usize = 4096;

    fn sample_chunk() -> Vec<u8> {
        // Compressible but not trivial: repeating 13-byte phrase.
        b"forensic data"
            .iter()
            .cycle()
            .take(CHUNK_SIZE)
            .copied()
            .collect()
    }

    #[test]
    fn stored_is_identity() {
        let chunk = sample_chunk();
        let packed = compress(Compression::Stored, &chunk).unwrap();
        assert_eq!(packed, chunk);
        let unpacked = decompress(Compression::Stored, &packed, CHUNK_SIZE).unwrap();
        assert_eq!(unpacked, chunk);
    }

    #[test]
    fn zlib_roundtrip_and_shrinks() {
        let chunk = sample_chunk();
        let packed = compress(Compression::Zlib, &chunk).unwrap();
        assert!(packed.len() < chunk.len());
        let unpacked = decompress(Compression::Zlib, &packed, CHUNK_SIZE).unwrap();
        assert_eq!(unpacked, chunk);
    }

    #[test]
    fn snappy_roundtrip_and_shrinks() {
        let chunk = sample_chunk();
        let packed = compress(Compression::Snappy, &chunk).unwrap();
        assert!(packed.len() < chunk.len());
        let unpacked = decompress(Compression::Snappy, &packed, CHUNK_SIZE).unwrap();
        assert_eq!(unpacked, chunk);
    }

    #[test]
    fn short_final_chunk_roundtrip() {
        let tail = b"last few bytes";
        for method in [Compression::Stored, Compression::Zlib, Compression::Snappy] {
            let packed = compress(method, tail).unwrap();
            let unpacked = decompress(method, &packed, CHUNK_SIZE).unwrap();
            assert_eq!(unpacked, tail, "method {method:?}");
        }
    }

    #[test]
    fn zlib_garbage_is_decompression_error() {
        let err = decompress(Compression::Zlib, b"not a zlib stream", CHUNK_SIZE).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn snappy_garbage_is_decompression_error() {
        let err = decompress(Compression::Snappy, &[0xFF; 16], CHUNK_SIZE).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn oversized_decode_is_rejected() {
        // A chunk that inflates past the declared chunk size is corruption,
        // not a larger result.
        let chunk = sample_chunk();
        let packed_zlib = compress(Compression::Zlib, &chunk).unwrap();
        let err = decompress(Compression::Zlib, &packed_zlib, CHUNK_SIZE / 2).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));

        let packed_snappy = compress(Compression::Snappy, &chunk).unwrap();
        let err = decompress(Compression::Snappy, &packed_snappy, CHUNK_SIZE / 2).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn empty_chunk_roundtrip() {
        for method in [Compression::Stored, Compression::Zlib, Compression::Snappy] {
            let packed = compress(method, b"").unwrap();
            let unpacked = decompress(method, &packed, CHUNK_SIZE).unwrap();
            assert!(unpacked.is_empty(), "method {method:?}");
        }
    }
}
