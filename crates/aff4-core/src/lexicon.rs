//! The AFF4 lexicon: canonical predicate and type URNs.
//!
//! These are the attribute names under which a stream's parameters are
//! recorded in the resolver, plus the engine-wide constants of the chunked
//! stream format.

/// AFF4 schema namespace.
pub const AFF4_NAMESPACE: &str = "http://aff4.org/Schema#";

/// RDF type predicate.
pub const AFF4_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Links an object to the volume that stores it.
pub const AFF4_STORED: &str = "http://aff4.org/Schema#stored";

/// Type URN of a chunked image stream.
pub const AFF4_IMAGE_TYPE: &str = "http://aff4.org/Schema#ImageStream";

/// Bytes per uncompressed chunk.
pub const AFF4_IMAGE_CHUNK_SIZE: &str = "http://aff4.org/Schema#chunkSize";

/// Chunks packed into each bevy.
pub const AFF4_IMAGE_CHUNKS_PER_SEGMENT: &str = "http://aff4.org/Schema#chunksInSegment";

/// Total logical stream length in bytes.
pub const AFF4_STREAM_SIZE: &str = "http://aff4.org/Schema#size";

/// Compression method URN for the stream's chunks.
pub const AFF4_IMAGE_COMPRESSION: &str = "http://aff4.org/Schema#compressionMethod";

/// Compression method URNs.
pub const AFF4_IMAGE_COMPRESSION_STORED: &str = "http://aff4.org/Schema#NullCompressor";
pub const AFF4_IMAGE_COMPRESSION_ZLIB: &str = "http://aff4.org/Schema#DeflateCompressor";
pub const AFF4_IMAGE_COMPRESSION_SNAPPY: &str = "http://aff4.org/Schema#SnappyCompressor";

/// Default chunk size (32 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Default number of chunks per bevy.
pub const DEFAULT_CHUNKS_PER_SEGMENT: usize = 1024;

/// Hard ceiling on a single read call (100 MiB). Larger requests return
/// an empty payload rather than attempting the allocation.
pub const AFF4_MAX_READ_LEN: usize = 100 * 1024 * 1024;
