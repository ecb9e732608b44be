//! AFF4 Image Streams
//!
//! This module implements `ImageStream`: a logically contiguous,
//! byte-addressable blob stored as compressed fixed-size chunks packed into
//! indexed bevies inside a containing volume.
//!
//! ## Write Path
//!
//! ```text
//! write(bytes)
//!     ↓
//! line buffer            ← bytes accumulate until a full chunk exists
//!     ↓ chunk_size bytes
//! codec::compress()
//!     ↓
//! BevyWriter.append()    ← offset recorded, payload packed
//!     ↓ chunks_per_segment chunks
//! flush_bevy()           ← index member + data member written to volume
//! ```
//!
//! `flush` seals the stream: the trailing short chunk (if any) and the
//! partial bevy are written out, then the stream parameters are recorded
//! in the resolver so a later `load` can reconstruct the layout.
//!
//! ## Read Path
//!
//! ```text
//! read(length)
//!     ↓ clamp to stream size
//! (chunk id, intra-chunk skip) ← offset arithmetic
//!     ↓ per bevy touched
//! open data + index members, decode the index
//!     ↓ per chunk
//! codec::decompress(), append to output
//!     ↓
//! trim head skip, truncate to length
//! ```
//!
//! The chunk/bevy layout is a pure function of `(chunk_size,
//! chunks_per_segment, compression, total bytes written)` - how the bytes
//! were split across `write` calls leaves no trace on disk.
//!
//! ## Concurrency
//!
//! A stream instance has a single logical owner; `write` and `read` on the
//! same instance are not synchronized. Distinct streams may share a volume
//! and resolver, which are `Sync` capabilities.

use std::io::{Read, SeekFrom, Write};
use std::sync::Arc;

use aff4_core::lexicon::{
    AFF4_IMAGE_CHUNKS_PER_SEGMENT, AFF4_IMAGE_CHUNK_SIZE, AFF4_IMAGE_COMPRESSION, AFF4_IMAGE_TYPE,
    AFF4_MAX_READ_LEN, AFF4_STORED, AFF4_STREAM_SIZE, AFF4_TYPE, DEFAULT_CHUNKS_PER_SEGMENT,
    DEFAULT_CHUNK_SIZE,
};
use aff4_core::{Compression, Error, Result, Urn};
use bytes::{Bytes, BytesMut};

use crate::bevy::{bevy_member_name, decode_index, BevyWriter};
use crate::codec;
use crate::config::ImageConfig;
use crate::resolver::{Resolver, Value};
use crate::volume::{MemberReader, Volume};

/// A chunked, compressed, random-access image stream.
pub struct ImageStream {
    urn: Urn,
    volume: Arc<dyn Volume>,
    resolver: Arc<dyn Resolver>,

    chunk_size: usize,
    chunks_per_segment: usize,
    compression: Compression,

    /// Total logical stream length. Grows monotonically under `write`.
    size: u64,
    /// Next byte offset `read` will return.
    readptr: u64,

    /// Bytes accepted by `write` but not yet cut into a chunk.
    buffer: BytesMut,
    /// The bevy currently being filled.
    bevy: BevyWriter,
    chunk_count_in_bevy: usize,
    /// Next bevy number to assign on flush.
    bevy_number: u32,

    dirty: bool,
}

impl std::fmt::Debug for ImageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStream")
            .field("urn", &self.urn)
            .field("chunk_size", &self.chunk_size)
            .field("chunks_per_segment", &self.chunks_per_segment)
            .field("compression", &self.compression)
            .field("size", &self.size)
            .field("readptr", &self.readptr)
            .field("bevy_number", &self.bevy_number)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl ImageStream {
    /// Create a new image stream inside `volume`.
    ///
    /// The volume is told about its new child and the stream's type and
    /// location are recorded in the resolver immediately; the layout
    /// parameters follow at the first `flush`.
    pub fn create(
        volume: Arc<dyn Volume>,
        resolver: Arc<dyn Resolver>,
        urn: impl Into<Urn>,
        config: ImageConfig,
    ) -> Result<Self> {
        config.validate()?;
        let urn = urn.into();

        volume.add_child(&urn)?;
        resolver.set(&urn, AFF4_TYPE, Value::Urn(Urn::new(AFF4_IMAGE_TYPE)))?;
        resolver.set(&urn, AFF4_STORED, Value::Urn(volume.urn().clone()))?;

        Ok(ImageStream {
            urn,
            volume,
            resolver,
            chunk_size: config.chunk_size,
            chunks_per_segment: config.chunks_per_segment,
            compression: config.compression,
            size: 0,
            readptr: 0,
            buffer: BytesMut::new(),
            bevy: BevyWriter::new(),
            chunk_count_in_bevy: 0,
            bevy_number: 0,
            dirty: false,
        })
    }

    /// Open an existing image stream from its resolver metadata.
    ///
    /// The `stored` attribute must name `volume`; layout parameters fall
    /// back to the format defaults when absent. An unrecognized
    /// compression URN fails the load - nothing in the stream could be
    /// decoded anyway.
    pub fn load(
        volume: Arc<dyn Volume>,
        resolver: Arc<dyn Resolver>,
        urn: impl Into<Urn>,
    ) -> Result<Self> {
        let urn = urn.into();

        let stored = resolver
            .get(&urn, AFF4_STORED)?
            .ok_or_else(|| Error::NotFound(format!("{urn} has no stored volume")))?;
        let volume_urn = stored.as_urn()?.clone();
        if &volume_urn != volume.urn() {
            return Err(Error::NotFound(format!(
                "{urn} is stored in {volume_urn}, not {}",
                volume.urn()
            )));
        }

        let mut chunk_size = DEFAULT_CHUNK_SIZE;
        if let Some(value) = resolver.get(&urn, AFF4_IMAGE_CHUNK_SIZE)? {
            chunk_size = value.as_integer()? as usize;
        }

        let mut chunks_per_segment = DEFAULT_CHUNKS_PER_SEGMENT;
        if let Some(value) = resolver.get(&urn, AFF4_IMAGE_CHUNKS_PER_SEGMENT)? {
            chunks_per_segment = value.as_integer()? as usize;
        }

        let mut size = 0;
        if let Some(value) = resolver.get(&urn, AFF4_STREAM_SIZE)? {
            size = value.as_integer()?;
        }

        let compression = match resolver.get(&urn, AFF4_IMAGE_COMPRESSION)? {
            Some(value) => Compression::from_urn(value.as_urn()?.as_str())?,
            None => Compression::default(),
        };

        Ok(ImageStream {
            urn,
            volume,
            resolver,
            chunk_size,
            chunks_per_segment,
            compression,
            size,
            readptr: 0,
            buffer: BytesMut::new(),
            bevy: BevyWriter::new(),
            chunk_count_in_bevy: 0,
            bevy_number: 0,
            dirty: false,
        })
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// Total logical stream length in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current read offset.
    pub fn tell(&self) -> u64 {
        self.readptr
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunks_per_segment(&self) -> usize {
        self.chunks_per_segment
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Append bytes to the stream.
    ///
    /// Full chunks are cut from the head of the line buffer and flushed as
    /// they form; a trailing fragment waits for more data or for `flush`.
    /// A chunk-flush failure propagates and grants no partial credit - the
    /// persisted state is indeterminate and the caller must discard the
    /// containing volume.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.dirty = true;
        self.buffer.extend_from_slice(data);

        while self.buffer.len() >= self.chunk_size {
            let chunk = self.buffer.split_to(self.chunk_size);
            self.flush_chunk(&chunk)?;
        }

        self.readptr += data.len() as u64;
        if self.readptr > self.size {
            self.size = self.readptr;
        }
        Ok(data.len())
    }

    /// Compress one chunk into the current bevy, flushing the bevy when it
    /// fills. `chunk` may only be short for the final chunk of the stream.
    fn flush_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let compressed = codec::compress(self.compression, chunk)?;
        self.bevy.append(&compressed);
        self.chunk_count_in_bevy += 1;

        if self.chunk_count_in_bevy >= self.chunks_per_segment {
            self.flush_bevy()?;
        }
        Ok(())
    }

    /// Write the accumulated bevy out as two volume members.
    ///
    /// There is no rollback: a failure here leaves the volume in an
    /// indeterminate state, per the volume collaborator's contract.
    fn flush_bevy(&mut self) -> Result<()> {
        if self.bevy.is_empty() {
            return Ok(());
        }

        let bevy_urn = self.urn.append(&bevy_member_name(self.bevy_number));
        let bevy_index_urn = bevy_urn.append("index");

        let mut index_member = self.volume.create_member(&bevy_index_urn)?;
        let mut data_member = self.volume.create_member(&bevy_urn)?;

        index_member.write_all(self.bevy.index())?;
        data_member.write_all(self.bevy.data())?;

        index_member.finish()?;
        data_member.finish()?;

        tracing::debug!(
            stream = %self.urn,
            bevy = self.bevy_number,
            chunks = self.bevy.chunk_count(),
            data_len = self.bevy.data().len(),
            "bevy flushed"
        );

        self.bevy.reset();
        self.chunk_count_in_bevy = 0;
        self.bevy_number += 1;
        Ok(())
    }

    /// Read up to `length` bytes from the current read offset.
    ///
    /// The request is clamped to the stream size; a request past the hard
    /// per-call ceiling returns an empty payload. A failure while resolving
    /// or decoding chunks (missing bevy, corrupt index, bad payload) aborts
    /// the whole call and also yields an empty payload, with the read
    /// offset unchanged.
    pub fn read(&mut self, length: usize) -> Result<Bytes> {
        if length > AFF4_MAX_READ_LEN {
            return Ok(Bytes::new());
        }

        let remaining = self.size.saturating_sub(self.readptr);
        let length = (length as u64).min(remaining) as usize;
        if length == 0 {
            return Ok(Bytes::new());
        }

        let initial_skip = (self.readptr % self.chunk_size as u64) as usize;
        let mut chunk_id = self.readptr / self.chunk_size as u64;
        // Whole chunks covering the head skip and the tail fragment.
        let mut chunks_to_read = (initial_skip + length).div_ceil(self.chunk_size);

        let mut out = BytesMut::with_capacity(chunks_to_read * self.chunk_size);

        while chunks_to_read > 0 {
            let chunks_read = match self.read_partial(chunk_id, chunks_to_read, &mut out) {
                Ok(chunks_read) => chunks_read,
                Err(error) => {
                    tracing::error!(
                        stream = %self.urn,
                        chunk = chunk_id,
                        %error,
                        "read aborted"
                    );
                    return Ok(Bytes::new());
                }
            };
            if chunks_read == 0 {
                break;
            }
            chunks_to_read -= chunks_read;
            chunk_id += chunks_read as u64;
        }

        let out = out.freeze();
        let start = initial_skip.min(out.len());
        let available = (out.len() - start).min(length);
        let result = out.slice(start..start + available);

        self.readptr += available as u64;
        Ok(result)
    }

    /// Read consecutive chunks out of one bevy.
    ///
    /// Returns how many chunks were appended to `out`; crossing a bevy
    /// boundary returns early so the caller rebinds the next bevy's
    /// members.
    fn read_partial(
        &self,
        mut chunk_id: u64,
        chunks_to_read: usize,
        out: &mut BytesMut,
    ) -> Result<usize> {
        let cps = self.chunks_per_segment as u64;
        let bevy_id = chunk_id / cps;

        let bevy_urn = self.urn.append(&bevy_member_name(bevy_id as u32));
        let bevy_index_urn = bevy_urn.append("index");

        let mut index_member = self.volume.open_member(&bevy_index_urn)?;
        let mut bevy_member = self.volume.open_member(&bevy_urn)?;

        let mut index_bytes = Vec::with_capacity(index_member.size() as usize);
        index_member.read_to_end(&mut index_bytes)?;
        let index = decode_index(&index_bytes)?;

        let mut chunks_read = 0;
        while chunks_read < chunks_to_read {
            self.read_chunk_from_bevy(chunk_id, bevy_member.as_mut(), &index, out)?;
            chunk_id += 1;
            chunks_read += 1;

            if chunk_id / cps != bevy_id {
                break;
            }
        }
        Ok(chunks_read)
    }

    /// Decode one chunk out of an open bevy and append it to `out`.
    fn read_chunk_from_bevy(
        &self,
        chunk_id: u64,
        bevy: &mut dyn MemberReader,
        index: &[u32],
        out: &mut BytesMut,
    ) -> Result<()> {
        let j = (chunk_id % self.chunks_per_segment as u64) as usize;

        if index.is_empty() {
            return Err(Error::InvalidIndex(format!(
                "empty index in {}: chunk {chunk_id}",
                self.urn
            )));
        }
        if j >= index.len() {
            return Err(Error::InvalidIndex(format!(
                "index too short in {}: chunk {chunk_id}",
                self.urn
            )));
        }

        let start = index[j] as u64;
        // The last chunk in the bevy runs to the end of the data member.
        let end = if j == index.len() - 1 {
            bevy.size()
        } else {
            index[j + 1] as u64
        };
        let compressed_size = end.checked_sub(start).ok_or_else(|| {
            Error::InvalidIndex(format!(
                "non-monotonic index in {}: chunk {chunk_id}",
                self.urn
            ))
        })?;

        bevy.seek(SeekFrom::Start(start))?;
        let mut compressed = vec![0u8; compressed_size as usize];
        bevy.read_exact(&mut compressed)?;

        let chunk = codec::decompress(self.compression, &compressed, self.chunk_size)?;
        out.extend_from_slice(&chunk);
        Ok(())
    }

    /// Move the read offset. `End`-relative seeks resolve against the
    /// current stream size.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.readptr as i128 + delta as i128,
            SeekFrom::End(delta) => self.size as i128 + delta as i128,
        };
        if target < 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek before start of stream",
            )));
        }
        self.readptr = target as u64;
        Ok(self.readptr)
    }

    /// Seal buffered writes and persist the stream parameters.
    ///
    /// The trailing short chunk and the partial bevy are written out, then
    /// the resolver receives the attributes a later `load` needs. A clean
    /// stream flushes to a no-op, so calling this twice leaves the volume
    /// bytes identical.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if !self.buffer.is_empty() {
            let chunk = self.buffer.split();
            self.flush_chunk(&chunk)?;
        }
        self.flush_bevy()?;

        self.resolver
            .set(&self.urn, AFF4_TYPE, Value::Urn(Urn::new(AFF4_IMAGE_TYPE)))?;
        self.resolver
            .set(&self.urn, AFF4_STORED, Value::Urn(self.volume.urn().clone()))?;
        self.resolver.set(
            &self.urn,
            AFF4_IMAGE_CHUNK_SIZE,
            Value::Integer(self.chunk_size as u64),
        )?;
        self.resolver.set(
            &self.urn,
            AFF4_IMAGE_CHUNKS_PER_SEGMENT,
            Value::Integer(self.chunks_per_segment as u64),
        )?;
        self.resolver
            .set(&self.urn, AFF4_STREAM_SIZE, Value::Integer(self.size))?;
        self.resolver.set(
            &self.urn,
            AFF4_IMAGE_COMPRESSION,
            Value::Urn(Urn::new(self.compression.as_urn())),
        )?;

        tracing::debug!(
            stream = %self.urn,
            size = self.size,
            bevies = self.bevy_number,
            "stream metadata flushed"
        );

        self.dirty = false;
        Ok(())
    }
}

impl Drop for ImageStream {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(error) = self.flush() {
                tracing::warn!(
                    stream = %self.urn,
                    %error,
                    "flush on drop failed; buffered writes lost"
                );
            }
        }
    }
}
