//! AFF4 Image Stream Engine
//!
//! This crate implements the chunked stream engine of the AFF4 format: a
//! content-addressable, random-access, chunk-compressed binary stream
//! persisted inside a container volume.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐
//! │    Caller    │
//! └──────┬───────┘
//!        │ write / read / seek / flush
//!        ▼
//! ┌──────────────────┐      ┌─────────────────┐
//! │   ImageStream    │─────▶│    Resolver     │  stream parameters
//! │ - line buffer    │      │ (metadata store)│  (chunk size, size, …)
//! │ - chunk codec    │      └─────────────────┘
//! │ - bevy builder   │      ┌─────────────────┐
//! │ - offset math    │─────▶│     Volume      │  named members
//! └──────────────────┘      │ (zip-like store)│  (bevy data + index)
//!                           └─────────────────┘
//! ```
//!
//! ## Main Components
//!
//! ### ImageStream
//! The stream itself: buffers writes, cuts fixed-size chunks, compresses
//! them, packs them into indexed bevies, and resolves logical byte ranges
//! back into chunks on read.
//!
//! ### Volume / Resolver
//! Capability traits for the two external collaborators. The engine never
//! assumes a particular backing store; [`MemoryVolume`] and
//! [`MemoryResolver`] are complete in-memory implementations used by the
//! test suite and by transient workloads.
//!
//! ## Usage
//!
//! ```
//! use std::io::SeekFrom;
//! use std::sync::Arc;
//!
//! use aff4_storage::{ImageConfig, ImageStream, MemoryResolver, MemoryVolume};
//!
//! # fn main() -> aff4_core::Result<()> {
//! let volume = Arc::new(MemoryVolume::new("aff4://volume"));
//! let resolver = Arc::new(MemoryResolver::new());
//!
//! let mut stream = ImageStream::create(
//!     volume,
//!     resolver,
//!     "aff4://volume/image",
//!     ImageConfig::default(),
//! )?;
//!
//! stream.write(b"evidence bytes")?;
//! stream.flush()?;
//!
//! stream.seek(SeekFrom::Start(9))?;
//! assert_eq!(&stream.read(5)?[..], b"bytes");
//! # Ok(())
//! # }
//! ```

pub mod bevy;
pub mod codec;
pub mod config;
pub mod image;
pub mod resolver;
pub mod volume;

pub use aff4_core::{Compression, Error, Result, Urn};
pub use bevy::BevyWriter;
pub use config::ImageConfig;
pub use image::ImageStream;
pub use resolver::{MemoryResolver, Resolver, Value};
pub use volume::{MemberReader, MemberWriter, MemoryVolume, Volume};
