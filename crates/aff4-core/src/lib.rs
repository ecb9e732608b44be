//! Core vocabulary for AFF4 image streams.
//!
//! This crate holds the types shared by every layer of the engine: the
//! error enum, URN identifiers, the AFF4 lexicon (predicate URNs and
//! format constants), and the compression method enum. The stream engine
//! itself lives in `aff4-storage`.

pub mod compression;
pub mod error;
pub mod lexicon;
pub mod urn;

pub use compression::Compression;
pub use error::{Error, Result};
pub use urn::Urn;
