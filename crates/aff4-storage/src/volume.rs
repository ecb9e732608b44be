//! Volume Capability
//!
//! A volume is the container archive that persists named members - in a
//! real deployment a zip-like file, here an abstract capability so the
//! stream engine never assumes a particular backing store.
//!
//! ## The Contract
//!
//! - `create_member` opens a fresh member for writing. The member's bytes
//!   become durable when `finish` is called; `finish` is the point where a
//!   zip backend would write the local file header and central directory
//!   entry.
//! - `open_member` returns a readable, seekable handle with a known size.
//!   Opening a name that was never finished is `NotFound`.
//! - `add_child` records that a new object lives inside this volume.
//!
//! ## Thread Safety
//!
//! Implementations must be `Send + Sync`: several streams may share one
//! volume via `Arc<dyn Volume>`, and parallel member creation is the
//! volume's own concern.
//!
//! ## MemoryVolume
//!
//! The in-memory implementation backs every test in this workspace and
//! doubles as a scratch target for callers that only need transient
//! storage. It additionally exposes the raw member bytes so tests can
//! assert the on-disk layout byte for byte.

use std::collections::{BTreeSet, HashMap};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use aff4_core::{Error, Result, Urn};

/// A member opened for writing. Dropping without `finish` discards the
/// bytes; only `finish` makes the member visible to readers.
pub trait MemberWriter: Write {
    fn finish(self: Box<Self>) -> Result<()>;
}

/// A member opened for reading.
pub trait MemberReader: Read + Seek + std::fmt::Debug {
    fn size(&self) -> u64;
}

/// Container archive capability consumed by the stream engine.
pub trait Volume: Send + Sync {
    /// The volume's own URN.
    fn urn(&self) -> &Urn;

    /// Record `child` as an object stored inside this volume.
    fn add_child(&self, child: &Urn) -> Result<()>;

    /// Open a new named member for writing.
    fn create_member(&self, urn: &Urn) -> Result<Box<dyn MemberWriter>>;

    /// Open an existing member for reading.
    fn open_member(&self, urn: &Urn) -> Result<Box<dyn MemberReader>>;
}

#[derive(Default)]
struct MemoryVolumeInner {
    members: HashMap<String, Vec<u8>>,
    children: BTreeSet<String>,
}

/// In-memory [`Volume`] used by tests and transient workloads.
pub struct MemoryVolume {
    urn: Urn,
    inner: Arc<Mutex<MemoryVolumeInner>>,
}

impl MemoryVolume {
    pub fn new(urn: impl Into<Urn>) -> Self {
        MemoryVolume {
            urn: urn.into(),
            inner: Arc::new(Mutex::new(MemoryVolumeInner::default())),
        }
    }

    /// Raw bytes of a finished member, if present.
    pub fn member_bytes(&self, urn: &Urn) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().members.get(urn.as_str()).cloned()
    }

    /// Names of all finished members, sorted.
    pub fn member_names(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut names: Vec<String> = inner.members.keys().cloned().collect();
        names.sort();
        names
    }

    /// Child objects recorded via [`Volume::add_child`].
    pub fn children(&self) -> Vec<String> {
        self.inner.lock().unwrap().children.iter().cloned().collect()
    }

    /// Overwrite a member's bytes in place. Tests use this to simulate
    /// on-disk corruption such as a truncated bevy index.
    pub fn corrupt_member(&self, urn: &Urn, bytes: Vec<u8>) {
        self.inner
            .lock()
            .unwrap()
            .members
            .insert(urn.as_str().to_string(), bytes);
    }
}

impl Volume for MemoryVolume {
    fn urn(&self) -> &Urn {
        &self.urn
    }

    fn add_child(&self, child: &Urn) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .children
            .insert(child.as_str().to_string());
        Ok(())
    }

    fn create_member(&self, urn: &Urn) -> Result<Box<dyn MemberWriter>> {
        Ok(Box::new(MemoryMemberWriter {
            name: urn.as_str().to_string(),
            buf: Vec::new(),
            inner: Arc::clone(&self.inner),
        }))
    }

    fn open_member(&self, urn: &Urn) -> Result<Box<dyn MemberReader>> {
        let inner = self.inner.lock().unwrap();
        let bytes = inner
            .members
            .get(urn.as_str())
            .ok_or_else(|| Error::NotFound(urn.as_str().to_string()))?
            .clone();
        Ok(Box::new(MemoryMemberReader {
            cursor: Cursor::new(bytes),
        }))
    }
}

struct MemoryMemberWriter {
    name: String,
    buf: Vec<u8>,
    inner: Arc<Mutex<MemoryVolumeInner>>,
}

impl Write for MemoryMemberWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MemberWriter for MemoryMemberWriter {
    fn finish(self: Box<Self>) -> Result<()> {
        self.inner.lock().unwrap().members.insert(self.name, self.buf);
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryMemberReader {
    cursor: Cursor<Vec<u8>>,
}

impl Read for MemoryMemberReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MemoryMemberReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl MemberReader for MemoryMemberReader {
    fn size(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }
}
