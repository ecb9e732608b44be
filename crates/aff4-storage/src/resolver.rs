//! Resolver Capability
//!
//! The resolver is the metadata store: a typed key/value store over
//! (subject URN, predicate URN) pairs. The stream engine persists its
//! parameters there on flush and reads them back on load; it never cares
//! what actually backs the store.
//!
//! Implementations must be `Send + Sync` - the resolver is typically
//! process-wide and shared across streams via `Arc<dyn Resolver>`.

use std::collections::HashMap;
use std::sync::Mutex;

use aff4_core::{Error, Result, Urn};

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Urn(Urn),
    Integer(u64),
}

impl Value {
    pub fn as_urn(&self) -> Result<&Urn> {
        match self {
            Value::Urn(urn) => Ok(urn),
            other => Err(Error::Metadata(format!("expected URN value, got {other:?}"))),
        }
    }

    pub fn as_integer(&self) -> Result<u64> {
        match self {
            Value::Integer(value) => Ok(*value),
            other => Err(Error::Metadata(format!(
                "expected integer value, got {other:?}"
            ))),
        }
    }
}

/// Metadata store capability consumed by the stream engine.
pub trait Resolver: Send + Sync {
    /// Record `value` under `(subject, predicate)`, replacing any previous
    /// value.
    fn set(&self, subject: &Urn, predicate: &str, value: Value) -> Result<()>;

    /// Look up the value recorded under `(subject, predicate)`.
    fn get(&self, subject: &Urn, predicate: &str) -> Result<Option<Value>>;
}

/// In-memory [`Resolver`] used by tests.
#[derive(Default)]
pub struct MemoryResolver {
    store: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        MemoryResolver::default()
    }
}

impl Resolver for MemoryResolver {
    fn set(&self, subject: &Urn, predicate: &str, value: Value) -> Result<()> {
        self.store
            .lock()
            .unwrap()
            .insert((subject.as_str().to_string(), predicate.to_string()), value);
        Ok(())
    }

    fn get(&self, subject: &Urn, predicate: &str) -> Result<Option<Value>> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .get(&(subject.as_str().to_string(), predicate.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrip() {
        let resolver = MemoryResolver::new();
        let subject = Urn::new("aff4://image");

        resolver
            .set(&subject, "http://aff4.org/Schema#size", Value::Integer(4096))
            .unwrap();

        let value = resolver
            .get(&subject, "http://aff4.org/Schema#size")
            .unwrap()
            .unwrap();
        assert_eq!(value.as_integer().unwrap(), 4096);
    }

    #[test]
    fn missing_attribute_is_none() {
        let resolver = MemoryResolver::new();
        let subject = Urn::new("aff4://image");
        assert!(resolver
            .get(&subject, "http://aff4.org/Schema#size")
            .unwrap()
            .is_none());
    }

    #[test]
    fn set_replaces_previous_value() {
        let resolver = MemoryResolver::new();
        let subject = Urn::new("aff4://image");
        let predicate = "http://aff4.org/Schema#size";

        resolver.set(&subject, predicate, Value::Integer(1)).unwrap();
        resolver.set(&subject, predicate, Value::Integer(2)).unwrap();

        let value = resolver.get(&subject, predicate).unwrap().unwrap();
        assert_eq!(value.as_integer().unwrap(), 2);
    }

    #[test]
    fn type_mismatch_is_metadata_error() {
        let value = Value::Urn(Urn::new("aff4://volume"));
        assert!(matches!(value.as_integer(), Err(Error::Metadata(_))));

        let value = Value::Integer(7);
        assert!(matches!(value.as_urn(), Err(Error::Metadata(_))));
    }
}
