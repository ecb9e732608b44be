//! URN identifiers.
//!
//! AFF4 objects are named by URNs: opaque strings with a hierarchical
//! append operation. A bevy named `<stream>/00000003` and its index
//! `<stream>/00000003/index` are both children of the stream URN.

use std::fmt;

/// An opaque hierarchical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Urn(String);

impl Urn {
    pub fn new(value: impl Into<String>) -> Self {
        Urn(value.into())
    }

    /// Derive a child URN by appending a path component.
    pub fn append(&self, component: &str) -> Urn {
        Urn(format!("{}/{}", self.0, component))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Urn {
    fn from(value: &str) -> Self {
        Urn(value.to_string())
    }
}

impl From<String> for Urn {
    fn from(value: String) -> Self {
        Urn(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_builds_child_path() {
        let stream = Urn::new("aff4://9cd47cf3/image");
        let bevy = stream.append("00000000");
        assert_eq!(bevy.as_str(), "aff4://9cd47cf3/image/00000000");

        let index = bevy.append("index");
        assert_eq!(index.as_str(), "aff4://9cd47cf3/image/00000000/index");
    }

    #[test]
    fn display_matches_as_str() {
        let urn = Urn::new("aff4://volume");
        assert_eq!(format!("{}", urn), urn.as_str());
    }

    #[test]
    fn equality_and_hash_by_value() {
        use std::collections::HashSet;

        let a = Urn::new("aff4://x");
        let b = Urn::from("aff4://x");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }
}
