//! Addressing types for stored records
//!
//! This module defines how a record is located in a store:
//! - [`Namespace`]: logical partition shared by every key of a harness run
//! - [`KeyName`]: string name or integer id, unique within a kind
//! - [`Key`]: namespace + kind + name

use serde::{Deserialize, Serialize};

/// Logical namespace for data isolation
///
/// Every key written by one harness process lives in the same namespace, so
/// two harnesses pointed at one backend never observe each other's records.
///
/// # Examples
///
/// ```
/// use skewcheck_core::types::Namespace;
///
/// let ns = Namespace::new("test");
/// assert_eq!(ns.as_str(), "test");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    /// Create a new namespace
    pub fn new(name: impl Into<String>) -> Self {
        Namespace(name.into())
    }

    /// Borrow the namespace name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "<default>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Identifier of a record within its kind
///
/// Names and ids live in separate spaces: `Name("1")` and `Id(1)` are
/// different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyName {
    /// String name, e.g. `"x"`
    Name(String),
    /// Integer id, e.g. `1`
    Id(i64),
}

impl std::fmt::Display for KeyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyName::Name(name) => write!(f, "{:?}", name),
            KeyName::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Fully qualified record key
///
/// Keys are ordered namespace → kind → name, which keeps records of one kind
/// adjacent in ordered maps.
///
/// # Examples
///
/// ```
/// use skewcheck_core::types::{Key, Namespace};
///
/// let ns = Namespace::new("test");
/// let x = Key::named(&ns, "test_read_skew", "x");
/// let one = Key::id(&ns, "test_read_skew", 1);
/// assert_ne!(x, one);
/// assert_eq!(x.to_string(), "test/test_read_skew/\"x\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Namespace the record lives in
    pub namespace: Namespace,
    /// Logical collection ("kind") of the record
    pub kind: String,
    /// Name or id within the kind
    pub name: KeyName,
}

impl Key {
    /// Create a key from its parts
    pub fn new(namespace: Namespace, kind: impl Into<String>, name: KeyName) -> Self {
        Self {
            namespace,
            kind: kind.into(),
            name,
        }
    }

    /// Create a string-named key
    pub fn named(namespace: &Namespace, kind: &str, name: impl Into<String>) -> Self {
        Self::new(namespace.clone(), kind, KeyName::Name(name.into()))
    }

    /// Create an integer-id key
    pub fn id(namespace: &Namespace, kind: &str, id: i64) -> Self {
        Self::new(namespace.clone(), kind, KeyName::Id(id))
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.kind, self.name)
    }
}
