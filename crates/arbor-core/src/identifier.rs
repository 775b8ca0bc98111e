//! Node identifiers.
//!
//! This module provides the [`NodeId`] type. Ids minted by the editor have the
//! form `n<serial>` (see [`crate::mutation::IdAllocator`]), but any string is a
//! valid id so that trees restored from storage keep whatever ids they carry.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Prefix used for ids minted by the editor.
pub const ID_PREFIX: &str = "n";

/// Unique identifier of a node within one tree.
///
/// `NodeId` borrows as `str`, so maps keyed by `NodeId` can be queried with a
/// plain string slice.
///
/// # Examples
///
/// ```
/// use arbor_core::identifier::NodeId;
///
/// let id = NodeId::from_serial(12);
/// assert_eq!(id, "n12");
/// assert_eq!(id.numeric_suffix(), Some(12));
///
/// let custom = NodeId::new("root");
/// assert_eq!(custom.numeric_suffix(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates an `NodeId` from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the canonical id for a numeric serial, e.g. `n7`.
    pub fn from_serial(serial: u64) -> Self {
        Self(format!("{ID_PREFIX}{serial}"))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric part of the id after stripping any non-numeric prefix.
    ///
    /// `"n12"` yields `Some(12)`, `"node-3"` yields `Some(3)`. Ids whose
    /// remainder is empty or not a number (`"root"`, `"n1a"`) yield `None`.
    pub fn numeric_suffix(&self) -> Option<u64> {
        self.0
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse()
            .ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
