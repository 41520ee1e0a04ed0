//! Newtype wrappers for semantic IDs
//!
//! These types keep arena indices, provider element handles and generated
//! resource names from being mixed up with each other or with plain integers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Stable, monotonically assigned identifier of a node in the layout arena.
///
/// Ids are handed out in creation order, so comparing two ids also compares
/// their discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position of the node inside the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle a box-model provider uses to name one of its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

/// A generated resource identifier (string, color, style, drawable name...).
#[derive(Debug, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct ResourceName(Arc<str>);

impl ResourceName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ResourceName {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for ResourceName {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_node_id_orders_by_creation() {
        let first = NodeId::new(3);
        let second = NodeId::new(7);
        assert!(first < second);
        assert_eq!(second.index(), 7);
        assert_eq!(first.to_string(), "3");
    }

    #[test]
    fn test_resource_name_creation() {
        let a = ResourceName::new("hello_world");
        let b = ResourceName::from("hello_world");
        let c = ResourceName::from(String::from("hello_world"));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "hello_world");
    }

    #[test]
    fn test_hash_map_usage() {
        let mut names = HashMap::new();
        names.insert(ResourceName::new("red"), 1);
        assert_eq!(names.get(&ResourceName::new("red")), Some(&1));

        let mut handles = HashMap::new();
        handles.insert(ElementHandle::new(9), "div");
        assert_eq!(handles.get(&ElementHandle::new(9)), Some(&"div"));
    }
}
