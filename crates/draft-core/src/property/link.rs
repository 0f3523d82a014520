//! Reference Links
//!
//! A link names another feature in the same document, optionally narrowed
//! to one of its sub-elements (a vector property or a polygon vertex).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of sub-element labels that address a polygon vertex (`Vertex0`, `Vertex1`, ...)
pub const VERTEX_PREFIX: &str = "Vertex";

/// A reference to another feature by name, plus an optional sub-element label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkSub {
    /// Name of the referenced feature
    pub target: String,
    /// Sub-element of the target (e.g. "StartPoint", "Center", "Vertex2")
    #[serde(default)]
    pub sub: Option<String>,
}

impl LinkSub {
    /// Link to a whole feature
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            sub: None,
        }
    }

    /// Link to a sub-element of a feature
    pub fn with_sub(target: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            sub: Some(sub.into()),
        }
    }

    /// The sub-element label, or `default` when none was given
    pub fn sub_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.sub.as_deref().unwrap_or(default)
    }

    /// Parse a `Vertex<i>` label into its zero-based index
    pub fn vertex_index(label: &str) -> Option<usize> {
        label.strip_prefix(VERTEX_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for LinkSub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "{}.{}", self.target, sub),
            None => write!(f, "{}", self.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_or_default() {
        let link = LinkSub::new("Line");
        assert_eq!(link.sub_or("StartPoint"), "StartPoint");

        let link = LinkSub::with_sub("Line", "EndPoint");
        assert_eq!(link.sub_or("StartPoint"), "EndPoint");
    }

    #[test]
    fn test_vertex_index() {
        assert_eq!(LinkSub::vertex_index("Vertex0"), Some(0));
        assert_eq!(LinkSub::vertex_index("Vertex12"), Some(12));
        assert_eq!(LinkSub::vertex_index("Vertex"), None);
        assert_eq!(LinkSub::vertex_index("EndPoint"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(LinkSub::new("Circle").to_string(), "Circle");
        assert_eq!(
            LinkSub::with_sub("Circle", "Center").to_string(),
            "Circle.Center"
        );
    }
}
