//! Structural addresses inside a variant tree
//!
//! A [`VariantPath`] locates a node by index at each depth. On the wire it is
//! the alternating form `[0, "children", 2]` (root's first node, its third
//! child); as text it is `0.children.2`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VariantError;

/// Marker separating two indices in the alternating path form
pub const CHILDREN_MARKER: &str = "children";

/// One element of the alternating wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Marker(String),
}

/// Path from the root list to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VariantPath(Vec<usize>);

impl VariantPath {
    /// The root list itself
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Build a path from the alternating segment form.
    ///
    /// Indices must sit at even positions and the `children` marker at odd
    /// positions. A trailing marker is accepted and addresses the same node.
    pub fn from_segments(segments: &[PathSegment]) -> Result<Self, VariantError> {
        let mut indices = Vec::with_capacity(segments.len() / 2 + 1);
        for (position, segment) in segments.iter().enumerate() {
            match (position % 2, segment) {
                (0, PathSegment::Index(index)) => indices.push(*index),
                (1, PathSegment::Marker(marker)) if marker == CHILDREN_MARKER => {}
                _ => {
                    return Err(VariantError::InvalidPath(format!(
                        "unexpected segment {:?} at position {}",
                        segment, position
                    )))
                }
            }
        }
        Ok(Self(indices))
    }

    /// Alternating segment form, without a trailing marker
    #[must_use]
    pub fn segments(&self) -> Vec<PathSegment> {
        let mut segments = Vec::with_capacity(self.0.len() * 2);
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                segments.push(PathSegment::Marker(CHILDREN_MARKER.to_string()));
            }
            segments.push(PathSegment::Index(*index));
        }
        segments
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of indices, which is also the 1-based depth of the addressed node
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the `index`-th child of this node
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Parent path and the index within the parent's list
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, usize)> {
        self.0
            .split_last()
            .map(|(last, parent)| (Self(parent.to_vec()), *last))
    }
}

impl Display for VariantPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        let separator = format!(".{}.", CHILDREN_MARKER);
        let text = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator.as_str());
        f.write_str(&text)
    }
}

impl FromStr for VariantPath {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "<root>" {
            return Ok(Self::root());
        }
        let segments = trimmed
            .split('.')
            .map(|part| match part.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Marker(part.to_string()),
            })
            .collect::<Vec<_>>();
        Self::from_segments(&segments).map_err(|_| VariantError::InvalidPath(s.to_string()))
    }
}

impl From<Vec<usize>> for VariantPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl Serialize for VariantPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.segments().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VariantPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Segments(Vec<PathSegment>),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Segments(segments) => {
                Self::from_segments(&segments).map_err(serde::de::Error::custom)
            }
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
