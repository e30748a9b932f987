//! Directed arrow-line edges between blocks.
//!
//! ## Submodules
//!
//! - [`registry`]: the editor-scoped edge set with fan-in/fan-out rules.
//! - [`codec`]: XML element and structured record persistence.
//! - [`geometry`]: the two anchor points and path of a rendered edge.

pub mod codec;
pub mod geometry;
pub mod registry;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use geometry::LineGeometry;

/// Alphabet used for generated edge ids.
const ID_SOUP: &[u8] =
    b"!#$%()*+,-./:;=?@[]^_`{|}~ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default length of a generated edge id.
pub const DEFAULT_ID_LENGTH: usize = 20;

/// Identifier of one edge. Unique among live edges of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random id of `len` characters.
    #[must_use]
    pub fn generate(len: usize) -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..len.max(1))
            .map(|_| char::from(ID_SOUP[rng.gen_range(0..ID_SOUP.len())]))
            .collect();
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A directed connection `from -> to`: the source is the parent in the
/// behavior tree, the target its child.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    from: String,
    to: String,
    geometry: LineGeometry,
    disposed: bool,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id,
            from: from.into(),
            to: to.into(),
            geometry: LineGeometry::default(),
            disposed: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &EdgeId {
        &self.id
    }

    #[must_use]
    pub fn from_block(&self) -> &str {
        &self.from
    }

    #[must_use]
    pub fn to_block(&self) -> &str {
        &self.to
    }

    #[must_use]
    pub fn pair(&self) -> [&str; 2] {
        [&self.from, &self.to]
    }

    #[must_use]
    pub fn is_connecting_to(&self, block: &str) -> bool {
        self.to == block
    }

    #[must_use]
    pub fn is_connecting_from(&self, block: &str) -> bool {
        self.from == block
    }

    #[must_use]
    pub fn is_connecting(&self, block: &str) -> bool {
        self.from == block || self.to == block
    }

    /// Direction-insensitive pair comparison.
    #[must_use]
    pub fn is_same(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    #[must_use]
    pub const fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    pub(crate) fn geometry_mut(&mut self) -> &mut LineGeometry {
        &mut self.geometry
    }

    /// Set once the edge has left its registry.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}
