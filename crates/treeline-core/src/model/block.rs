//! Read-only view of the host editor's blocks, plus the order-label store.
//!
//! The host editor owns blocks, their chains, and their on-screen geometry.
//! Everything in this crate reaches those through two traits:
//!
//! - [`BlockHost`]: structural and geometric queries (next link, wrapped
//!   chain, bounding rectangle, node kind, top-level enumeration).
//! - [`OrderStore`]: the per-block execution-order label.
//!
//! Keeping them separate lets a host back labels with a different object
//! than the block tree, and lets the annotator borrow the two independently.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Behavior-tree role tag carried by a block.
///
/// `Top` marks root eligibility. `Left` and `Both` describe which connector
/// roles a block exposes; they never make a block a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Top,
    Left,
    Both,
}

impl NodeKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Left => "left",
            Self::Both => "both",
        }
    }

    /// `true` for any tag at all. Untagged blocks are plain blocks.
    pub const fn is_node(kind: Option<Self>) -> bool {
        kind.is_some()
    }

    pub const fn is_top(kind: Option<Self>) -> bool {
        matches!(kind, Some(Self::Top))
    }

    pub const fn is_left(kind: Option<Self>) -> bool {
        matches!(kind, Some(Self::Left))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown node kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node kind '{0}': expected top, left, or both")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "both" => Ok(Self::Both),
            other => Err(UnknownNodeKind(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in workspace units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned bounding rectangle of a rendered block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }
}

// ---------------------------------------------------------------------------
// Host traits
// ---------------------------------------------------------------------------

/// Structural and geometric queries into the host editor's block graph.
///
/// Every lookup is by block id. A block that is unknown or already disposed
/// answers `false`/`None`, never panics.
pub trait BlockHost {
    /// `true` if the id resolves to a live block.
    fn contains(&self, id: &str) -> bool;

    fn bounding_rect(&self, id: &str) -> Option<Rect>;

    /// The block attached below this one in its chain.
    fn next_block(&self, id: &str) -> Option<&str>;

    fn is_wrapper(&self, id: &str) -> bool;

    /// First block of the chain nested inside a wrapper.
    fn wrapped_first(&self, id: &str) -> Option<&str>;

    fn kind(&self, id: &str) -> Option<NodeKind>;

    /// Top-level blocks in the host's enumeration order.
    fn top_blocks(&self) -> Vec<&str>;

    fn rect_top(&self, id: &str) -> Option<f64> {
        self.bounding_rect(id).map(|rect| rect.top)
    }

    fn is_disposed(&self, id: &str) -> bool {
        !self.contains(id)
    }

    /// Node kind as seen through a wrapper: a wrapper reports the kind of
    /// its first wrapped block, anything else reports its own.
    fn wrap_kind(&self, id: &str) -> Option<NodeKind> {
        if self.is_wrapper(id) {
            self.wrapped_first(id).and_then(|first| self.kind(first))
        } else {
            self.kind(id)
        }
    }

    /// `true` if the block is TOP-kind itself or wraps a TOP-kind block.
    fn is_top_or_wrapping_top(&self, id: &str) -> bool {
        NodeKind::is_top(self.kind(id)) || NodeKind::is_top(self.wrap_kind(id))
    }
}

/// Per-block execution-order label store.
pub trait OrderStore {
    fn order(&self, id: &str) -> Option<u32>;

    fn set_order(&mut self, id: &str, order: Option<u32>);

    fn clear_order(&mut self, id: &str) {
        self.set_order(id, None);
    }
}

// ---------------------------------------------------------------------------
// Chain helpers
// ---------------------------------------------------------------------------

/// Collect the chain starting at `first` by following next links.
///
/// Stops early if a link revisits a block, so a corrupt host cannot make
/// this loop forever.
pub fn chain_from<H: BlockHost + ?Sized>(host: &H, first: Option<&str>) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cursor = first;
    while let Some(id) = cursor {
        if !seen.insert(id) {
            tracing::warn!(block = id, "chain revisits a block; stopping walk");
            break;
        }
        chain.push(id.to_string());
        cursor = host.next_block(id);
    }
    chain
}

/// Number of blocks reachable from `first` through next links.
pub fn following_count<H: BlockHost + ?Sized>(host: &H, first: Option<&str>) -> usize {
    chain_from(host, first).len()
}
