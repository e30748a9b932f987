//! Editor-scoped registry of directed edges.
//!
//! # Invariants
//!
//! After any sequence of [`EdgeRegistry::add`] calls:
//!
//! - no edge connects a block to itself;
//! - no two edges connect the same unordered pair of blocks;
//! - every block is the target of at most one edge (fan-in limit);
//! - every root-eligible block is the source of at most one edge
//!   (fan-out limit for TOP blocks).
//!
//! `add` enforces the limits by disposing the edge that already occupies the
//! slot. The displaced edge is dropped silently: user gestures never fail.
//!
//! Edges restored from persisted state go through [`EdgeRegistry::insert`],
//! which only guarantees id uniqueness.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use tracing::{debug, trace, warn};

use crate::model::block::BlockHost;

use super::{DEFAULT_ID_LENGTH, Edge, EdgeId};

/// Ordered set of live edges. Iteration follows insertion order.
#[derive(Debug, Clone)]
pub struct EdgeRegistry {
    edges: Vec<Edge>,
    id_length: usize,
}

impl Default for EdgeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeRegistry {
    pub const fn new() -> Self {
        Self::with_id_length(DEFAULT_ID_LENGTH)
    }

    /// Registry whose generated ids are `id_length` characters long.
    pub const fn with_id_length(id_length: usize) -> Self {
        Self {
            edges: Vec::new(),
            id_length,
        }
    }

    /// Connect `from -> to`, displacing whatever occupies the target's
    /// incoming slot or a root source's outgoing slot.
    ///
    /// Returns `None` without touching the registry when `from == to`, when
    /// either block does not resolve in `host`, or when the two blocks are
    /// already connected in either direction.
    pub fn add<H: BlockHost + ?Sized>(&mut self, host: &H, from: &str, to: &str) -> Option<EdgeId> {
        if from == to {
            debug!(block = from, "rejecting self edge");
            return None;
        }
        if !host.contains(from) || !host.contains(to) {
            debug!(from, to, "rejecting edge to unresolved block");
            return None;
        }
        if self.between(from, to).is_some() {
            debug!(from, to, "rejecting duplicate edge");
            return None;
        }

        let displaced_incoming = self.remove_where(|edge| edge.is_connecting_to(to));
        for edge in &displaced_incoming {
            debug!(edge = %edge.id(), from = edge.from_block(), to, "displaced incoming edge");
        }

        if host.is_top_or_wrapping_top(from) {
            let displaced_outgoing = self.remove_where(|edge| edge.is_connecting_from(from));
            for edge in &displaced_outgoing {
                debug!(edge = %edge.id(), from, to = edge.to_block(), "displaced root outgoing edge");
            }
        }

        let id = self.fresh_id(None);
        self.edges.push(Edge::new(id.clone(), from, to));
        debug!(edge = %id, from, to, "edge added");
        Some(id)
    }

    /// Store an edge without applying the fan-in/fan-out rules.
    ///
    /// The supplied id is kept unless a live edge already uses it, in which
    /// case a fresh id is generated. A self edge or an empty endpoint is
    /// refused with `None`.
    pub fn insert(&mut self, id: Option<EdgeId>, from: &str, to: &str) -> Option<EdgeId> {
        if from.is_empty() || to.is_empty() || from == to {
            warn!(from, to, "refusing to restore edge with invalid endpoints");
            return None;
        }
        let id = self.fresh_id(id);
        self.edges.push(Edge::new(id.clone(), from, to));
        trace!(edge = %id, from, to, "edge restored");
        Some(id)
    }

    /// Unregister an edge. Removing an unknown or already-removed id is a
    /// no-op that returns `None`.
    pub fn remove(&mut self, id: &EdgeId) -> Option<Edge> {
        let idx = self.edges.iter().position(|edge| edge.id() == id)?;
        let mut edge = self.edges.remove(idx);
        edge.mark_disposed();
        debug!(edge = %id, "edge disposed");
        Some(edge)
    }

    /// Unregister every edge touching `block`.
    pub fn remove_touching(&mut self, block: &str) -> Vec<Edge> {
        let removed = self.remove_where(|edge| edge.is_connecting(block));
        if !removed.is_empty() {
            debug!(block, count = removed.len(), "disposed edges of block");
        }
        removed
    }

    pub fn get(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|edge| edge.id() == id)
    }

    /// The edge connecting `a` and `b` in either direction.
    pub fn between(&self, a: &str, b: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.is_same(a, b))
    }

    pub fn touching<'a>(&'a self, block: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.is_connecting(block))
    }

    pub(crate) fn touching_mut<'a>(
        &'a mut self,
        block: &'a str,
    ) -> impl Iterator<Item = &'a mut Edge> + 'a {
        self.edges.iter_mut().filter(move |edge| edge.is_connecting(block))
    }

    /// The single edge whose target is `block`, if any.
    pub fn incoming(&self, block: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.is_connecting_to(block))
    }

    pub fn outgoing<'a>(&'a self, block: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.is_connecting_from(block))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Owned copy of every live edge, in insertion order.
    pub fn snapshot(&self) -> Vec<Edge> {
        self.edges.clone()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn remove_where(&mut self, mut pred: impl FnMut(&Edge) -> bool) -> Vec<Edge> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.edges.len());
        for mut edge in self.edges.drain(..) {
            if pred(&edge) {
                edge.mark_disposed();
                removed.push(edge);
            } else {
                kept.push(edge);
            }
        }
        self.edges = kept;
        removed
    }

    fn fresh_id(&self, requested: Option<EdgeId>) -> EdgeId {
        if let Some(id) = requested {
            if self.get(&id).is_none() {
                return id;
            }
            debug!(edge = %id, "edge id already in use; generating a new one");
        }
        loop {
            let id = EdgeId::generate(self.id_length);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}
