//! In-memory block canvas implementing [`BlockHost`] and [`OrderStore`].
//!
//! A `Canvas` is the smallest host that can drive the edge registry and the
//! order pipeline: blocks with a kind tag, a bounding rectangle, an optional
//! next link, an optional wrapped chain, and an order label. The CLI loads
//! one from a scene file; tests build one with [`Canvas::builder`].

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::block::{BlockHost, NodeKind, OrderStore, Rect};

/// Default block width and height used when a scene omits them.
pub const DEFAULT_BLOCK_WIDTH: f64 = 120.0;
pub const DEFAULT_BLOCK_HEIGHT: f64 = 60.0;

const fn default_width() -> f64 {
    DEFAULT_BLOCK_WIDTH
}

const fn default_height() -> f64 {
    DEFAULT_BLOCK_HEIGHT
}

/// Serialized form of one block in a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(default)]
    pub wrapper: bool,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl BlockSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            wrapper: false,
            x: 0.0,
            top: 0.0,
            width: DEFAULT_BLOCK_WIDTH,
            height: DEFAULT_BLOCK_HEIGHT,
            next: None,
            wrapped: None,
            order: None,
        }
    }

    const fn rect(&self) -> Rect {
        Rect {
            left: self.x,
            top: self.top,
            width: self.width,
            height: self.height,
        }
    }
}

/// Block store keyed by id, preserving insertion order for enumeration.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    blocks: HashMap<String, BlockSpec>,
    order: Vec<String>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> CanvasBuilder {
        CanvasBuilder::default()
    }

    /// Build a canvas from block specs, keeping their order.
    ///
    /// A later spec with a duplicate id replaces the earlier one.
    pub fn from_specs(specs: impl IntoIterator<Item = BlockSpec>) -> Self {
        let mut canvas = Self::new();
        for spec in specs {
            canvas.insert(spec);
        }
        canvas
    }

    pub fn insert(&mut self, spec: BlockSpec) {
        if !self.blocks.contains_key(&spec.id) {
            self.order.push(spec.id.clone());
        }
        self.blocks.insert(spec.id.clone(), spec);
    }

    pub fn get(&self, id: &str) -> Option<&BlockSpec> {
        self.blocks.get(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block specs in insertion order.
    pub fn specs(&self) -> impl Iterator<Item = &BlockSpec> {
        self.order.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Move a block by a delta. Nested and following blocks move with it.
    pub fn move_by(&mut self, id: &str, dx: f64, dy: f64) -> bool {
        if !self.blocks.contains_key(id) {
            return false;
        }
        for member in self.subtree_ids(id) {
            if let Some(spec) = self.blocks.get_mut(&member) {
                spec.x += dx;
                spec.top += dy;
            }
        }
        true
    }

    /// Dispose a block along with everything nested in it and everything
    /// chained below it. Links from surviving blocks into the removed set
    /// are cut. Returns the removed ids.
    pub fn dispose(&mut self, id: &str) -> Vec<String> {
        if !self.blocks.contains_key(id) {
            return Vec::new();
        }
        let removed = self.subtree_ids(id);
        let removed_set: HashSet<&str> = removed.iter().map(String::as_str).collect();

        for spec in self.blocks.values_mut() {
            if spec.next.as_deref().is_some_and(|n| removed_set.contains(n)) {
                spec.next = None;
            }
            if spec.wrapped.as_deref().is_some_and(|w| removed_set.contains(w)) {
                spec.wrapped = None;
            }
        }
        for member in &removed {
            self.blocks.remove(member);
        }
        self.order.retain(|kept| !removed_set.contains(kept.as_str()));
        tracing::debug!(block = id, removed = removed.len(), "disposed block subtree");
        removed
    }

    /// The block plus everything nested in or chained below it.
    fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(spec) = self.blocks.get(&current) {
                if let Some(next) = &spec.next {
                    stack.push(next.clone());
                }
                if let Some(wrapped) = &spec.wrapped {
                    stack.push(wrapped.clone());
                }
                out.push(current);
            }
        }
        out
    }
}

impl BlockHost for Canvas {
    fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    fn bounding_rect(&self, id: &str) -> Option<Rect> {
        self.blocks.get(id).map(BlockSpec::rect)
    }

    fn next_block(&self, id: &str) -> Option<&str> {
        self.blocks
            .get(id)
            .and_then(|spec| spec.next.as_deref())
            .filter(|next| self.blocks.contains_key(*next))
    }

    fn is_wrapper(&self, id: &str) -> bool {
        self.blocks.get(id).is_some_and(|spec| spec.wrapper)
    }

    fn wrapped_first(&self, id: &str) -> Option<&str> {
        self.blocks
            .get(id)
            .filter(|spec| spec.wrapper)
            .and_then(|spec| spec.wrapped.as_deref())
            .filter(|first| self.blocks.contains_key(*first))
    }

    fn kind(&self, id: &str) -> Option<NodeKind> {
        self.blocks.get(id).and_then(|spec| spec.kind)
    }

    fn top_blocks(&self) -> Vec<&str> {
        let placed: HashSet<&str> = self
            .blocks
            .values()
            .flat_map(|spec| [spec.next.as_deref(), spec.wrapped.as_deref()])
            .flatten()
            .collect();
        self.order
            .iter()
            .map(String::as_str)
            .filter(|id| !placed.contains(id))
            .collect()
    }
}

impl OrderStore for Canvas {
    fn order(&self, id: &str) -> Option<u32> {
        self.blocks.get(id).and_then(|spec| spec.order)
    }

    fn set_order(&mut self, id: &str, order: Option<u32>) {
        if let Some(spec) = self.blocks.get_mut(id) {
            spec.order = order;
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Fluent builder for test and demo canvases.
///
/// ```rust
/// use treeline_core::model::canvas::Canvas;
/// use treeline_core::model::block::NodeKind;
///
/// let canvas = Canvas::builder()
///     .wrapper("R", 0.0, &["T", "A"])
///     .kind("T", NodeKind::Top)
///     .build();
/// assert_eq!(canvas.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct CanvasBuilder {
    specs: Vec<BlockSpec>,
}

impl CanvasBuilder {
    /// Add a plain top-level block at a vertical position.
    #[must_use]
    pub fn block(mut self, id: &str, top: f64) -> Self {
        let mut spec = BlockSpec::new(id);
        spec.top = top;
        self.specs.push(spec);
        self
    }

    /// Add a wrapper at `top` whose nested chain is `chain`, in order.
    #[must_use]
    pub fn wrapper(mut self, id: &str, top: f64, chain: &[&str]) -> Self {
        let mut wrapper = BlockSpec::new(id);
        wrapper.wrapper = true;
        wrapper.top = top;
        wrapper.wrapped = chain.first().map(|first| (*first).to_string());
        self.specs.push(wrapper);

        for (idx, member) in chain.iter().enumerate() {
            let mut spec = BlockSpec::new(*member);
            spec.top = top + 20.0 * (idx as f64 + 1.0);
            spec.next = chain.get(idx + 1).map(|next| (*next).to_string());
            self.specs.push(spec);
        }
        self
    }

    /// Tag an already-added block with a node kind.
    #[must_use]
    pub fn kind(mut self, id: &str, kind: NodeKind) -> Self {
        if let Some(spec) = self.specs.iter_mut().find(|spec| spec.id == id) {
            spec.kind = Some(kind);
        }
        self
    }

    pub fn build(self) -> Canvas {
        Canvas::from_specs(self.specs)
    }
}
