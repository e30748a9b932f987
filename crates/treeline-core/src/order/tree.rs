//! Rooted behavior tree reconstructed from the edge set.
//!
//! # Model
//!
//! Each block referenced by an edge becomes one [`TreeNode`] wrapping that
//! block's nested chain. A node's **weight** is the number of blocks in the
//! chain; its **pre-order weight sum** is the total weight of every node
//! visited before it in a single pre-order walk from the root. Chain labels
//! for a node start right after that sum, which makes the labels of the
//! whole tree one contiguous range.
//!
//! ```text
//!  R [A, B]  (weight 2, sum 0)  → A=1 B=2
//!  ├── C [D]     (weight 1, sum 2)  → D=3
//!  │   └── E [F, G] (weight 2, sum 3) → F=4 G=5
//!  └── H [I]     (weight 1, sum 5)  → I=6
//! ```
//!
//! Siblings are ordered by their on-screen vertical position; equal
//! positions keep discovery order.
//!
//! # Storage
//!
//! Nodes live in an arena (`Vec<TreeNode>`) with an id→index table. Parent
//! and child links are indices, and the pre-order walk tracks visited nodes,
//! so a malformed cyclic edge set still terminates.
//!
//! # Root selection
//!
//! The first block, in edge-scan order, whose wrap kind is TOP becomes the
//! root. If no connected block qualifies, the first top-level block that is
//! TOP or wraps a TOP block becomes a childless root of weight 1. Otherwise
//! there is no tree.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::HashMap;

use tracing::{trace, warn};

use crate::edge::Edge;
use crate::model::block::{BlockHost, NodeKind, following_count};

/// One node of the rebuilt tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Block this node wraps.
    pub block: String,
    /// Number of blocks in the wrapped chain.
    pub weight: u32,
    /// Vertical position used to order siblings.
    pub rect_top: f64,
    /// Weight of every node visited before this one in pre-order.
    pub pre_order_weight_sum: u32,
    /// Child indices into the arena, sorted by `rect_top`.
    pub children: Vec<usize>,
    /// First block of the chain that receives this node's labels.
    pub chain_start: Option<String>,
}

/// Arena-backed tree produced by [`build_tree`].
#[derive(Debug, Clone)]
pub struct OrderTree {
    nodes: Vec<TreeNode>,
    index: HashMap<String, usize>,
    root: usize,
    preorder: Vec<usize>,
    reachable: Vec<bool>,
    total_weight: u32,
}

impl OrderTree {
    pub fn root(&self) -> &TreeNode {
        &self.nodes[self.root]
    }

    /// Nodes reachable from the root, in pre-order.
    pub fn preorder(&self) -> impl Iterator<Item = &TreeNode> {
        self.preorder.iter().map(|&idx| &self.nodes[idx])
    }

    pub fn children(&self, node: &TreeNode) -> impl Iterator<Item = &TreeNode> {
        node.children.iter().map(|&idx| &self.nodes[idx])
    }

    /// The node for `block`, whether or not it is reachable from the root.
    pub fn node(&self, block: &str) -> Option<&TreeNode> {
        self.index.get(block).map(|&idx| &self.nodes[idx])
    }

    /// `true` if `block` wraps a node reachable from the root.
    pub fn contains(&self, block: &str) -> bool {
        self.index
            .get(block)
            .is_some_and(|&idx| self.reachable[idx])
    }

    /// Sum of the weights of every reachable node.
    pub const fn total_weight(&self) -> u32 {
        self.total_weight
    }

    /// Number of reachable nodes.
    pub fn len(&self) -> usize {
        self.preorder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preorder.is_empty()
    }
}

/// Rebuild the tree from scratch.
///
/// Edges whose blocks no longer resolve in `host` are skipped; the rest of
/// the build proceeds. Self edges are skipped as well.
pub fn build_tree<'e, H, I>(host: &H, edges: I) -> Option<OrderTree>
where
    H: BlockHost + ?Sized,
    I: IntoIterator<Item = &'e Edge>,
{
    let mut builder = TreeBuilder::default();

    for edge in edges {
        let from = builder.node_for(host, edge.from_block());
        let to = builder.node_for(host, edge.to_block());
        match (from, to) {
            (Some(parent), Some(child)) if parent != child => builder.attach(parent, child),
            (Some(_), Some(_)) => trace!(edge = %edge.id(), "skipping self edge"),
            _ => warn!(
                edge = %edge.id(),
                from = edge.from_block(),
                to = edge.to_block(),
                "skipping edge with unresolved block"
            ),
        }
    }

    if builder.root.is_none() {
        builder.root = builder.singleton_root(host);
    }
    let root = builder.root?;
    Some(builder.finish(root))
}

#[derive(Debug, Default)]
struct TreeBuilder {
    nodes: Vec<TreeNode>,
    index: HashMap<String, usize>,
    root: Option<usize>,
}

impl TreeBuilder {
    /// Memoized node for `block`, created on first reference.
    fn node_for<H: BlockHost + ?Sized>(&mut self, host: &H, block: &str) -> Option<usize> {
        if let Some(&idx) = self.index.get(block) {
            return Some(idx);
        }
        if !host.contains(block) {
            return None;
        }

        let chain_start = host.wrapped_first(block).map(str::to_string);
        let weight = count_u32(following_count(host, chain_start.as_deref()));
        let idx = self.push(TreeNode {
            block: block.to_string(),
            weight,
            rect_top: host.rect_top(block).unwrap_or_default(),
            pre_order_weight_sum: 0,
            children: Vec::new(),
            chain_start,
        });

        if self.root.is_none() && NodeKind::is_top(host.wrap_kind(block)) {
            trace!(block, "root found among connected blocks");
            self.root = Some(idx);
        }
        Some(idx)
    }

    fn push(&mut self, node: TreeNode) -> usize {
        let idx = self.nodes.len();
        self.index.insert(node.block.clone(), idx);
        self.nodes.push(node);
        idx
    }

    /// Insert `child` under `parent`, keeping children sorted by vertical
    /// position. Ties go after existing equals.
    fn attach(&mut self, parent: usize, child: usize) {
        let top = self.nodes[child].rect_top;
        let nodes = &self.nodes;
        let pos = nodes[parent]
            .children
            .partition_point(|&sibling| nodes[sibling].rect_top <= top);
        self.nodes[parent].children.insert(pos, child);
    }

    /// Fallback root: a lone top-level TOP block with no edges.
    fn singleton_root<H: BlockHost + ?Sized>(&mut self, host: &H) -> Option<usize> {
        let block = host
            .top_blocks()
            .into_iter()
            .find(|block| host.is_top_or_wrapping_top(block))?
            .to_string();

        let chain_start = if host.is_wrapper(&block) {
            host.wrapped_first(&block).map(str::to_string)
        } else {
            Some(block.clone())
        };
        trace!(block = %block, "using lone top-level block as root");
        let node = TreeNode {
            block,
            weight: 1,
            rect_top: 0.0,
            pre_order_weight_sum: 0,
            children: Vec::new(),
            chain_start,
        };
        if let Some(&existing) = self.index.get(&node.block) {
            self.nodes[existing] = node;
            return Some(existing);
        }
        Some(self.push(node))
    }

    /// Single pre-order walk with one running accumulator.
    fn finish(mut self, root: usize) -> OrderTree {
        let mut reachable = vec![false; self.nodes.len()];
        let mut preorder = Vec::with_capacity(self.nodes.len());
        let mut accumulated: u32 = 0;
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            if reachable[idx] {
                warn!(block = %self.nodes[idx].block, "node reached twice; edge set is not a tree");
                continue;
            }
            reachable[idx] = true;
            preorder.push(idx);

            let node = &mut self.nodes[idx];
            node.pre_order_weight_sum = accumulated;
            accumulated = accumulated.saturating_add(node.weight);
            stack.extend(node.children.iter().rev().copied());
        }

        OrderTree {
            nodes: self.nodes,
            index: self.index,
            root,
            preorder,
            reachable,
            total_weight: accumulated,
        }
    }
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
