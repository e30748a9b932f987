//! Writes execution-order labels from a rebuilt [`OrderTree`].
//!
//! Two phases:
//!
//! 1. **Assign**: for each node in pre-order, the k-th block of its chain
//!    gets `pre_order_weight_sum + k` (k from 1).
//! 2. **Clear**: every top-level chain not wrapped by a reachable node has
//!    its labels reset to `None`.
//!
//! Afterwards exactly the blocks reachable from the root carry labels.

#![allow(clippy::module_name_repetitions)]

use tracing::trace;

use crate::model::block::{BlockHost, OrderStore, chain_from};

use super::tree::OrderTree;

/// Counts from one annotation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Blocks that received a label.
    pub labelled: usize,
    /// Blocks outside the tree whose label was reset.
    pub cleared: usize,
}

/// Label every chain in `tree`, then optionally clear chains outside it.
pub fn annotate<H>(host: &mut H, tree: &OrderTree, reset_outside: bool) -> Annotation
where
    H: BlockHost + OrderStore + ?Sized,
{
    let mut annotation = Annotation {
        labelled: assign(host, tree),
        cleared: 0,
    };
    if reset_outside {
        annotation.cleared = clear_outside(host, tree);
    }
    annotation
}

fn assign<H>(host: &mut H, tree: &OrderTree) -> usize
where
    H: BlockHost + OrderStore + ?Sized,
{
    let mut labelled = 0;
    for node in tree.preorder() {
        let chain = chain_from(&*host, node.chain_start.as_deref());
        let mut label = node.pre_order_weight_sum;
        for block in &chain {
            label = label.saturating_add(1);
            host.set_order(block, Some(label));
        }
        trace!(node = %node.block, base = node.pre_order_weight_sum, count = chain.len(), "labelled chain");
        labelled += chain.len();
    }
    labelled
}

fn clear_outside<H>(host: &mut H, tree: &OrderTree) -> usize
where
    H: BlockHost + OrderStore + ?Sized,
{
    let outside: Vec<String> = host
        .top_blocks()
        .into_iter()
        .filter(|block| !tree.contains(block))
        .map(str::to_string)
        .collect();

    let mut cleared = 0;
    for top in outside {
        let first = if host.is_wrapper(&top) {
            host.wrapped_first(&top).map(str::to_string)
        } else {
            Some(top)
        };
        for block in chain_from(&*host, first.as_deref()) {
            if host.order(&block).is_some() {
                host.clear_order(&block);
                cleared += 1;
            }
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::registry::EdgeRegistry;
    use crate::model::block::NodeKind;
    use crate::model::canvas::Canvas;
    use crate::order::tree::build_tree;

    fn labels(canvas: &Canvas, ids: &[&str]) -> Vec<Option<u32>> {
        ids.iter().map(|id| canvas.order(id)).collect()
    }

    #[test]
    fn worked_example_labels() {
        let mut host = Canvas::builder()
            .wrapper("R", 0.0, &["A", "B"])
            .kind("A", NodeKind::Top)
            .wrapper("C", 100.0, &["D"])
            .build();
        let mut edges = EdgeRegistry::new();
        edges.add(&host, "R", "C").expect("edge");

        let tree = build_tree(&host, edges.iter()).expect("tree");
        let annotation = annotate(&mut host, &tree, true);

        assert_eq!(labels(&host, &["A", "B", "D"]), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(labels(&host, &["R", "C"]), vec![None, None]);
        assert_eq!(annotation, Annotation { labelled: 3, cleared: 0 });
    }

    #[test]
    fn outside_chains_are_cleared() {
        let mut host = Canvas::builder()
            .wrapper("R", 0.0, &["T"])
            .kind("T", NodeKind::Top)
            .wrapper("X", 100.0, &["x1", "x2"])
            .block("loose", 200.0)
            .build();
        host.set_order("x1", Some(7));
        host.set_order("x2", Some(8));
        host.set_order("loose", Some(9));

        let tree = build_tree(&host, std::iter::empty()).expect("tree");
        let annotation = annotate(&mut host, &tree, true);

        assert_eq!(host.order("T"), Some(1));
        assert_eq!(labels(&host, &["x1", "x2", "loose"]), vec![None, None, None]);
        assert_eq!(annotation.cleared, 3);
    }

    #[test]
    fn reset_can_be_disabled() {
        let mut host = Canvas::builder()
            .wrapper("R", 0.0, &["T"])
            .kind("T", NodeKind::Top)
            .wrapper("X", 100.0, &["x1"])
            .build();
        host.set_order("x1", Some(4));

        let tree = build_tree(&host, std::iter::empty()).expect("tree");
        let annotation = annotate(&mut host, &tree, false);
        assert_eq!(host.order("x1"), Some(4));
        assert_eq!(annotation.cleared, 0);
    }
}
