//! Execution-order computation.
//!
//! [`tree`] derives a weighted tree from the edge set, [`annotate`] writes the
//! labels, and [`manager`] decides when a change warrants a rebuild.

pub mod annotate;
pub mod manager;
pub mod tree;

pub use annotate::{Annotation, annotate};
pub use manager::OrderManager;
pub use tree::{OrderTree, TreeNode, build_tree};
