//! Order updates triggered by a single block: drag settle, connect,
//! disconnect, dispose.
//!
//! An [`OrderManager`] is created for the block *before* the change. A
//! disposed wrapper no longer reports its nested chain and a disposed block
//! no longer carries a label, so the first wrapped block and the labels are
//! captured up front. [`OrderManager::update`] then decides whether
//! the block could have affected any label and, if so, rebuilds the whole
//! tree and re-annotates.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use tracing::debug;

use crate::config::OrderConfig;
use crate::edge::registry::EdgeRegistry;
use crate::model::block::{BlockHost, OrderStore};

use super::annotate::{Annotation, annotate};
use super::tree::build_tree;

/// Per-trigger order update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderManager {
    block: String,
    /// The trigger itself, or its first wrapped block for a wrapper.
    subject: Option<String>,
    subject_labelled: bool,
    next_labelled: bool,
}

impl OrderManager {
    /// Capture the trigger while the host still resolves it. Labels read
    /// here stay valid after the host disposes the block.
    pub fn new<H>(host: &H, block: &str) -> Self
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        let subject = if host.is_wrapper(block) {
            host.wrapped_first(block)
        } else {
            Some(block)
        };
        let subject_labelled = subject.is_some_and(|id| host.order(id).is_some());
        let next_labelled = subject
            .and_then(|id| host.next_block(id))
            .is_some_and(|next| host.order(next).is_some());
        Self {
            block: block.to_string(),
            subject: subject.map(str::to_string),
            subject_labelled,
            next_labelled,
        }
    }

    pub fn block(&self) -> &str {
        &self.block
    }

    /// Whether the trigger block can have changed any label.
    ///
    /// The subject qualifies if it carried a label when captured or carries
    /// one now. A subject that is still alive also qualifies through the
    /// block chained below it; a disposed one only through the successor
    /// label seen at capture.
    pub fn should_update<H>(&self, host: &H) -> bool
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        let Some(subject) = self.subject.as_deref() else {
            return false;
        };

        if self.subject_labelled || host.order(subject).is_some() {
            return true;
        }
        if host.is_disposed(subject) {
            return self.next_labelled;
        }
        host.next_block(subject)
            .is_some_and(|next| host.order(next).is_some())
    }

    /// Rebuild and re-annotate if [`Self::should_update`] allows it.
    /// Returns `true` if a tree was built and labels were written.
    pub fn update<H>(&self, host: &mut H, edges: &EdgeRegistry, config: &OrderConfig) -> bool
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        if !self.should_update(host) {
            debug!(block = %self.block, "order update not needed");
            return false;
        }
        self.rebuild(host, edges, config).is_some()
    }

    /// Rebuild and re-annotate unconditionally. `None` if no root exists,
    /// in which case no label is touched.
    pub fn rebuild<H>(
        &self,
        host: &mut H,
        edges: &EdgeRegistry,
        config: &OrderConfig,
    ) -> Option<Annotation>
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        let Some(tree) = build_tree(&*host, edges.iter()) else {
            debug!(block = %self.block, "no root block; order left untouched");
            return None;
        };

        host.clear_order(&self.block);
        let annotation = annotate(host, &tree, config.reset_outside);
        debug!(
            block = %self.block,
            root = %tree.root().block,
            nodes = tree.len(),
            total_weight = tree.total_weight(),
            labelled = annotation.labelled,
            cleared = annotation.cleared,
            "order rebuilt"
        );
        Some(annotation)
    }
}
