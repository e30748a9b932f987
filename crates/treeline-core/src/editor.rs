//! Editor facade: the operations a host canvas calls.
//!
//! The [`Editor`] owns the editor-scoped state (edge registry, connector
//! decorations, the gesture controller) and borrows the host for each call.
//! Every edge mutation is followed, within the same call, by at most one
//! order rebuild.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use tracing::{debug, info};

use crate::config::TreelineConfig;
use crate::connector::{ConnectorRef, ConnectorSet};
use crate::edge::codec::{self, CodecError, EdgeRecord};
use crate::edge::registry::EdgeRegistry;
use crate::edge::{Edge, EdgeId};
use crate::error::ErrorCode;
use crate::gesture::{GestureController, Release};
use crate::model::block::{BlockHost, OrderStore, Point};
use crate::order::{Annotation, OrderManager};

/// Persisted edge formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFormat {
    /// `<arrowline id=".." from=".." to=".."/>`
    Xml,
    /// JSON object `{"id": .., "from": .., "to": ..}`
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),
    #[error("edge '{from}' -> '{to}' has invalid endpoints")]
    InvalidEndpoints { from: String, to: String },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl EditorError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EdgeNotFound(_) => ErrorCode::EdgeNotFound,
            Self::InvalidEndpoints { .. } => ErrorCode::InvalidEdgeEndpoints,
            Self::Codec(err) => err.code(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Editor {
    config: TreelineConfig,
    edges: EdgeRegistry,
    connectors: ConnectorSet,
    gesture: GestureController,
}

impl Editor {
    pub fn new(config: TreelineConfig) -> Self {
        let edges = EdgeRegistry::with_id_length(config.edges.id_length);
        Self::with_edges(config, edges)
    }

    /// Editor over an already populated registry, e.g. a restored scene.
    pub fn with_edges(config: TreelineConfig, edges: EdgeRegistry) -> Self {
        let connectors = ConnectorSet::new(config.connector.clone());
        Self {
            config,
            edges,
            connectors,
            gesture: GestureController::new(),
        }
    }

    pub const fn config(&self) -> &TreelineConfig {
        &self.config
    }

    pub const fn edges(&self) -> &EdgeRegistry {
        &self.edges
    }

    pub fn into_edges(self) -> EdgeRegistry {
        self.edges
    }

    pub const fn connectors(&self) -> &ConnectorSet {
        &self.connectors
    }

    pub fn connectors_mut(&mut self) -> &mut ConnectorSet {
        &mut self.connectors
    }

    pub const fn gesture(&self) -> &GestureController {
        &self.gesture
    }

    // -----------------------------------------------------------------------
    // Decorations
    // -----------------------------------------------------------------------

    /// Decorate `block` with its two connectors and draw any edges that
    /// already touch it.
    pub fn attach_connectors<H: BlockHost + ?Sized>(&mut self, host: &H, block: &str) -> bool {
        if !self.connectors.attach(host, block) {
            return false;
        }
        self.rerender_touching(block);
        true
    }

    /// Run deferred decoration work queued since the last tick.
    pub fn run_deferred(&mut self) -> usize {
        self.connectors.run_deferred()
    }

    /// Badge text for `block`: its order label, or the placeholder.
    pub fn badge_text<H: OrderStore + ?Sized>(&self, host: &H, block: &str) -> String {
        host.order(block)
            .map_or_else(|| self.config.order.placeholder.clone(), |label| label.to_string())
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    /// Arm a gesture from `source`. Unknown or inactive connectors are
    /// ignored.
    pub fn pointer_down(&mut self, source: &ConnectorRef) -> bool {
        if !self.is_live(source) {
            return false;
        }
        self.gesture.pointer_down(source.clone());
        true
    }

    /// Finish a gesture.
    ///
    /// `receiver` is the connector that got the pointer-up, `release` the
    /// release point. A connector hit-tested at `release` takes precedence
    /// over `receiver`. A compatible pair is committed as an edge.
    pub fn pointer_up<H>(&mut self, host: &mut H, receiver: Option<&ConnectorRef>, release: Option<Point>) -> Release
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        let receiver = receiver.filter(|target| self.is_live(target));
        let over = release.and_then(|point| self.connectors.hit_test(point));
        let outcome = self.gesture.pointer_up(receiver, over.as_ref());
        if let Release::Connect { from, to } = &outcome {
            self.commit_gesture_edge(host, from, to);
        }
        outcome
    }

    fn is_live(&self, target: &ConnectorRef) -> bool {
        self.connectors
            .connector(target)
            .is_some_and(|connector| connector.is_active())
    }

    // -----------------------------------------------------------------------
    // Edge operations
    // -----------------------------------------------------------------------

    /// Connect `from -> to` and refresh order labels.
    ///
    /// Rejected requests (self edge, duplicate pair, unknown block) return
    /// `None` and leave labels alone.
    pub fn commit_gesture_edge<H>(&mut self, host: &mut H, from: &str, to: &str) -> Option<EdgeId>
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        let id = self.edges.add(&*host, from, to)?;
        self.render(&id);
        let rebuilt = [from, to]
            .into_iter()
            .any(|block| OrderManager::new(&*host, block).update(host, &self.edges, &self.config.order));
        info!(edge = %id, from, to, rebuilt, "edge committed");
        Some(id)
    }

    /// Rebuild every label from scratch, regardless of dirty state.
    pub fn recompute_order<H>(&self, host: &mut H, block: &str) -> Option<Annotation>
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        OrderManager::new(&*host, block).rebuild(host, &self.edges, &self.config.order)
    }

    /// Remove an edge and refresh order labels. Unknown ids are a no-op.
    pub fn dispose_edge<H>(&mut self, host: &mut H, id: &EdgeId) -> Option<Edge>
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        let edge = self.edges.remove(id)?;
        let [from, to] = edge.pair();
        let rebuilt = [from, to]
            .into_iter()
            .any(|block| OrderManager::new(&*host, block).update(host, &self.edges, &self.config.order));
        info!(edge = %id, from, to, rebuilt, "edge disposed");
        Some(edge)
    }

    /// Encode a live edge.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::EdgeNotFound`] for an unknown id, or a codec
    /// error if encoding fails.
    pub fn serialize_edge(&self, id: &EdgeId, format: EdgeFormat, skip_id: bool) -> Result<String, EditorError> {
        let edge = self
            .edges
            .get(id)
            .ok_or_else(|| EditorError::EdgeNotFound(id.clone()))?;
        match format {
            EdgeFormat::Xml => Ok(codec::to_xml(edge, skip_id)?),
            EdgeFormat::Record => serde_json::to_string(&codec::to_record(edge, skip_id))
                .map_err(|e| CodecError::Record(e.to_string()).into()),
        }
    }

    /// Decode a persisted edge and register it as-is. The saved id is kept
    /// unless a live edge already uses it.
    ///
    /// # Errors
    ///
    /// Returns a codec error for malformed input or a missing id, and
    /// [`EditorError::InvalidEndpoints`] for a self edge or an empty endpoint.
    pub fn deserialize_edge(&mut self, text: &str, format: EdgeFormat) -> Result<EdgeId, EditorError> {
        let decoded = match format {
            EdgeFormat::Xml => codec::from_xml(text)?,
            EdgeFormat::Record => codec::from_json(text)?,
        };
        self.restore(decoded.id, &decoded.from, &decoded.to)
    }

    /// Register a structured record as-is.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingId`] if the record has no id, and
    /// [`EditorError::InvalidEndpoints`] for a self edge or an empty endpoint.
    pub fn deserialize_record(&mut self, record: &EdgeRecord) -> Result<EdgeId, EditorError> {
        let decoded = codec::from_record(record)?;
        self.restore(decoded.id, &decoded.from, &decoded.to)
    }

    fn restore(&mut self, id: EdgeId, from: &str, to: &str) -> Result<EdgeId, EditorError> {
        let id = self
            .edges
            .insert(Some(id), from, to)
            .ok_or_else(|| EditorError::InvalidEndpoints {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        self.render(&id);
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Block lifecycle
    // -----------------------------------------------------------------------

    /// Capture the order trigger for `block` before the host disposes it.
    /// Pass the result to [`Self::block_disposed`] afterwards.
    pub fn order_manager<H: BlockHost + OrderStore + ?Sized>(&self, host: &H, block: &str) -> OrderManager {
        OrderManager::new(host, block)
    }

    /// Cascade a block disposal: drop its connectors and every edge that
    /// touches it or any other block the host no longer resolves, then run
    /// the captured order update.
    pub fn block_disposed<H>(&mut self, host: &mut H, manager: &OrderManager) -> bool
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        let block = manager.block();
        self.connectors.detach(block);
        let mut removed = self.edges.remove_touching(block).len();

        let dangling: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|edge| !host.contains(edge.from_block()) || !host.contains(edge.to_block()))
            .map(|edge| edge.id().clone())
            .collect();
        for id in &dangling {
            if let Some(edge) = self.edges.remove(id) {
                let [from, to] = edge.pair();
                for end in [from, to] {
                    if !host.contains(end) {
                        self.connectors.detach(end);
                    }
                }
                removed += 1;
            }
        }

        let rebuilt = manager.update(host, &self.edges, &self.config.order);
        debug!(block, removed, rebuilt, "block disposed");
        rebuilt
    }

    /// Move the endpoints owned by `block` while it is being dragged.
    pub fn drag_by(&mut self, block: &str, dx: f64, dy: f64) -> usize {
        self.edges
            .touching_mut(block)
            .map(|edge| edge.translate(block, dx, dy))
            .filter(|moved| *moved)
            .count()
    }

    /// A drag ended: re-place the block's connectors, re-anchor its edges,
    /// and refresh order labels if the block belongs to a tree.
    pub fn on_drag_settled<H>(&mut self, host: &mut H, block: &str) -> bool
    where
        H: BlockHost + OrderStore + ?Sized,
    {
        let touching: Vec<String> = self
            .edges
            .touching(block)
            .flat_map(|edge| edge.pair())
            .map(str::to_string)
            .collect();
        self.connectors.relocate(&*host, block);
        for other in &touching {
            self.connectors.relocate(&*host, other);
        }
        self.rerender_touching(block);

        OrderManager::new(&*host, block).update(host, &self.edges, &self.config.order)
    }

    fn render(&mut self, id: &EdgeId) {
        let Some(edge) = self.edges.get(id) else {
            return;
        };
        let Some((start, end)) = self.connectors.line_endpoints(edge.from_block(), edge.to_block()) else {
            return;
        };
        if let Some(edge) = self.edges.get_mut(id) {
            edge.geometry_mut().render(start, end);
        }
    }

    fn rerender_touching(&mut self, block: &str) {
        let connectors = &self.connectors;
        for edge in self.edges.touching_mut(block) {
            if let Some((start, end)) = connectors.line_endpoints(edge.from_block(), edge.to_block()) {
                if edge.geometry().is_rendered() {
                    edge.geometry_mut().rerender(start, end);
                } else {
                    edge.geometry_mut().render(start, end);
                }
            }
        }
    }
}
