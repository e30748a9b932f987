//! Connector decorations: the two interactive handles on each block used to
//! start and finish a connection gesture.
//!
//! Every block with connectors has one [`Role::Input`] handle on its left
//! edge and one [`Role::Output`] handle on its right edge. Both are the same
//! [`Connector`] type; the role decides placement, the arrow-line anchor
//! offset, and which other role it may pair with.
//!
//! Attaching connectors to a wrapper also schedules a one-shot deferred
//! task that reveals the wrapper's drag handle once attachment has finished.
//! The host drains it with [`ConnectorSet::run_deferred`] on its next tick.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::ConnectorConfig;
use crate::model::block::{BlockHost, Point, Rect};

/// Which side of a connection a connector stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Source side, drawn on the right edge. The edge's `from`.
    Output,
    /// Target side, drawn on the left edge. The edge's `to`.
    Input,
}

impl Role {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Output => Self::Input,
            Self::Input => Self::Output,
        }
    }

    /// Two connectors can be joined only if their roles differ.
    pub fn pairs_with(self, other: Self) -> bool {
        self != other
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Output => "output",
            Self::Input => "input",
        })
    }
}

/// Identity of one connector: its block and role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectorRef {
    pub block: String,
    pub role: Role,
}

impl ConnectorRef {
    pub fn new(block: impl Into<String>, role: Role) -> Self {
        Self {
            block: block.into(),
            role,
        }
    }
}

/// CSS-style class names the host renderer can style connectors with.
pub const CLASS_ACTIVE: &str = "behavior-connector";
pub const CLASS_DISABLED: &str = "behavior-connector-disabled";

/// One connector handle on a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    block: String,
    role: Role,
    width: f64,
    height: f64,
    line_gap: f64,
    offset_in_block: Point,
    location: Point,
    active: bool,
}

impl Connector {
    pub fn new(block: impl Into<String>, role: Role, config: &ConnectorConfig) -> Self {
        Self {
            block: block.into(),
            role,
            width: config.width,
            height: config.height,
            line_gap: config.line_gap,
            offset_in_block: Point::default(),
            location: Point::default(),
            active: true,
        }
    }

    pub fn block(&self) -> &str {
        &self.block
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub fn to_ref(&self) -> ConnectorRef {
        ConnectorRef::new(self.block.clone(), self.role)
    }

    pub const fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Workspace position of the connector's top-left corner.
    pub const fn location(&self) -> Point {
        self.location
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub const fn class_name(&self) -> &'static str {
        if self.active { CLASS_ACTIVE } else { CLASS_DISABLED }
    }

    /// Follow the owning block: match its height, and pin OUTPUT handles to
    /// the block's right edge.
    pub fn on_location_change(&mut self, block_rect: Rect) {
        self.height = block_rect.height;
        if self.role == Role::Output {
            self.offset_in_block = Point::new(block_rect.width - self.width, 0.0);
        }
        self.location = block_rect
            .origin()
            .offset(self.offset_in_block.x, self.offset_in_block.y);
    }

    /// Centre of the handle.
    pub fn anchor(&self) -> Point {
        self.location.offset(self.width / 2.0, self.height / 2.0)
    }

    /// Offset from the anchor to where an arrow line attaches.
    pub fn line_offset(&self) -> Point {
        match self.role {
            Role::Output => Point::new(self.width / 2.0, 0.0),
            Role::Input => Point::new(-self.width / 2.0 - self.line_gap, 0.0),
        }
    }

    /// Where an arrow line starts (OUTPUT) or ends (INPUT).
    pub fn line_point(&self) -> Point {
        let offset = self.line_offset();
        self.anchor().offset(offset.x, offset.y)
    }

    /// `true` if `point` falls inside the handle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.location.x
            && point.x <= self.location.x + self.width
            && point.y >= self.location.y
            && point.y <= self.location.y + self.height
    }
}

/// The connector pair owned by one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockConnectors {
    pub input: Connector,
    pub output: Connector,
    /// Secondary drag handle, revealed by a deferred task after attach.
    pub dragger_visible: bool,
}

impl BlockConnectors {
    pub const fn get(&self, role: Role) -> &Connector {
        match role {
            Role::Input => &self.input,
            Role::Output => &self.output,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut Connector {
        match role {
            Role::Input => &mut self.input,
            Role::Output => &mut self.output,
        }
    }

    fn block(&self) -> &str {
        self.input.block()
    }
}

/// Work deferred to the host's next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    ShowDragger(String),
}

/// All connectors in one editor, in attach order. Later attachments are
/// drawn above earlier ones and win hit tests.
#[derive(Debug, Clone)]
pub struct ConnectorSet {
    config: ConnectorConfig,
    blocks: Vec<BlockConnectors>,
    deferred: VecDeque<Deferred>,
}

impl ConnectorSet {
    pub const fn new(config: ConnectorConfig) -> Self {
        Self {
            config,
            blocks: Vec::new(),
            deferred: VecDeque::new(),
        }
    }

    /// Attach both connectors to `block` and place them. Re-attaching an
    /// already decorated block only re-places it.
    pub fn attach<H: BlockHost + ?Sized>(&mut self, host: &H, block: &str) -> bool {
        if !host.contains(block) {
            return false;
        }
        if self.get(block).is_none() {
            self.blocks.push(BlockConnectors {
                input: Connector::new(block, Role::Input, &self.config),
                output: Connector::new(block, Role::Output, &self.config),
                dragger_visible: false,
            });
            if host.is_wrapper(block) {
                self.deferred.push_back(Deferred::ShowDragger(block.to_string()));
            }
            trace!(block, "connectors attached");
        }
        self.relocate(host, block);
        true
    }

    pub fn detach(&mut self, block: &str) -> Option<BlockConnectors> {
        let idx = self.blocks.iter().position(|pair| pair.block() == block)?;
        trace!(block, "connectors detached");
        Some(self.blocks.remove(idx))
    }

    pub fn get(&self, block: &str) -> Option<&BlockConnectors> {
        self.blocks.iter().find(|pair| pair.block() == block)
    }

    pub fn get_mut(&mut self, block: &str) -> Option<&mut BlockConnectors> {
        self.blocks.iter_mut().find(|pair| pair.block() == block)
    }

    pub fn connector(&self, target: &ConnectorRef) -> Option<&Connector> {
        self.get(&target.block).map(|pair| pair.get(target.role))
    }

    /// Re-place a block's connectors from its current bounding rectangle.
    pub fn relocate<H: BlockHost + ?Sized>(&mut self, host: &H, block: &str) -> bool {
        let Some(rect) = host.bounding_rect(block) else {
            return false;
        };
        let Some(pair) = self.get_mut(block) else {
            return false;
        };
        pair.input.on_location_change(rect);
        pair.output.on_location_change(rect);
        true
    }

    /// Endpoints of an arrow line `from -> to`: the source's OUTPUT line
    /// point and the target's INPUT line point.
    pub fn line_endpoints(&self, from: &str, to: &str) -> Option<(Point, Point)> {
        let start = self.get(from)?.output.line_point();
        let end = self.get(to)?.input.line_point();
        Some((start, end))
    }

    /// The topmost active connector under `point`.
    pub fn hit_test(&self, point: Point) -> Option<ConnectorRef> {
        self.blocks
            .iter()
            .rev()
            .flat_map(|pair| [&pair.output, &pair.input])
            .find(|connector| connector.is_active() && connector.contains(point))
            .map(Connector::to_ref)
    }

    /// Run and drain deferred tasks. Tasks for blocks detached in the
    /// meantime are dropped.
    pub fn run_deferred(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.deferred.pop_front() {
            match task {
                Deferred::ShowDragger(block) => {
                    if let Some(pair) = self.get_mut(&block) {
                        pair.dragger_visible = true;
                        ran += 1;
                    }
                }
            }
        }
        ran
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockConnectors> {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::canvas::{BlockSpec, Canvas};

    fn host() -> Canvas {
        let mut wrapper = BlockSpec::new("W");
        wrapper.wrapper = true;
        wrapper.x = 100.0;
        wrapper.top = 50.0;
        wrapper.width = 200.0;
        wrapper.height = 80.0;

        let mut plain = BlockSpec::new("P");
        plain.x = 400.0;
        plain.top = 50.0;
        Canvas::from_specs([wrapper, plain])
    }

    #[test]
    fn roles_pair_only_with_the_opposite_role() {
        assert!(Role::Output.pairs_with(Role::Input));
        assert!(!Role::Input.pairs_with(Role::Input));
        assert_eq!(Role::Input.opposite(), Role::Output);
    }

    #[test]
    fn placement_follows_the_block() {
        let mut set = ConnectorSet::new(ConnectorConfig::default());
        assert!(set.attach(&host(), "W"));
        let pair = set.get("W").expect("attached");

        assert_eq!(pair.input.location(), Point::new(100.0, 50.0));
        assert_eq!(pair.output.location(), Point::new(280.0, 50.0));
        assert_eq!(pair.input.size(), (20.0, 80.0));

        assert_eq!(pair.output.anchor(), Point::new(290.0, 90.0));
        assert_eq!(pair.output.line_point(), Point::new(300.0, 90.0));
        assert_eq!(pair.input.line_point(), Point::new(96.0, 90.0));
    }

    #[test]
    fn line_endpoints_use_output_then_input() {
        let host = host();
        let mut set = ConnectorSet::new(ConnectorConfig::default());
        set.attach(&host, "W");
        set.attach(&host, "P");
        let (start, end) = set.line_endpoints("W", "P").expect("both attached");
        assert_eq!(start, Point::new(300.0, 90.0));
        assert_eq!(end, Point::new(396.0, 80.0));
        assert!(set.line_endpoints("W", "ghost").is_none());
    }

    #[test]
    fn hit_test_skips_inactive_connectors() {
        let host = host();
        let mut set = ConnectorSet::new(ConnectorConfig::default());
        set.attach(&host, "W");
        let inside_input = Point::new(105.0, 60.0);
        assert_eq!(
            set.hit_test(inside_input),
            Some(ConnectorRef::new("W", Role::Input))
        );

        let pair = set.get_mut("W").expect("attached");
        pair.input.set_active(false);
        assert_eq!(pair.input.class_name(), CLASS_DISABLED);
        assert_eq!(set.hit_test(inside_input), None);
    }

    #[test]
    fn wrappers_reveal_dragger_on_next_tick() {
        let host = host();
        let mut set = ConnectorSet::new(ConnectorConfig::default());
        set.attach(&host, "W");
        set.attach(&host, "P");
        assert_eq!(set.pending_deferred(), 1);
        assert!(!set.get("W").expect("attached").dragger_visible);

        assert_eq!(set.run_deferred(), 1);
        assert!(set.get("W").expect("attached").dragger_visible);
        assert!(!set.get("P").expect("attached").dragger_visible);
    }

    #[test]
    fn deferred_task_for_detached_block_is_dropped() {
        let host = host();
        let mut set = ConnectorSet::new(ConnectorConfig::default());
        set.attach(&host, "W");
        set.detach("W");
        assert_eq!(set.run_deferred(), 0);
        assert_eq!(set.pending_deferred(), 0);
    }
}
