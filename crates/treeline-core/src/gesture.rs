//! Connection gesture state machine.
//!
//! One controller exists per editor. Connectors do not own gesture state;
//! they report pointer events into the shared controller, which decides
//! whether a down/up pair forms a connection.
//!
//! ```text
//!            pointer-down(c)                 pointer-up(c')
//!   Idle ───────────────────▶ Armed(c) ───────────────────▶ Idle
//!     ▲                          │  pointer-down(c'')            │
//!     │                          └──────▶ Armed(c'')             ▼
//!     └──────────────────────────────────────────────── Release outcome
//! ```
//!
//! A new pointer-down always replaces the armed connector, so an abandoned
//! gesture needs no explicit cancel. Every pointer-up returns to `Idle`.

#![allow(clippy::must_use_candidate)]

use tracing::{debug, trace};

use crate::connector::{ConnectorRef, Role};

/// Current gesture state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GestureState {
    #[default]
    Idle,
    Armed(ConnectorRef),
}

/// What a pointer-up resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    /// Nothing was armed, or the release landed off any connector.
    Ignored,
    /// Released on the armed block itself; the click should bubble.
    SameBlock,
    /// Released on a connector of the same role as the armed one.
    SameRole,
    /// A compatible pair: connect `from -> to`.
    Connect { from: String, to: String },
}

impl Release {
    /// Only a connection consumes the pointer event.
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }
}

/// Shared armed-source state for one editor.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    state: GestureState,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> &GestureState {
        &self.state
    }

    pub const fn armed(&self) -> Option<&ConnectorRef> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Armed(source) => Some(source),
        }
    }

    /// Arm `source`, replacing any previously armed connector.
    pub fn pointer_down(&mut self, source: ConnectorRef) {
        if let GestureState::Armed(previous) = &self.state {
            trace!(block = %previous.block, role = %previous.role, "replacing armed connector");
        }
        debug!(block = %source.block, role = %source.role, "gesture armed");
        self.state = GestureState::Armed(source);
    }

    /// Resolve a pointer-up.
    ///
    /// `receiver` is the connector that got the event, if any. `over` is the
    /// connector hit-tested at the release point; when it is set it takes
    /// over from `receiver`, so overlapping handles resolve to the one
    /// actually under the pointer.
    pub fn pointer_up(&mut self, receiver: Option<&ConnectorRef>, over: Option<&ConnectorRef>) -> Release {
        let state = std::mem::take(&mut self.state);
        let GestureState::Armed(source) = state else {
            return Release::Ignored;
        };

        if let (Some(receiver), Some(over)) = (receiver, over) {
            if receiver != over {
                trace!(
                    from = %receiver.block,
                    to = %over.block,
                    "forwarding release to connector under pointer"
                );
            }
        }

        let Some(target) = over.or(receiver) else {
            trace!(block = %source.block, "released away from any connector");
            return Release::Ignored;
        };

        if target.block == source.block {
            return Release::SameBlock;
        }
        if !source.role.pairs_with(target.role) {
            debug!(role = %source.role, "released on a connector of the same role");
            return Release::SameRole;
        }

        let (from, to) = match source.role {
            Role::Output => (source.block, target.block.clone()),
            Role::Input => (target.block.clone(), source.block),
        };
        debug!(from = %from, to = %to, "gesture completed");
        Release::Connect { from, to }
    }

    /// Drop any armed connector.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }
}
