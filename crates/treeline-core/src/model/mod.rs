//! Block model: the host traits, an in-memory canvas, and scene files.

pub mod block;
pub mod canvas;
pub mod scene;

pub use block::{BlockHost, NodeKind, OrderStore, Point, Rect};
pub use canvas::{BlockSpec, Canvas};
pub use scene::{Scene, SceneError, SceneFile};
