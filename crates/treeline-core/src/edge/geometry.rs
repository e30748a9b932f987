//! Endpoint geometry of a rendered arrow line.
//!
//! An edge is drawn as a single straight segment from the source block's
//! OUTPUT connector to the target block's INPUT connector. Only the two
//! anchor points are tracked here; stroke, arrow markers and the rest of the
//! drawing belong to the host renderer.

#![allow(clippy::must_use_candidate)]

use crate::model::block::Point;

use super::Edge;

/// Start/end points of an edge plus whether it has been rendered yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineGeometry {
    start: Point,
    end: Point,
    rendered: bool,
}

impl LineGeometry {
    pub const fn start(&self) -> Point {
        self.start
    }

    pub const fn end(&self) -> Point {
        self.end
    }

    pub const fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Place both endpoints and mark the line rendered.
    pub fn render(&mut self, start: Point, end: Point) {
        self.start = start;
        self.end = end;
        self.rendered = true;
    }

    /// Re-place both endpoints, only if the line was rendered before.
    pub fn rerender(&mut self, start: Point, end: Point) -> bool {
        if !self.rendered {
            return false;
        }
        self.start = start;
        self.end = end;
        true
    }

    /// SVG-style path data: `M sx,sy L ex,ey`.
    pub fn path(&self) -> String {
        format!(
            "M{},{} L{},{}",
            self.start.x, self.start.y, self.end.x, self.end.y
        )
    }
}

impl Edge {
    /// Shift the endpoint owned by `block` by a drag delta.
    ///
    /// The other endpoint stays put. Returns `false` if the edge does not
    /// touch `block`.
    pub fn translate(&mut self, block: &str, dx: f64, dy: f64) -> bool {
        let is_source = self.is_connecting_from(block);
        let is_target = self.is_connecting_to(block);
        let geometry = self.geometry_mut();
        if is_source {
            geometry.start = geometry.start.offset(dx, dy);
        } else if is_target {
            geometry.end = geometry.end.offset(dx, dy);
        } else {
            return false;
        }
        true
    }
}
