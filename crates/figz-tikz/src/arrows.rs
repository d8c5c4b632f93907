//! Side-constrained cubic arrows between two anchors.

use crate::geometry::Direction;
use figz_core::geom::{Point, vector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierArrow {
    pub start: Point,
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
}

impl BezierArrow {
    pub fn points(&self) -> Vec<Point> {
        vec![self.start, self.c1, self.c2, self.end]
    }
}

/// Routes a curve leaving `start` through `start_side` and entering `end` through `end_side`.
///
/// Control points sit half the span along the dominant travel axis away from each anchor. An
/// anchor whose side faces along that axis pushes its control point outward through the side;
/// otherwise the control point heads toward the other anchor.
pub fn box_to_box_arrow(
    start: Point,
    end: Point,
    start_side: Direction,
    end_side: Direction,
) -> BezierArrow {
    let delta = end - start;
    let horizontal = delta.x.abs() > delta.y.abs();
    let half = if horizontal {
        delta.x.abs() / 2.0
    } else {
        delta.y.abs() / 2.0
    };

    let toward_end = if horizontal {
        vector(delta.x.signum(), 0.0)
    } else {
        vector(0.0, delta.y.signum())
    };

    let push = |side: Direction, fallback| {
        if side.is_vertical() != horizontal {
            side.unit()
        } else {
            fallback
        }
    };

    BezierArrow {
        start,
        c1: start + push(start_side, toward_end) * half,
        c2: end + push(end_side, -toward_end) * half,
        end,
    }
}
