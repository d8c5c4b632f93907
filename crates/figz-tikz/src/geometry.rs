//! Node boxes in output space and the coarse directions used by connector routing.

use figz_core::geom::{Point, Vector, point, vector};
use figz_core::{Identifier, Magnet, NodeRecord};

/// Uniform scale from source units to picture units, applied to translation and size only.
pub const SCALE: f64 = 0.018;

/// A node's bounding box: `q1` is the image of the local origin, `q2` of the far corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingNode {
    pub id: Identifier,
    pub q1: Point,
    pub q2: Point,
    /// Scaled, untransformed size.
    pub size: Vector,
}

impl DrawingNode {
    pub fn resolve(record: &NodeRecord) -> Self {
        let transform = record.transform.to_transform(SCALE);
        let size = vector(record.size.width * SCALE, record.size.height * SCALE);
        Self {
            id: record.id,
            q1: transform.transform_point(point(0.0, 0.0)),
            q2: transform.transform_point(size.to_point()),
            size,
        }
    }

    pub fn extent(&self) -> Vector {
        self.q2 - self.q1
    }

    pub fn midpoint(&self) -> Point {
        self.q1.lerp(self.q2, 0.5)
    }

    /// Attachment point for a connector magnet, pushed 0.1 units outside the box.
    /// `None` for magnets the router does not understand.
    pub fn anchor(&self, magnet: Magnet) -> Option<Point> {
        const OUTSET: f64 = 0.1;
        let extent = self.extent();
        let center_x = self.q2.x - extent.x / 2.0;
        let center_y = self.q2.y - extent.y / 2.0;
        Some(match magnet {
            Magnet::None | Magnet::Auto | Magnet::AutoHorizontal | Magnet::Center | Magnet::Top => {
                point(center_x, self.q1.y - OUTSET)
            }
            Magnet::Left => point(self.q1.x - OUTSET, center_y),
            Magnet::Bottom => point(center_x, self.q2.y + OUTSET),
            Magnet::Right => point(self.q2.x + OUTSET, center_y),
            Magnet::Unknown => return None,
        })
    }
}

/// Scales a raw source-space position into picture units.
pub fn scaled(p: Point) -> Point {
    point(p.x * SCALE, p.y * SCALE)
}

/// Coarse cardinal direction. Source data grows Y downward, so `Bottom` means larger Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// Direction from `from` to `to`; the X axis wins, coincident points read as `Top`.
    pub fn between(from: Point, to: Point) -> Self {
        if to.x > from.x {
            Self::Right
        } else if to.x < from.x {
            Self::Left
        } else if to.y > from.y {
            Self::Bottom
        } else {
            Self::Top
        }
    }

    pub fn of_magnet(magnet: Magnet) -> Option<Self> {
        match magnet {
            Magnet::None | Magnet::Auto | Magnet::AutoHorizontal | Magnet::Center | Magnet::Top => {
                Some(Self::Top)
            }
            Magnet::Left => Some(Self::Left),
            Magnet::Bottom => Some(Self::Bottom),
            Magnet::Right => Some(Self::Right),
            Magnet::Unknown => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit vector pointing out of a box side facing this direction.
    pub fn unit(self) -> Vector {
        match self {
            Self::Top => vector(0.0, -1.0),
            Self::Bottom => vector(0.0, 1.0),
            Self::Left => vector(-1.0, 0.0),
            Self::Right => vector(1.0, 0.0),
        }
    }
}

pub fn is_diagonal(start: Point, end: Point) -> bool {
    !(start.x == end.x || start.y == end.y)
}
