#![forbid(unsafe_code)]

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Transform = euclid::Transform2D<f64, Unit, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

/// A 2x3 affine matrix in row form: `x' = m00*x + m01*y + m02`, `y' = m10*x + m11*y + m12`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AffineMatrix {
    pub m00: f64,
    pub m01: f64,
    pub m02: f64,
    pub m10: f64,
    pub m11: f64,
    pub m12: f64,
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMatrix {
    pub fn identity() -> Self {
        Self {
            m00: 1.0,
            m01: 0.0,
            m02: 0.0,
            m10: 0.0,
            m11: 1.0,
            m12: 0.0,
        }
    }

    pub fn translation(x: f64, y: f64) -> Self {
        Self {
            m02: x,
            m12: y,
            ..Self::identity()
        }
    }

    /// Converts to euclid's row-vector convention, scaling only the translation column.
    pub fn to_transform(&self, translation_scale: f64) -> Transform {
        Transform::new(
            self.m00,
            self.m10,
            self.m01,
            self.m11,
            self.m02 * translation_scale,
            self.m12 * translation_scale,
        )
    }
}
