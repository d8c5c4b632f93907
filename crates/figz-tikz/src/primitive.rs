//! Drawing primitives and their style attributes, as a closed set of TikZ statements.

use figz_core::geom::Point;
use std::fmt;

/// `(x, y)` contents with six fractional digits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord(pub Point);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.0.x, self.0.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// `-To` arrow tip at the path end.
    ArrowTip,
    Thick,
    Fill(String),
    Draw(String),
    Color(String),
    Anchor(String),
    RoundedCorners(u32),
    RotateAround { degrees: i32, pivot: Point },
    ScaleAround { factor: f64, pivot: Point },
}

impl Attribute {
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::RotateAround { pivot, .. } | Self::ScaleAround { pivot, .. } => Some(*pivot),
            _ => None,
        }
    }

    fn shift_x(&mut self, offset: f64) {
        match self {
            Self::RotateAround { pivot, .. } | Self::ScaleAround { pivot, .. } => {
                pivot.x -= offset;
            }
            _ => {}
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrowTip => f.write_str("-To"),
            Self::Thick => f.write_str("thick"),
            Self::Fill(v) => write!(f, "fill={v}"),
            Self::Draw(v) => write!(f, "draw={v}"),
            Self::Color(v) => write!(f, "color={v}"),
            Self::Anchor(v) => write!(f, "anchor={v}"),
            Self::RoundedCorners(r) => write!(f, "rounded corners={r}"),
            Self::RotateAround { degrees, pivot } => {
                write!(f, "rotate around={{{degrees}:({})}}", Coord(*pivot))
            }
            Self::ScaleAround { factor, pivot } => {
                write!(f, "scale around={{{factor:.6}:({})}}", Coord(*pivot))
            }
        }
    }
}

struct AttributeList<'a>(&'a [Attribute]);

impl fmt::Display for AttributeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, a) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{a}")?;
        }
        f.write_str("]")
    }
}

/// How consecutive path points are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathKind {
    /// `a -- b -- c`
    #[default]
    Line,
    /// `a .. controls (c1) and (c2) .. b`; expects exactly four points.
    Curve,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Path {
        attributes: Vec<Attribute>,
        points: Vec<Point>,
        kind: PathKind,
    },
    Shape {
        attributes: Vec<Attribute>,
        p1: Point,
        p2: Point,
        kind: &'static str,
        text: Option<String>,
    },
    Node {
        attributes: Vec<Attribute>,
        position: Point,
        text: Option<String>,
    },
    FilledMark {
        attributes: Vec<Attribute>,
        position: Point,
        shape: &'static str,
        size: &'static str,
    },
}

impl Primitive {
    pub fn line(attributes: Vec<Attribute>, points: Vec<Point>) -> Self {
        Self::Path {
            attributes,
            points,
            kind: PathKind::Line,
        }
    }

    pub fn arrow(from: Point, to: Point) -> Self {
        Self::line(vec![Attribute::ArrowTip, Attribute::Thick], vec![from, to])
    }

    pub fn label(attributes: Vec<Attribute>, position: Point, text: impl Into<String>) -> Self {
        Self::Node {
            attributes,
            position,
            text: Some(text.into()),
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::Path { attributes, .. }
            | Self::Shape { attributes, .. }
            | Self::Node { attributes, .. }
            | Self::FilledMark { attributes, .. } => attributes,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Shape { text, .. } | Self::Node { text, .. } => text.as_deref(),
            Self::Path { .. } | Self::FilledMark { .. } => None,
        }
    }

    /// Every position the primitive owns, attribute pivots included.
    pub fn positions(&self) -> Vec<Point> {
        let mut out = match self {
            Self::Path { points, .. } => points.clone(),
            Self::Shape { p1, p2, .. } => vec![*p1, *p2],
            Self::Node { position, .. } | Self::FilledMark { position, .. } => vec![*position],
        };
        out.extend(self.attributes().iter().filter_map(Attribute::position));
        out
    }

    pub fn min_x(&self) -> Option<f64> {
        self.positions().into_iter().map(|p| p.x).reduce(f64::min)
    }

    /// Moves every owned X coordinate left by `offset`. Y is untouched.
    pub fn shift_x(&mut self, offset: f64) {
        let attributes = match self {
            Self::Path {
                points, attributes, ..
            } => {
                for p in points.iter_mut() {
                    p.x -= offset;
                }
                attributes
            }
            Self::Shape {
                p1, p2, attributes, ..
            } => {
                p1.x -= offset;
                p2.x -= offset;
                attributes
            }
            Self::Node {
                position,
                attributes,
                ..
            }
            | Self::FilledMark {
                position,
                attributes,
                ..
            } => {
                position.x -= offset;
                attributes
            }
        };
        for a in attributes.iter_mut() {
            a.shift_x(offset);
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path {
                attributes,
                points,
                kind,
            } => {
                write!(f, "\\draw{}", AttributeList(attributes))?;
                if !points.is_empty() {
                    f.write_str(" ")?;
                    write_points(f, points, *kind)?;
                }
                f.write_str(";")
            }
            Self::Shape {
                attributes,
                p1,
                p2,
                kind,
                text,
            } => {
                write!(f, "\\draw{} ({}) {kind}", AttributeList(attributes), Coord(*p1))?;
                if let Some(text) = text {
                    write!(f, " node{{{text}}}")?;
                }
                write!(f, " ({});", Coord(*p2))
            }
            Self::Node {
                attributes,
                position,
                text,
            } => {
                write!(f, "\\node{} at ({})", AttributeList(attributes), Coord(*position))?;
                if let Some(text) = text {
                    write!(f, " {{{text}}}")?;
                }
                f.write_str(";")
            }
            Self::FilledMark {
                attributes,
                position,
                shape,
                size,
            } => write!(
                f,
                "\\filldraw{} ({}) {shape}({size});",
                AttributeList(attributes),
                Coord(*position)
            ),
        }
    }
}

fn write_points(f: &mut fmt::Formatter<'_>, points: &[Point], kind: PathKind) -> fmt::Result {
    match (kind, points) {
        (PathKind::Curve, [start, c1, c2, end]) => write!(
            f,
            "({}) .. controls ({}) and ({}) .. ({})",
            Coord(*start),
            Coord(*c1),
            Coord(*c2),
            Coord(*end)
        ),
        _ => {
            for (i, p) in points.iter().enumerate() {
                if i > 0 {
                    f.write_str(" -- ")?;
                }
                write!(f, "({})", Coord(*p))?;
            }
            Ok(())
        }
    }
}
