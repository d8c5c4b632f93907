//! Coordinate normalization and TikZ serialization.

use crate::Result;
use crate::primitive::Primitive;
use std::fmt;

const HEADER: &str = r"\begin{tikzpicture}[yscale=-1]";
const FOOTER: &str = r"\end{tikzpicture}";

/// Primitives in emission order, wrapped in one picture environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Picture {
    pub primitives: Vec<Primitive>,
}

impl Picture {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        Self { primitives }
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Smallest X owned by any primitive, attribute pivots included.
    pub fn min_x(&self) -> Option<f64> {
        self.primitives
            .iter()
            .filter_map(Primitive::min_x)
            .reduce(f64::min)
    }

    /// Shifts every X so the smallest one lands on zero. Y is untouched.
    pub fn normalize(&mut self) {
        let Some(min_x) = self.min_x() else {
            return;
        };
        for p in &mut self.primitives {
            p.shift_x(min_x);
        }
    }

    pub fn write_to<W: fmt::Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{self}")?;
        Ok(())
    }
}

impl fmt::Display for Picture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        for p in &self.primitives {
            writeln!(f, "{p}")?;
        }
        writeln!(f, "{FOOTER}")
    }
}
