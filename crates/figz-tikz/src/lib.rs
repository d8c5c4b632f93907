#![forbid(unsafe_code)]

//! Layout compiler from a decoded FigJam scene graph to a TikZ picture (headless).
//!
//! Each direct child of a page is resolved to a box, dispatched by kind into drawing
//! [`primitive::Primitive`]s, then the whole [`emit::Picture`] is shifted so no X is negative.

pub mod arrows;
pub mod compiler;
pub mod emit;
pub mod geometry;
pub mod primitive;
pub mod routing;

pub use compiler::compile_page;
pub use emit::Picture;
pub use geometry::{Direction, DrawingNode, SCALE};
pub use primitive::{Attribute, PathKind, Primitive};

use figz_core::SceneNode;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write picture: {0}")]
    Fmt(#[from] fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Mark every connector anchor with a red dot.
    pub debug_magnets: bool,
    /// Mark every raw connector control point with a blue dot.
    pub debug_control_points: bool,
}

impl CompileOptions {
    pub const ENV_DEBUG_MAGNETS: &'static str = "FIGZ_DEBUG_MAGNETS";
    pub const ENV_DEBUG_CONTROL_POINTS: &'static str = "FIGZ_DEBUG_CONTROL_POINTS";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
                .unwrap_or(false)
        };
        Self {
            debug_magnets: flag(Self::ENV_DEBUG_MAGNETS),
            debug_control_points: flag(Self::ENV_DEBUG_CONTROL_POINTS),
        }
    }
}

/// Compiles, normalizes and serializes one page.
pub fn render_page(page: SceneNode<'_>, options: &CompileOptions) -> Result<String> {
    let mut picture = compile_page(page, options);
    picture.normalize();
    let mut out = String::new();
    picture.write_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_read_boolean_flags() {
        let opts = CompileOptions::from_lookup(|key| match key {
            CompileOptions::ENV_DEBUG_MAGNETS => Some("TRUE".to_string()),
            CompileOptions::ENV_DEBUG_CONTROL_POINTS => Some("0".to_string()),
            _ => None,
        });
        assert!(opts.debug_magnets);
        assert!(!opts.debug_control_points);

        let none = CompileOptions::from_lookup(|_| None);
        assert_eq!(none, CompileOptions::default());
    }
}
