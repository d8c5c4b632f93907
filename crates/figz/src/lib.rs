#![forbid(unsafe_code)]

//! `figz` decodes FigJam `.fig` containers into a scene graph and, with the `render` feature,
//! compiles a page of that graph into a TikZ picture.
//!
//! # Features
//!
//! - `render`: enable the layout compiler and TikZ emitter (`figz::render`)

pub use figz_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use figz_tikz::{
        Attribute, CompileOptions, PathKind, Picture, Primitive, compile_page, render_page,
    };

    use figz_core::{Document, SceneNode};

    #[derive(Debug, thiserror::Error)]
    pub enum FigzError {
        #[error(transparent)]
        Decode(#[from] figz_core::Error),
        #[error(transparent)]
        Render(#[from] figz_tikz::Error),
        #[error("page {index} is out of range (document has {count} pages)")]
        PageOutOfRange { index: usize, count: usize },
    }

    pub type Result<T> = std::result::Result<T, FigzError>;

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct RenderOptions {
        pub compile: CompileOptions,
        /// `None` compiles the root's direct children; `Some(i)` those of the root's i-th child.
        pub page: Option<usize>,
    }

    impl RenderOptions {
        pub fn from_env() -> Self {
            Self {
                compile: CompileOptions::from_env(),
                page: None,
            }
        }

        pub fn with_page(mut self, page: usize) -> Self {
            self.page = Some(page);
            self
        }
    }

    /// Picks the node whose direct children make up the picture.
    pub fn select_page(document: &Document, page: Option<usize>) -> Result<SceneNode<'_>> {
        let root = document.root();
        let Some(index) = page else {
            return Ok(root);
        };
        root.child(index).ok_or(FigzError::PageOutOfRange {
            index,
            count: root.child_count(),
        })
    }

    pub fn render_document(document: &Document, options: &RenderOptions) -> Result<String> {
        let page = select_page(document, options.page)?;
        Ok(render_page(page, &options.compile)?)
    }

    /// Decodes `bytes` and renders the selected page in one call.
    pub fn render_tikz(bytes: &[u8], options: &RenderOptions) -> Result<String> {
        let document = figz_core::decode_document(bytes)?;
        render_document(&document, options)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use figz_core::geom::{AffineMatrix, size};
        use figz_core::{DecodedMessage, DecodedNode, Identifier, NodeKind, NodeRecord};

        fn document() -> Document {
            let canvas = Identifier::new(0, 1);
            let nodes = vec![
                DecodedNode::root(NodeRecord::new(
                    Identifier::ROOT,
                    NodeKind::Other("DOCUMENT".into()),
                )),
                DecodedNode::child_of(
                    NodeRecord::new(canvas, NodeKind::Other("CANVAS".into())),
                    Identifier::ROOT,
                    1.0,
                ),
                DecodedNode::child_of(
                    NodeRecord::new(Identifier::new(1, 2), NodeKind::Text)
                        .with_name("hello")
                        .with_transform(AffineMatrix::translation(100.0, 100.0))
                        .with_size(size(50.0, 50.0)),
                    canvas,
                    1.0,
                ),
            ];
            figz_core::build_document(
                1,
                DecodedMessage {
                    nodes,
                    blobs: Vec::new(),
                },
            )
            .unwrap()
        }

        #[test]
        fn root_children_are_compiled_by_default() {
            // The only root child is a canvas, which draws nothing.
            let out = render_document(&document(), &RenderOptions::default()).unwrap();
            assert_eq!(out, "\\begin{tikzpicture}[yscale=-1]\n\\end{tikzpicture}\n");
        }

        #[test]
        fn page_selects_a_root_child() {
            let out =
                render_document(&document(), &RenderOptions::default().with_page(0)).unwrap();
            assert!(out.contains(r"{hello};"), "{out}");
        }

        #[test]
        fn out_of_range_page_is_an_error() {
            let err =
                render_document(&document(), &RenderOptions::default().with_page(3)).unwrap_err();
            assert!(
                matches!(err, FigzError::PageOutOfRange { index: 3, count: 1 }),
                "{err:?}"
            );
        }

        #[test]
        fn decode_errors_convert() {
            let err = render_tikz(b"abcd", &RenderOptions::default()).unwrap_err();
            assert!(
                matches!(err, FigzError::Decode(figz_core::Error::TooSmall { .. })),
                "{err:?}"
            );
        }
    }
}
