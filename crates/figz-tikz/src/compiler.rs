//! Single pass over a page's direct children, dispatching by node kind.

use crate::CompileOptions;
use crate::emit::Picture;
use crate::geometry::{Direction, DrawingNode, scaled};
use crate::primitive::{Attribute, Primitive};
use crate::routing::{ResolvedEndpoint, route_connector};
use figz_core::geom::vector;
use figz_core::{Connector, ConnectorEndpoint, Identifier, NodeKind, NodeRecord, SceneNode, ShapeKind};
use rustc_hash::FxHashMap;

/// Horizontal bias applied to free-standing text so it centres visually.
const TEXT_BIAS_X: f64 = 0.55;

/// Auto-generated names that never carry user text.
const PLACEHOLDER_NAMES: &[&str] = &["Connector Name", "Shape with text", "Connector line"];

pub(crate) fn cleanup_text(name: &str) -> &str {
    if PLACEHOLDER_NAMES.contains(&name) {
        ""
    } else {
        name
    }
}

fn escape_text(name: &str) -> String {
    name.replace('_', r"\_")
}

/// Compiles the direct children of `page`. Deeper descendants are not visited.
pub fn compile_page(page: SceneNode<'_>, options: &CompileOptions) -> Picture {
    let boxes: FxHashMap<Identifier, DrawingNode> = page
        .children()
        .map(|child| (child.id(), DrawingNode::resolve(child.record())))
        .collect();

    let mut primitives = Vec::new();
    for child in page.children() {
        let record = child.record();
        let Some(node) = boxes.get(&record.id) else {
            continue;
        };
        match &record.kind {
            NodeKind::Text => compile_text(record, node, &mut primitives),
            NodeKind::ShapeWithText { shape } => {
                compile_shape(record, node, *shape, &mut primitives)
            }
            NodeKind::Connector(connector) => {
                compile_connector(record, connector, &boxes, options, &mut primitives)
            }
            NodeKind::Other(kind) => {
                tracing::debug!(id = %record.id, kind = %kind, "skipping node");
            }
        }
    }

    tracing::debug!(
        page = %page.id(),
        primitives = primitives.len(),
        "compiled page"
    );
    Picture::new(primitives)
}

fn compile_text(record: &NodeRecord, node: &DrawingNode, out: &mut Vec<Primitive>) {
    let extent = node.extent();
    let position = node.q1 + vector(extent.x / 2.0 - TEXT_BIAS_X, extent.y / 2.0);
    out.push(Primitive::label(Vec::new(), position, escape_text(&record.name)));
}

fn compile_shape(record: &NodeRecord, node: &DrawingNode, shape: ShapeKind, out: &mut Vec<Primitive>) {
    let attributes = match shape {
        ShapeKind::Square | ShapeKind::PredefinedProcess => Vec::new(),
        ShapeKind::Diamond => {
            let pivot = node.midpoint();
            vec![
                Attribute::RotateAround { degrees: 45, pivot },
                Attribute::ScaleAround {
                    factor: 0.75,
                    pivot,
                },
            ]
        }
        other => {
            tracing::debug!(id = %record.id, shape = ?other, "shape kind has no drawing");
            return;
        }
    };
    out.push(Primitive::Shape {
        attributes,
        p1: node.q1,
        p2: node.q2,
        kind: "rectangle",
        text: Some(cleanup_text(&record.name).to_string()),
    });
}

fn resolve_endpoint(
    connector_id: Identifier,
    endpoint: &ConnectorEndpoint,
    boxes: &FxHashMap<Identifier, DrawingNode>,
) -> Option<ResolvedEndpoint> {
    let Some(side) = Direction::of_magnet(endpoint.magnet) else {
        tracing::debug!(id = %connector_id, magnet = ?endpoint.magnet, "unrecognized magnet");
        return None;
    };

    let target = endpoint.node.and_then(|id| boxes.get(&id));
    let anchor = match (target, endpoint.position) {
        (Some(node), _) => node.anchor(endpoint.magnet)?,
        (None, Some(position)) => scaled(position),
        (None, None) => {
            tracing::warn!(
                id = %connector_id,
                endpoint = ?endpoint.node,
                "connector endpoint does not resolve to a node on this page"
            );
            return None;
        }
    };
    Some(ResolvedEndpoint { anchor, side })
}

fn compile_connector(
    record: &NodeRecord,
    connector: &Connector,
    boxes: &FxHashMap<Identifier, DrawingNode>,
    options: &CompileOptions,
    out: &mut Vec<Primitive>,
) {
    let Some(start) = resolve_endpoint(record.id, &connector.start, boxes) else {
        return;
    };
    let Some(end) = resolve_endpoint(record.id, &connector.end, boxes) else {
        return;
    };

    let text = cleanup_text(&record.name);
    let label = (!text.is_empty()).then_some(text);
    route_connector(connector, start, end, label, options, out);
}
