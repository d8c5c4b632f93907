use super::{Schema, Value, decode_message};
use crate::container::{Container, SCHEMA_CHUNK, inflate};
use crate::geom::{AffineMatrix, Point, Size, point};
use crate::record::{
    Blob, Connector, ConnectorEndpoint, ControlPoint, DecodedMessage, DecodedNode, Identifier,
    Magnet, NodeKind, NodeRecord, ParentLink, RecordDecodeError, RecordDecoder, ShapeKind,
    SiblingKey, SnapAxis, TextMidpoint, TextSection,
};

const ROOT_DEFINITION: &str = "Message";

/// Record decoder driven by the schema shipped in the container's schema chunk.
#[derive(Debug, Clone)]
pub struct KiwiRecordDecoder {
    schema: Schema,
}

impl KiwiRecordDecoder {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Inflates and parses a compiled schema chunk.
    pub fn from_schema_chunk(chunk: &[u8]) -> Result<Self, RecordDecodeError> {
        let bytes = inflate(chunk)
            .map_err(|err| RecordDecodeError::new(format!("error inflating schema: {err}")))?;
        Ok(Self::new(Schema::decode(&bytes)?))
    }

    pub fn from_container(container: &Container) -> Result<Self, RecordDecodeError> {
        let chunk = container
            .chunk(SCHEMA_CHUNK)
            .ok_or_else(|| RecordDecodeError::new("missing schema chunk"))?;
        Self::from_schema_chunk(chunk)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl RecordDecoder for KiwiRecordDecoder {
    fn decode(&self, payload: &[u8]) -> Result<DecodedMessage, RecordDecodeError> {
        let message = decode_message(&self.schema, ROOT_DEFINITION, payload)?;
        map_message(&message)
    }
}

/// Maps a decoded root message onto flat records and blobs.
pub(crate) fn map_message(message: &Value) -> Result<DecodedMessage, RecordDecodeError> {
    let nodes = message
        .get("nodeChanges")
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .map(map_node_change)
        .collect::<Result<Vec<_>, _>>()?;

    let blobs = message
        .get("blobs")
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .map(|b| Blob {
            bytes: b
                .get("bytes")
                .and_then(Value::as_bytes)
                .map(<[u8]>::to_vec)
                .unwrap_or_default(),
        })
        .collect();

    Ok(DecodedMessage { nodes, blobs })
}

fn map_node_change(change: &Value) -> Result<DecodedNode, RecordDecodeError> {
    let id = change
        .get("guid")
        .and_then(map_guid)
        .ok_or_else(|| RecordDecodeError::new("node change without guid"))?;

    let type_name = change.get("type").and_then(Value::as_str).unwrap_or("NONE");
    let kind = match type_name {
        "TEXT" => NodeKind::Text,
        "SHAPE_WITH_TEXT" => NodeKind::ShapeWithText {
            shape: change
                .get("shapeWithTextType")
                .and_then(Value::as_str)
                .map(ShapeKind::from_schema_name)
                .unwrap_or(ShapeKind::Unknown),
        },
        "CONNECTOR" => NodeKind::Connector(map_connector(change)),
        other => NodeKind::Other(other.to_string()),
    };

    let record = NodeRecord {
        id,
        kind,
        name: change
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        transform: change
            .get("transform")
            .map(map_matrix)
            .unwrap_or_default(),
        size: change
            .get("size")
            .and_then(map_vector)
            .map(|p| Size::new(p.x, p.y))
            .unwrap_or_else(Size::zero),
    };

    let parent = change.get("parentIndex").and_then(|p| {
        Some(ParentLink {
            parent: p.get("guid").and_then(map_guid)?,
            position: p.get("position").map(sibling_key).unwrap_or_default(),
        })
    });

    Ok(DecodedNode { record, parent })
}

fn map_guid(v: &Value) -> Option<Identifier> {
    Some(Identifier::new(
        v.get("sessionID")?.as_u32()?,
        v.get("localID")?.as_u32()?,
    ))
}

fn map_vector(v: &Value) -> Option<Point> {
    Some(point(v.get("x")?.as_f64()?, v.get("y")?.as_f64()?))
}

fn map_matrix(v: &Value) -> AffineMatrix {
    let id = AffineMatrix::identity();
    let f = |name: &str, default: f64| v.get(name).and_then(Value::as_f64).unwrap_or(default);
    AffineMatrix {
        m00: f("m00", id.m00),
        m01: f("m01", id.m01),
        m02: f("m02", id.m02),
        m10: f("m10", id.m10),
        m11: f("m11", id.m11),
        m12: f("m12", id.m12),
    }
}

fn map_connector(change: &Value) -> Connector {
    let endpoint = |name: &str| {
        change
            .get(name)
            .map(|e| ConnectorEndpoint {
                node: e.get("endpointNodeID").and_then(map_guid),
                position: e.get("position").and_then(map_vector),
                magnet: e
                    .get("magnet")
                    .and_then(Value::as_str)
                    .map(Magnet::from_schema_name)
                    .unwrap_or_default(),
            })
            .unwrap_or_default()
    };

    let control_points = change
        .get("connectorControlPoints")
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .filter_map(|cp| {
            let position = cp.get("position").and_then(map_vector)?;
            let keeps_x = cp
                .get("axis")
                .and_then(map_vector)
                .is_some_and(|axis| axis.x == 1.0);
            Some(ControlPoint {
                position,
                axis: if keeps_x {
                    SnapAxis::KeepX
                } else {
                    SnapAxis::KeepY
                },
            })
        })
        .collect();

    let text_midpoint = change.get("connectorTextMidpoint").map(|m| TextMidpoint {
        section: m
            .get("section")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(TextSection::StartToMiddle),
        offset: m.get("offset").and_then(Value::as_f64).unwrap_or_default(),
    });

    Connector {
        start: endpoint("connectorStart"),
        end: endpoint("connectorEnd"),
        control_points,
        text_midpoint,
    }
}

pub(crate) fn sibling_key(v: &Value) -> SiblingKey {
    if let Some(n) = v.as_f64() {
        return SiblingKey::Number(n);
    }
    v.as_str().map(SiblingKey::from).unwrap_or_default()
}
