use crate::kiwi::{Definition, DefinitionKind, Field, FieldType, Schema, Value, encode_message};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

pub(crate) fn def(name: &str, kind: DefinitionKind, fields: &[(&str, FieldType, bool, u32)]) -> Definition {
    Definition {
        name: name.to_string(),
        kind,
        fields: fields
            .iter()
            .map(|(n, t, a, v)| Field {
                name: n.to_string(),
                field_type: *t,
                is_array: *a,
                value: *v,
            })
            .collect(),
    }
}

fn variants(name: &str, names: &[(&str, u32)]) -> Definition {
    let fields = names
        .iter()
        .map(|(n, v)| (*n, FieldType::UInt, false, *v))
        .collect::<Vec<_>>();
    def(name, DefinitionKind::Enum, &fields)
}

/// A small subset of the scene schema with the field names the record mapping reads.
pub(crate) fn scene_schema() -> Schema {
    use DefinitionKind::{Message, Struct};
    use FieldType::{Definition as D, Float, String as Str, UInt};

    Schema::new(vec![
        def("GUID", Struct, &[("sessionID", UInt, false, 0), ("localID", UInt, false, 1)]),
        def("Vector", Struct, &[("x", Float, false, 0), ("y", Float, false, 1)]),
        def(
            "Matrix",
            Struct,
            &[
                ("m00", Float, false, 0),
                ("m01", Float, false, 1),
                ("m02", Float, false, 2),
                ("m10", Float, false, 3),
                ("m11", Float, false, 4),
                ("m12", Float, false, 5),
            ],
        ),
        variants(
            "NodeType",
            &[
                ("NONE", 0),
                ("DOCUMENT", 1),
                ("CANVAS", 2),
                ("TEXT", 3),
                ("SHAPE_WITH_TEXT", 4),
                ("CONNECTOR", 5),
                ("STICKY", 6),
            ],
        ),
        variants(
            "ShapeWithTextType",
            &[
                ("SQUARE", 0),
                ("ELLIPSE", 1),
                ("DIAMOND", 3),
                ("PREDEFINED_PROCESS", 13),
            ],
        ),
        variants(
            "ConnectorMagnet",
            &[
                ("NONE", 0),
                ("AUTO", 1),
                ("TOP", 2),
                ("LEFT", 3),
                ("BOTTOM", 4),
                ("RIGHT", 5),
                ("CENTER", 6),
                ("AUTO_HORIZONTAL", 7),
            ],
        ),
        variants(
            "ConnectorTextSection",
            &[("MIDDLE_TO_END", 0), ("START_TO_MIDDLE", 1)],
        ),
        def("ParentIndex", Struct, &[("guid", D(0), false, 0), ("position", Str, false, 1)]),
        def(
            "ConnectorEndpoint",
            Message,
            &[
                ("endpointNodeID", D(0), false, 1),
                ("position", D(1), false, 2),
                ("magnet", D(5), false, 3),
            ],
        ),
        def(
            "ConnectorControlPoint",
            Struct,
            &[("position", D(1), false, 0), ("axis", D(1), false, 1)],
        ),
        def(
            "ConnectorTextMidpoint",
            Message,
            &[("section", D(6), false, 1), ("offset", Float, false, 2)],
        ),
        def(
            "NodeChange",
            Message,
            &[
                ("guid", D(0), false, 1),
                ("parentIndex", D(7), false, 2),
                ("type", D(3), false, 3),
                ("name", Str, false, 4),
                ("size", D(1), false, 5),
                ("transform", D(2), false, 6),
                ("shapeWithTextType", D(4), false, 7),
                ("connectorStart", D(8), false, 8),
                ("connectorEnd", D(8), false, 9),
                ("connectorControlPoints", D(9), true, 10),
                ("connectorTextMidpoint", D(10), false, 11),
            ],
        ),
        def("Blob", Message, &[("bytes", FieldType::Byte, true, 1)]),
        def(
            "Message",
            Message,
            &[("nodeChanges", D(11), true, 1), ("blobs", D(12), true, 2)],
        ),
    ])
}

pub(crate) fn guid(session: u32, local: u32) -> Value {
    Value::object([
        ("sessionID", Value::UInt(session)),
        ("localID", Value::UInt(local)),
    ])
}

pub(crate) fn vector(x: f32, y: f32) -> Value {
    Value::object([("x", Value::Float(x)), ("y", Value::Float(y))])
}

pub(crate) fn translation(x: f32, y: f32) -> Value {
    Value::object([
        ("m00", Value::Float(1.0)),
        ("m01", Value::Float(0.0)),
        ("m02", Value::Float(x)),
        ("m10", Value::Float(0.0)),
        ("m11", Value::Float(1.0)),
        ("m12", Value::Float(y)),
    ])
}

pub(crate) fn node(id: (u32, u32), kind: &str, parent: Option<((u32, u32), &str)>) -> Value {
    let mut fields = vec![
        ("guid", guid(id.0, id.1)),
        ("type", Value::Enum(kind.to_string())),
    ];
    if let Some((p, position)) = parent {
        fields.push((
            "parentIndex",
            Value::object([
                ("guid", guid(p.0, p.1)),
                ("position", Value::String(position.to_string())),
            ]),
        ));
    }
    Value::object(fields)
}

pub(crate) fn with(mut node: Value, field: &str, value: Value) -> Value {
    if let Value::Object(map) = &mut node {
        map.insert(field.to_string(), value);
    }
    node
}

pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub(crate) fn raw_stream(tag: &[u8; 8], version: u32, chunks: &[&[u8]]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&version.to_le_bytes());
    for chunk in chunks {
        out.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(chunk);
    }
    out
}

pub(crate) fn encode_document(version: u32, message: &Value) -> Vec<u8> {
    let schema = scene_schema();
    let payload = encode_message(&schema, "Message", message).unwrap();
    raw_stream(
        b"fig-jam.",
        version,
        &[&deflate(&schema.encode()), &deflate(&payload)],
    )
}

pub(crate) fn zip_entry(name: &str, data: &[u8]) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(name, options).unwrap();
        zip.write_all(data).unwrap();
        zip.finish().unwrap();
    }
    buf.into_inner()
}
