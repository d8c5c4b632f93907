use assert_cmd::Command;
use figz::kiwi::{Definition, DefinitionKind, Field, FieldType, Schema, Value, encode_message};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::fs;
use std::io::Write;

fn def(name: &str, kind: DefinitionKind, fields: &[(&str, FieldType, bool, u32)]) -> Definition {
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

fn schema() -> Schema {
    use DefinitionKind::{Enum, Message, Struct};
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
        def(
            "NodeType",
            Enum,
            &[("DOCUMENT", UInt, false, 1), ("TEXT", UInt, false, 3)],
        ),
        def("ParentIndex", Struct, &[("guid", D(0), false, 0), ("position", Str, false, 1)]),
        def(
            "NodeChange",
            Message,
            &[
                ("guid", D(0), false, 1),
                ("parentIndex", D(4), false, 2),
                ("type", D(3), false, 3),
                ("name", Str, false, 4),
                ("size", D(1), false, 5),
                ("transform", D(2), false, 6),
            ],
        ),
        def("Message", Message, &[("nodeChanges", D(5), true, 1)]),
    ])
}

fn guid(session: u32, local: u32) -> Value {
    Value::object([
        ("sessionID", Value::UInt(session)),
        ("localID", Value::UInt(local)),
    ])
}

fn message() -> Value {
    let root = Value::object([("guid", guid(0, 0)), ("type", Value::Enum("DOCUMENT".into()))]);
    let text = Value::object([
        ("guid", guid(1, 2)),
        (
            "parentIndex",
            Value::object([("guid", guid(0, 0)), ("position", Value::String("!".into()))]),
        ),
        ("type", Value::Enum("TEXT".into())),
        ("name", Value::String("Hello_World".into())),
        (
            "size",
            Value::object([("x", Value::Float(50.0)), ("y", Value::Float(20.0))]),
        ),
        (
            "transform",
            Value::object([
                ("m00", Value::Float(1.0)),
                ("m01", Value::Float(0.0)),
                ("m02", Value::Float(100.0)),
                ("m10", Value::Float(0.0)),
                ("m11", Value::Float(1.0)),
                ("m12", Value::Float(100.0)),
            ]),
        ),
    ]);
    Value::object([("nodeChanges", Value::Array(vec![root, text]))])
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).expect("deflate");
    enc.finish().expect("deflate finish")
}

fn fixture() -> Vec<u8> {
    let schema = schema();
    let payload = encode_message(&schema, "Message", &message()).expect("encode message");
    let mut out = b"fig-jam.".to_vec();
    out.extend_from_slice(&7u32.to_le_bytes());
    for chunk in [deflate(&schema.encode()), deflate(&payload)] {
        out.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(&chunk);
    }
    out
}

fn zipped(data: &[u8]) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip.start_file("canvas.fig", options).expect("start entry");
        zip.write_all(data).expect("write entry");
        zip.finish().expect("finish archive");
    }
    buf.into_inner()
}

fn cli() -> Command {
    Command::cargo_bin("figz-cli").expect("figz-cli binary")
}

#[test]
fn cli_renders_tikz_to_a_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("board.fig");
    let out = tmp.path().join("board.tex");
    fs::write(&input, fixture()).expect("write fixture");

    cli()
        .args([
            "render",
            "--out",
            out.to_string_lossy().as_ref(),
            input.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&out).expect("read output");
    assert!(text.starts_with("\\begin{tikzpicture}[yscale=-1]\n"), "{text}");
    assert!(text.contains(r"\node at (0.000000, "), "{text}");
    assert!(text.contains(r"{Hello\_World};"), "{text}");
    assert!(text.ends_with("\\end{tikzpicture}\n"), "{text}");
}

#[test]
fn cli_reads_archives_from_stdin() {
    let output = cli()
        .write_stdin(zipped(&fixture()))
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains(r"{Hello\_World};"), "{stdout}");
}

#[test]
fn cli_dumps_the_scene_graph_as_json() {
    let output = cli()
        .args(["dump", "--pretty", "-"])
        .write_stdin(fixture())
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["version"], 7);
    assert_eq!(json["root"]["children"][0]["record"]["name"], "Hello_World");
}

#[test]
fn cli_rejects_tiny_files_without_writing_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("tiny.fig");
    let out = tmp.path().join("tiny.tex");
    fs::write(&input, b"PK\x03\x04").expect("write fixture");

    let output = cli()
        .args([
            "--out",
            out.to_string_lossy().as_ref(),
            input.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("file size too small"), "{stderr}");
    assert!(!out.exists());
}

#[test]
fn cli_rejects_unknown_formats() {
    let output = cli()
        .write_stdin(b"definitely not a board".to_vec())
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported file format"), "{stderr}");
}

#[test]
fn cli_reports_missing_pages() {
    let output = cli()
        .args(["--page", "5"])
        .write_stdin(fixture())
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("page 5 is out of range"), "{stderr}");
}

#[test]
fn cli_usage_errors_exit_with_two() {
    cli().arg("--bogus").assert().code(2);
}
