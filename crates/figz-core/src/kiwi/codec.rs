use super::{
    ByteReader, ByteWriter, Definition, DefinitionKind, Field, FieldType, KiwiError, Result,
    Schema, Value,
};
use std::collections::BTreeMap;

/// Nesting limit for decoded definitions. Schemas come from the input, so a self-referencing
/// struct must fail instead of recursing forever.
pub const MAX_DEPTH: usize = 64;

/// Decodes one value of definition `root` (typically `"Message"`).
pub fn decode_message(schema: &Schema, root: &str, bytes: &[u8]) -> Result<Value> {
    let index = schema
        .index_of(root)
        .ok_or_else(|| KiwiError::UnknownDefinition {
            name: root.to_string(),
        })?;
    let mut bb = ByteReader::new(bytes);
    decode_definition(schema, index, &mut bb, 0)
}

fn decode_definition(
    schema: &Schema,
    index: usize,
    bb: &mut ByteReader<'_>,
    depth: usize,
) -> Result<Value> {
    let def = &schema.definitions[index];
    if depth >= MAX_DEPTH {
        return Err(KiwiError::TooDeep {
            definition: def.name.clone(),
            limit: MAX_DEPTH,
        });
    }
    match def.kind {
        DefinitionKind::Enum => {
            let value = bb.read_var_uint()?;
            def.field_by_value(value)
                .map(|f| Value::Enum(f.name.clone()))
                .ok_or_else(|| KiwiError::InvalidEnumValue {
                    definition: def.name.clone(),
                    value,
                })
        }
        DefinitionKind::Struct => {
            let mut out = BTreeMap::new();
            for field in &def.fields {
                out.insert(field.name.clone(), decode_field(schema, field, bb, depth)?);
            }
            Ok(Value::Object(out))
        }
        DefinitionKind::Message => {
            let mut out = BTreeMap::new();
            loop {
                let id = bb.read_var_uint()?;
                if id == 0 {
                    return Ok(Value::Object(out));
                }
                let field = def
                    .field_by_value(id)
                    .ok_or_else(|| KiwiError::UnknownFieldId {
                        definition: def.name.clone(),
                        id,
                    })?;
                out.insert(field.name.clone(), decode_field(schema, field, bb, depth)?);
            }
        }
    }
}

fn decode_field(
    schema: &Schema,
    field: &Field,
    bb: &mut ByteReader<'_>,
    depth: usize,
) -> Result<Value> {
    if !field.is_array {
        return decode_single(schema, field.field_type, bb, depth);
    }
    if field.field_type == FieldType::Byte {
        return Ok(Value::Bytes(bb.read_byte_array()?.to_vec()));
    }
    let len = bb.read_var_uint()? as usize;
    let mut items = Vec::with_capacity(len.min(1 << 16));
    for _ in 0..len {
        items.push(decode_single(schema, field.field_type, bb, depth)?);
    }
    Ok(Value::Array(items))
}

fn decode_single(
    schema: &Schema,
    ty: FieldType,
    bb: &mut ByteReader<'_>,
    depth: usize,
) -> Result<Value> {
    Ok(match ty {
        FieldType::Bool => Value::Bool(bb.read_bool()?),
        FieldType::Byte => Value::Byte(bb.read_byte()?),
        FieldType::Int => Value::Int(bb.read_var_int()?),
        FieldType::UInt => Value::UInt(bb.read_var_uint()?),
        FieldType::Float => Value::Float(bb.read_var_float()?),
        FieldType::String => Value::String(bb.read_string()?),
        FieldType::Int64 => Value::Int64(bb.read_var_int64()?),
        FieldType::UInt64 => Value::UInt64(bb.read_var_uint64()?),
        FieldType::Definition(index) => decode_definition(schema, index, bb, depth + 1)?,
    })
}

/// Encodes `value` as definition `root`. Missing struct fields are an error; missing message
/// fields are simply omitted.
pub fn encode_message(schema: &Schema, root: &str, value: &Value) -> Result<Vec<u8>> {
    let index = schema
        .index_of(root)
        .ok_or_else(|| KiwiError::UnknownDefinition {
            name: root.to_string(),
        })?;
    let mut bb = ByteWriter::new();
    encode_definition(schema, index, value, root, &mut bb)?;
    Ok(bb.into_inner())
}

fn encode_definition(
    schema: &Schema,
    index: usize,
    value: &Value,
    path: &str,
    bb: &mut ByteWriter,
) -> Result<()> {
    let def = &schema.definitions[index];
    match def.kind {
        DefinitionKind::Enum => {
            let name = value.as_str().ok_or_else(|| mismatch(path, &def.name))?;
            let field = def.field_by_name(name).ok_or_else(|| mismatch(path, &def.name))?;
            bb.write_var_uint(field.value);
        }
        DefinitionKind::Struct => {
            let map = as_object(value, path, def)?;
            for field in &def.fields {
                let v = map.get(&field.name).ok_or_else(|| KiwiError::MissingField {
                    definition: def.name.clone(),
                    field: field.name.clone(),
                })?;
                encode_field(schema, field, v, bb)?;
            }
        }
        DefinitionKind::Message => {
            let map = as_object(value, path, def)?;
            for field in &def.fields {
                if let Some(v) = map.get(&field.name) {
                    bb.write_var_uint(field.value);
                    encode_field(schema, field, v, bb)?;
                }
            }
            bb.write_var_uint(0);
        }
    }
    Ok(())
}

fn as_object<'v>(
    value: &'v Value,
    path: &str,
    def: &Definition,
) -> Result<&'v BTreeMap<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(mismatch(path, &def.name)),
    }
}

fn encode_field(schema: &Schema, field: &Field, value: &Value, bb: &mut ByteWriter) -> Result<()> {
    if !field.is_array {
        return encode_single(schema, field.field_type, value, &field.name, bb);
    }
    if field.field_type == FieldType::Byte {
        let bytes = value
            .as_bytes()
            .ok_or_else(|| mismatch(&field.name, "byte[]"))?;
        bb.write_byte_array(bytes);
        return Ok(());
    }
    let items = value
        .as_array()
        .ok_or_else(|| mismatch(&field.name, "array"))?;
    bb.write_var_uint(items.len() as u32);
    for item in items {
        encode_single(schema, field.field_type, item, &field.name, bb)?;
    }
    Ok(())
}

fn encode_single(
    schema: &Schema,
    ty: FieldType,
    value: &Value,
    path: &str,
    bb: &mut ByteWriter,
) -> Result<()> {
    match (ty, value) {
        (FieldType::Bool, Value::Bool(v)) => bb.write_bool(*v),
        (FieldType::Byte, Value::Byte(v)) => bb.write_byte(*v),
        (FieldType::Int, Value::Int(v)) => bb.write_var_int(*v),
        (FieldType::UInt, Value::UInt(v)) => bb.write_var_uint(*v),
        (FieldType::Float, Value::Float(v)) => bb.write_var_float(*v),
        (FieldType::String, Value::String(v)) => bb.write_string(v),
        (FieldType::Int64, Value::Int64(v)) => bb.write_var_int64(*v),
        (FieldType::UInt64, Value::UInt64(v)) => bb.write_var_uint64(*v),
        (FieldType::Definition(index), v) => encode_definition(schema, index, v, path, bb)?,
        (other, _) => return Err(mismatch(path, &format!("{other:?}"))),
    }
    Ok(())
}

fn mismatch(field: &str, expected: &str) -> KiwiError {
    KiwiError::TypeMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}
