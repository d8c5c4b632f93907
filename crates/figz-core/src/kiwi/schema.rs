use super::{ByteReader, ByteWriter, KiwiError, Result};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Enum,
    Struct,
    Message,
}

impl DefinitionKind {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Enum),
            1 => Some(Self::Struct),
            2 => Some(Self::Message),
            _ => None,
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Enum => 0,
            Self::Struct => 1,
            Self::Message => 2,
        }
    }
}

/// Field types. Builtins are stored as negative indices on the wire, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Byte,
    Int,
    UInt,
    Float,
    String,
    Int64,
    UInt64,
    Definition(usize),
}

impl FieldType {
    const BUILTINS: [FieldType; 8] = [
        Self::Bool,
        Self::Byte,
        Self::Int,
        Self::UInt,
        Self::Float,
        Self::String,
        Self::Int64,
        Self::UInt64,
    ];

    fn from_index(index: i32, definitions: usize) -> Option<Self> {
        if index < 0 {
            Self::BUILTINS.get((!index) as usize).copied()
        } else if (index as usize) < definitions {
            Some(Self::Definition(index as usize))
        } else {
            None
        }
    }

    fn to_index(self) -> i32 {
        match self {
            Self::Definition(i) => i as i32,
            builtin => {
                let pos = Self::BUILTINS
                    .iter()
                    .position(|b| *b == builtin)
                    .unwrap_or_default();
                !(pos as i32)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub is_array: bool,
    /// Field id for messages, variant value for enums; positional for structs.
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    pub fields: Vec<Field>,
}

impl Definition {
    pub fn field_by_value(&self, value: u32) -> Option<&Field> {
        self.fields.iter().find(|f| f.value == value)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub definitions: Vec<Definition>,
    by_name: FxHashMap<String, usize>,
}

impl Schema {
    pub fn new(definitions: Vec<Definition>) -> Self {
        let by_name = definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self {
            definitions,
            by_name,
        }
    }

    pub fn definition(&self, name: &str) -> Result<&Definition> {
        self.by_name
            .get(name)
            .map(|i| &self.definitions[*i])
            .ok_or_else(|| KiwiError::UnknownDefinition {
                name: name.to_string(),
            })
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Decodes a compiled binary schema.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut bb = ByteReader::new(bytes);
        let count = bb.read_var_uint()? as usize;
        let mut raw = Vec::with_capacity(count.min(4096));

        for _ in 0..count {
            let name = bb.read_string()?;
            let kind_byte = bb.read_byte()?;
            let kind = DefinitionKind::from_byte(kind_byte).ok_or_else(|| {
                KiwiError::InvalidKind {
                    name: name.clone(),
                    kind: kind_byte,
                }
            })?;
            let field_count = bb.read_var_uint()? as usize;
            let mut fields = Vec::with_capacity(field_count.min(4096));
            for _ in 0..field_count {
                let field_name = bb.read_string()?;
                let type_index = bb.read_var_int()?;
                let is_array = bb.read_byte()? & 1 == 1;
                let value = bb.read_var_uint()?;
                fields.push((field_name, type_index, is_array, value));
            }
            raw.push((name, kind, fields));
        }

        // Type indices may point forward, so resolve them once every definition is known.
        let total = raw.len();
        let mut definitions = Vec::with_capacity(total);
        for (name, kind, fields) in raw {
            let fields = fields
                .into_iter()
                .map(|(field_name, type_index, is_array, value)| {
                    let field_type = if kind == DefinitionKind::Enum {
                        FieldType::UInt
                    } else {
                        FieldType::from_index(type_index, total).ok_or_else(|| {
                            KiwiError::InvalidTypeIndex {
                                field: format!("{name}.{field_name}"),
                                index: type_index,
                            }
                        })?
                    };
                    Ok(Field {
                        name: field_name,
                        field_type,
                        is_array,
                        value,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            definitions.push(Definition { name, kind, fields });
        }

        Ok(Self::new(definitions))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bb = ByteWriter::new();
        bb.write_var_uint(self.definitions.len() as u32);
        for def in &self.definitions {
            bb.write_string(&def.name);
            bb.write_byte(def.kind.to_byte());
            bb.write_var_uint(def.fields.len() as u32);
            for field in &def.fields {
                bb.write_string(&field.name);
                let type_index = if def.kind == DefinitionKind::Enum {
                    0
                } else {
                    field.field_type.to_index()
                };
                bb.write_var_int(type_index);
                bb.write_byte(u8::from(field.is_array));
                bb.write_var_uint(field.value);
            }
        }
        bb.into_inner()
    }
}
