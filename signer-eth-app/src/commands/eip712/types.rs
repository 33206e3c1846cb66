// SPDX-License-Identifier: Apache-2.0

//! Validated EIP-712 schema held by the device

use std::collections::BTreeMap;
use std::fmt;

use evm_signer_transport::{DataType, FieldTypeSpec, StructMember};

pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// A member type the device knows how to hash
///
/// Sizes are in bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Uint(u32),
    Int(u32),
    FixedBytes(u32),
    Bytes,
    String,
    Bool,
    Address,
    Array {
        size: Option<u32>,
        entry: Box<FieldType>,
    },
    Struct(String),
}

impl FieldType {
    pub fn from_spec(spec: &FieldTypeSpec) -> Result<Self, String> {
        let sized = |kind: &str| -> Result<u32, String> {
            match spec.size {
                Some(size @ 1..=32) => Ok(size),
                Some(size) => Err(format!("Invalid {} size {}", kind, size)),
                None => Err(format!("Missing {} size", kind)),
            }
        };

        Ok(match spec.data_type {
            DataType::Uint => FieldType::Uint(sized("uint")?),
            DataType::Int => FieldType::Int(sized("int")?),
            DataType::Bytes if spec.size.is_none() => FieldType::Bytes,
            DataType::Bytes => FieldType::FixedBytes(sized("bytes")?),
            DataType::String => FieldType::String,
            DataType::Bool => FieldType::Bool,
            DataType::Address => FieldType::Address,
            DataType::Array => {
                let entry = spec
                    .entry_type
                    .as_deref()
                    .ok_or_else(|| "Array without entry type".to_string())?;
                FieldType::Array {
                    size: spec.size,
                    entry: Box::new(FieldType::from_spec(entry)?),
                }
            }
            DataType::Struct => {
                let name = spec
                    .struct_name
                    .as_deref()
                    .ok_or_else(|| "Struct without name".to_string())?;
                validate_type_name(name)?;
                FieldType::Struct(name.to_string())
            }
            DataType::Unknown => return Err("Unsupported data type".to_string()),
        })
    }

    /// Struct referenced by this type, looking through arrays
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            FieldType::Struct(name) => Some(name),
            FieldType::Array { entry, .. } => entry.struct_name(),
            _ => None,
        }
    }

    pub fn is_atomic(&self) -> bool {
        !matches!(
            self,
            FieldType::Array { .. } | FieldType::Struct(_)
        )
    }
}

/// Solidity spelling, as used in the encoded type string
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Uint(size) => write!(f, "uint{}", size * 8),
            FieldType::Int(size) => write!(f, "int{}", size * 8),
            FieldType::FixedBytes(size) => write!(f, "bytes{}", size),
            FieldType::Bytes => f.write_str("bytes"),
            FieldType::String => f.write_str("string"),
            FieldType::Bool => f.write_str("bool"),
            FieldType::Address => f.write_str("address"),
            FieldType::Array {
                size: Some(size),
                entry,
            } => write!(f, "{}[{}]", entry, size),
            FieldType::Array { size: None, entry } => write!(f, "{}[]", entry),
            FieldType::Struct(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub field_type: FieldType,
}

/// Struct names end up inside the encoded type string
fn validate_type_name(name: &str) -> Result<(), String> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid struct name {:?}", name))
    }
}

/// Struct definitions by name
#[derive(Clone, Debug, Default)]
pub struct Schema {
    structs: BTreeMap<String, Vec<Member>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a definition, returning the struct names it references
    pub fn insert(&mut self, name: &str, members: &[StructMember]) -> Result<Vec<String>, String> {
        validate_type_name(name)?;
        if self.structs.contains_key(name) {
            return Err(format!("Struct {} defined twice", name));
        }

        let mut parsed: Vec<Member> = Vec::with_capacity(members.len());
        for member in members {
            if member.name.is_empty() {
                return Err(format!("Unnamed member in {}", name));
            }
            if parsed.iter().any(|m| m.name == member.name) {
                return Err(format!("Duplicate member {} in {}", member.name, name));
            }
            let field_type = FieldType::from_spec(&member.field_type)
                .map_err(|e| format!("{}.{}: {}", name, member.name, e))?;
            parsed.push(Member {
                name: member.name.clone(),
                field_type,
            });
        }

        let referenced = parsed
            .iter()
            .filter_map(|m| m.field_type.struct_name())
            .map(str::to_string)
            .collect();
        self.structs.insert(name.to_string(), parsed);
        Ok(referenced)
    }

    pub fn members(&self, name: &str) -> Option<&[Member]> {
        self.structs.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }
}
