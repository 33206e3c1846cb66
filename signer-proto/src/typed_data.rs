// SPDX-License-Identifier: Apache-2.0

//! EIP-712 schema as it travels on the wire
//!
//! Sizes are in bytes (`uint256` has size 32). The device converts these into its own
//! validated field types and rejects anything it cannot hash.

use serde::{Deserialize, Serialize};

/// Wire data type tag
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Uint,
    Int,
    /// `bytes` when size is absent, `bytesN` otherwise
    Bytes,
    String,
    Bool,
    Address,
    Array,
    Struct,
    /// Anything the device does not know about
    #[serde(other)]
    Unknown,
}

/// Wire description of a member type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeSpec {
    pub data_type: DataType,
    pub size: Option<u32>,
    pub entry_type: Option<Box<FieldTypeSpec>>,
    pub struct_name: Option<String>,
}

impl FieldTypeSpec {
    fn plain(data_type: DataType, size: Option<u32>) -> Self {
        FieldTypeSpec {
            data_type,
            size,
            entry_type: None,
            struct_name: None,
        }
    }

    /// `uint<8 * size>`
    pub fn uint(size: u32) -> Self {
        Self::plain(DataType::Uint, Some(size))
    }

    /// `int<8 * size>`
    pub fn int(size: u32) -> Self {
        Self::plain(DataType::Int, Some(size))
    }

    /// `bytes<size>`
    pub fn fixed_bytes(size: u32) -> Self {
        Self::plain(DataType::Bytes, Some(size))
    }

    pub fn bytes() -> Self {
        Self::plain(DataType::Bytes, None)
    }

    pub fn string() -> Self {
        Self::plain(DataType::String, None)
    }

    pub fn bool() -> Self {
        Self::plain(DataType::Bool, None)
    }

    pub fn address() -> Self {
        Self::plain(DataType::Address, None)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        FieldTypeSpec {
            data_type: DataType::Struct,
            size: None,
            entry_type: None,
            struct_name: Some(name.into()),
        }
    }

    /// Dynamic array when `size` is `None`
    pub fn array(entry: FieldTypeSpec, size: Option<u32>) -> Self {
        FieldTypeSpec {
            data_type: DataType::Array,
            size,
            entry_type: Some(Box::new(entry)),
            struct_name: None,
        }
    }
}

/// One member of a struct definition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMember {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldTypeSpec,
}

impl StructMember {
    pub fn new(name: impl Into<String>, field_type: FieldTypeSpec) -> Self {
        StructMember {
            name: name.into(),
            field_type,
        }
    }
}
