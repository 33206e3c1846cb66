// SPDX-License-Identifier: Apache-2.0

//! `encodeType` and `encodeData` for single values

use std::collections::BTreeSet;

use evm_signer_device_base::Property;
use num_bigint::{BigInt, BigUint};

use super::types::{FieldType, Schema};
use crate::format::{checksum_address, format_hex};
use crate::keccak::keccak256;

/// `Primary(type name,...)` followed by every referenced struct, sorted by name
pub fn encode_type(schema: &Schema, primary: &str) -> Result<String, String> {
    let mut referenced = BTreeSet::new();
    let mut pending = vec![primary.to_string()];
    while let Some(name) = pending.pop() {
        let members = schema
            .members(&name)
            .ok_or_else(|| format!("Undefined struct {}", name))?;
        for member in members {
            if let Some(child) = member.field_type.struct_name() {
                if child != primary && referenced.insert(child.to_string()) {
                    pending.push(child.to_string());
                }
            }
        }
    }

    let mut out = String::new();
    for name in std::iter::once(primary).chain(referenced.iter().map(String::as_str)) {
        let members = schema
            .members(name)
            .ok_or_else(|| format!("Undefined struct {}", name))?;
        out.push_str(name);
        out.push('(');
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&format!("{} {}", member.field_type, member.name));
        }
        out.push(')');
    }
    Ok(out)
}

pub fn type_hash(schema: &Schema, primary: &str) -> Result<[u8; 32], String> {
    Ok(keccak256(encode_type(schema, primary)?.as_bytes()))
}

fn check_integer_width(value: &[u8], size: u32) -> Result<(), String> {
    if value.is_empty() || value.len() > size as usize {
        return Err(format!(
            "Integer of {} bytes for a {} byte field",
            value.len(),
            size
        ));
    }
    Ok(())
}

/// The 32 bytes an atomic or dynamic value contributes to its parent
pub fn encode_value(field_type: &FieldType, value: &[u8]) -> Result<[u8; 32], String> {
    let mut word = [0u8; 32];
    match field_type {
        FieldType::Uint(size) => {
            check_integer_width(value, *size)?;
            word[32 - value.len()..].copy_from_slice(value);
        }
        FieldType::Int(size) => {
            check_integer_width(value, *size)?;
            if value[0] & 0x80 != 0 {
                word = [0xFF; 32];
            }
            word[32 - value.len()..].copy_from_slice(value);
        }
        FieldType::FixedBytes(size) => {
            if value.len() != *size as usize {
                return Err(format!("Expected {} bytes, got {}", size, value.len()));
            }
            word[..value.len()].copy_from_slice(value);
        }
        FieldType::Address => {
            if value.len() != 20 {
                return Err(format!("Address of {} bytes", value.len()));
            }
            word[12..].copy_from_slice(value);
        }
        FieldType::Bool => match value {
            [0] | [1] => word[31] = value[0],
            _ => return Err("Invalid boolean".to_string()),
        },
        FieldType::String => {
            std::str::from_utf8(value).map_err(|_| "String is not UTF-8".to_string())?;
            word = keccak256(value);
        }
        FieldType::Bytes => word = keccak256(value),
        FieldType::Array { .. } | FieldType::Struct(_) => {
            return Err(format!("{} is not a single value", field_type))
        }
    }
    Ok(word)
}

/// How a validated value is shown; `chain_id` picks the address checksum
pub fn display_value(field_type: &FieldType, value: &[u8], chain_id: u64) -> Property {
    let label = field_type.to_string();
    match field_type {
        FieldType::Uint(_) => {
            Property::new(label, BigUint::from_bytes_be(value).to_string())
        }
        FieldType::Int(_) => Property::new(label, BigInt::from_signed_bytes_be(value).to_string()),
        FieldType::Bool => Property::new(label, if value == [1] { "true" } else { "false" }),
        FieldType::String => Property::data(label, String::from_utf8_lossy(value)),
        FieldType::Address => {
            let mut address = [0u8; 20];
            address.copy_from_slice(value);
            Property::new(label, checksum_address(&address, chain_id))
        }
        _ => Property::data(label, format_hex(value)),
    }
}
