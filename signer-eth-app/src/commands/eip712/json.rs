// SPDX-License-Identifier: Apache-2.0

//! Host side of the typed data protocol for `eth_signTypedData_v4` JSON
//!
//! [`TypedDataJson`] answers the device's struct and value requests from a
//! parsed JSON document, which makes it usable as a [`HostLink`] in tests and
//! demos.

use std::collections::BTreeMap;

use async_trait::async_trait;
use evm_signer_transport::{
    DeviceRequest, FieldTypeSpec, HostAnswer, HostLink, SignTypedData, StructMember,
};
use log::debug;
use num_bigint::{BigInt, BigUint};
use num_traits::One;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::types::DOMAIN_TYPE;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypedDataError {
    #[error("Invalid typed data JSON: {0}")]
    Json(String),
    #[error("Unknown struct {0}")]
    UnknownStruct(String),
    #[error("No value at path {0:?}")]
    InvalidPath(Vec<u32>),
    #[error("Invalid value at {path:?}: {reason}")]
    InvalidValue { path: Vec<u32>, reason: String },
    #[error("Unexpected device request {0}")]
    UnexpectedRequest(String),
}

/// Domain members in the order wallets conventionally declare them
const DOMAIN_FIELDS: [(&str, &str); 5] = [
    ("name", "string"),
    ("version", "string"),
    ("chainId", "uint256"),
    ("verifyingContract", "address"),
    ("salt", "bytes32"),
];

#[derive(Deserialize)]
struct TypeEntry {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

/// `(member name, solidity type)` pairs by struct name
type Types = BTreeMap<String, Vec<(String, String)>>;

#[derive(Clone, Debug)]
pub struct TypedDataJson {
    types: Types,
    primary_type: String,
    domain: Value,
    message: Value,
}

impl TypedDataJson {
    pub fn from_json(json: &str) -> Result<Self, TypedDataError> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| TypedDataError::Json(e.to_string()))?;
        let object = document
            .as_object()
            .ok_or_else(|| TypedDataError::Json("JSON must be an object".to_string()))?;
        let field = |name: &str| {
            object
                .get(name)
                .ok_or_else(|| TypedDataError::Json(format!("Missing '{}' field", name)))
        };

        let domain = field("domain")?.clone();
        if !domain.is_object() {
            return Err(TypedDataError::Json("Domain must be an object".to_string()));
        }
        let primary_type = field("primaryType")?
            .as_str()
            .ok_or_else(|| TypedDataError::Json("primaryType must be a string".to_string()))?
            .to_string();
        let message = object.get("message").cloned().unwrap_or(Value::Null);

        let mut types = parse_types(field("types")?)?;
        if !types.contains_key(DOMAIN_TYPE) {
            let inferred = DOMAIN_FIELDS
                .iter()
                .filter(|(name, _)| domain.get(name).is_some())
                .map(|(name, ty)| (name.to_string(), ty.to_string()))
                .collect();
            types.insert(DOMAIN_TYPE.to_string(), inferred);
        }
        if !types.contains_key(&primary_type) {
            return Err(TypedDataError::Json(format!(
                "Primary type '{}' not found in types",
                primary_type
            )));
        }

        Ok(TypedDataJson {
            types,
            primary_type,
            domain,
            message,
        })
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    /// Signing request for this document
    pub fn request(&self, address_n: Vec<u32>) -> SignTypedData {
        SignTypedData::new(address_n, self.primary_type.clone())
    }

    pub fn struct_members(&self, name: &str) -> Result<Vec<StructMember>, TypedDataError> {
        let fields = self
            .types
            .get(name)
            .ok_or_else(|| TypedDataError::UnknownStruct(name.to_string()))?;
        fields
            .iter()
            .map(|(member, ty)| {
                parse_field_type(ty)
                    .map(|spec| StructMember::new(member.as_str(), spec))
                    .map_err(TypedDataError::Json)
            })
            .collect()
    }

    /// Encoded value at a member path, or the length of the array there
    pub fn value_at(&self, path: &[u32]) -> Result<Vec<u8>, TypedDataError> {
        let invalid_path = || TypedDataError::InvalidPath(path.to_vec());
        let (mut type_name, mut value) = match path.first() {
            Some(0) => (DOMAIN_TYPE.to_string(), &self.domain),
            Some(1) => (self.primary_type.clone(), &self.message),
            _ => return Err(invalid_path()),
        };

        for index in &path[1..] {
            let index = *index as usize;
            if let Some((entry, _)) = split_array(&type_name) {
                value = value
                    .as_array()
                    .and_then(|elements| elements.get(index))
                    .ok_or_else(invalid_path)?;
                type_name = entry.to_string();
            } else {
                let (member, ty) = self
                    .types
                    .get(&type_name)
                    .and_then(|fields| fields.get(index))
                    .ok_or_else(invalid_path)?;
                value = value.get(member).ok_or_else(|| TypedDataError::InvalidValue {
                    path: path.to_vec(),
                    reason: format!("missing member {}", member),
                })?;
                type_name = ty.clone();
            }
        }

        let invalid_value = |reason: String| TypedDataError::InvalidValue {
            path: path.to_vec(),
            reason,
        };
        if split_array(&type_name).is_some() {
            let len = value
                .as_array()
                .ok_or_else(|| invalid_value("expected an array".to_string()))?
                .len();
            let len = u16::try_from(len).map_err(|_| invalid_value("array too long".to_string()))?;
            return Ok(len.to_be_bytes().to_vec());
        }
        if self.types.contains_key(&type_name) {
            return Err(invalid_path());
        }
        let spec = parse_field_type(&type_name).map_err(invalid_value)?;
        encode_json_value(&spec, value).map_err(invalid_value)
    }
}

#[async_trait]
impl HostLink for TypedDataJson {
    type Error = TypedDataError;

    async fn exchange(&self, request: DeviceRequest) -> Result<HostAnswer, Self::Error> {
        debug!("typed data host <= {:?}", request);
        match request {
            DeviceRequest::TypedDataStruct { name } => Ok(HostAnswer::TypedDataStructAck {
                members: self.struct_members(&name)?,
            }),
            DeviceRequest::TypedDataValue { member_path } => Ok(HostAnswer::TypedDataValueAck {
                value: self.value_at(&member_path)?,
            }),
            other => Err(TypedDataError::UnexpectedRequest(format!("{:?}", other))),
        }
    }
}

fn parse_types(value: &Value) -> Result<Types, TypedDataError> {
    let definitions: BTreeMap<String, Vec<TypeEntry>> = serde_json::from_value(value.clone())
        .map_err(|e| TypedDataError::Json(format!("Invalid types: {}", e)))?;
    Ok(definitions
        .into_iter()
        .map(|(name, entries)| {
            let members = entries.into_iter().map(|e| (e.name, e.type_name)).collect();
            (name, members)
        })
        .collect())
}

/// `("Person", "3")` for `Person[3]`, `("uint8[]", "")` for `uint8[][]`
fn split_array(type_name: &str) -> Option<(&str, &str)> {
    let inner = type_name.strip_suffix(']')?;
    inner.rsplit_once('[')
}

/// Solidity type name to its wire description
pub fn parse_field_type(type_name: &str) -> Result<FieldTypeSpec, String> {
    let type_name = type_name.trim();
    if let Some((entry, size)) = split_array(type_name) {
        let size = if size.is_empty() {
            None
        } else {
            Some(
                size.parse::<u32>()
                    .map_err(|_| format!("Invalid array size: {}", size))?,
            )
        };
        return Ok(FieldTypeSpec::array(parse_field_type(entry)?, size));
    }

    let bits = |digits: &str, kind: &str| -> Result<Option<u32>, String> {
        if digits.is_empty() {
            return Ok(Some(32));
        }
        match digits.parse::<u32>() {
            Ok(bits) if bits > 0 && bits <= 256 && bits % 8 == 0 => Ok(Some(bits / 8)),
            Ok(_) => Err(format!("Invalid {} size: {}", kind, digits)),
            Err(_) => Ok(None),
        }
    };

    Ok(match type_name {
        "bool" => FieldTypeSpec::bool(),
        "address" => FieldTypeSpec::address(),
        "string" => FieldTypeSpec::string(),
        "bytes" => FieldTypeSpec::bytes(),
        _ => {
            if let Some(digits) = type_name.strip_prefix("bytes") {
                match digits.parse::<u32>() {
                    Ok(size @ 1..=32) => return Ok(FieldTypeSpec::fixed_bytes(size)),
                    Ok(_) => return Err(format!("Invalid bytes size: {}", digits)),
                    Err(_) => {}
                }
            }
            if let Some(digits) = type_name.strip_prefix("uint") {
                if let Some(size) = bits(digits, "uint")? {
                    return Ok(FieldTypeSpec::uint(size));
                }
            }
            if let Some(digits) = type_name.strip_prefix("int") {
                if let Some(size) = bits(digits, "int")? {
                    return Ok(FieldTypeSpec::int(size));
                }
            }
            FieldTypeSpec::structure(type_name)
        }
    })
}

fn parse_hex(value: &Value, what: &str) -> Result<Vec<u8>, String> {
    let text = value
        .as_str()
        .ok_or_else(|| format!("Expected hex string for {}", what))?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits).map_err(|e| format!("Invalid hex for {}: {}", what, e))
}

/// Minimal big-endian bytes of an unsigned integer, range checked
fn parse_uint_to_min_be(value: &Value, size: u32) -> Result<Vec<u8>, String> {
    let bits = size * 8;
    let big = if let Some(number) = value.as_u64() {
        BigUint::from(number)
    } else if let Some(text) = value.as_str() {
        let text = text.trim();
        match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(digits) => BigUint::parse_bytes(digits.as_bytes(), 16)
                .ok_or_else(|| format!("Invalid hex for uint{}", bits))?,
            None => BigUint::parse_bytes(text.as_bytes(), 10)
                .ok_or_else(|| format!("Invalid decimal string for uint{}", bits))?,
        }
    } else {
        return Err(format!("Expected number or numeric string for uint{}", bits));
    };

    if big >= BigUint::one() << bits {
        return Err(format!("uint{} value out of range", bits));
    }
    Ok(big.to_bytes_be())
}

/// Minimal two's complement bytes of a signed integer, range checked
fn parse_int_to_min_be(value: &Value, size: u32) -> Result<Vec<u8>, String> {
    let bits = size * 8;
    let big = if let Some(number) = value.as_i64() {
        BigInt::from(number)
    } else if let Some(text) = value.as_str() {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(hex_digits) => BigInt::parse_bytes(hex_digits.as_bytes(), 16),
            None => BigInt::parse_bytes(digits.as_bytes(), 10),
        }
        .ok_or_else(|| format!("Invalid integer string for int{}", bits))?;
        if negative {
            -magnitude
        } else {
            magnitude
        }
    } else {
        return Err(format!("Expected number or numeric string for int{}", bits));
    };

    let limit = BigInt::one() << (bits - 1);
    if big < -limit.clone() || big >= limit {
        return Err(format!("int{} value out of range", bits));
    }
    Ok(big.to_signed_bytes_be())
}

fn encode_json_value(spec: &FieldTypeSpec, value: &Value) -> Result<Vec<u8>, String> {
    use evm_signer_transport::DataType;

    match (spec.data_type, spec.size) {
        (DataType::Uint, Some(size)) => parse_uint_to_min_be(value, size),
        (DataType::Int, Some(size)) => parse_int_to_min_be(value, size),
        (DataType::Bytes, None) => parse_hex(value, "bytes"),
        (DataType::Bytes, Some(size)) => {
            let bytes = parse_hex(value, "bytes")?;
            if bytes.len() != size as usize {
                return Err(format!("Expected {} bytes, got {}", size, bytes.len()));
            }
            Ok(bytes)
        }
        (DataType::String, _) => value
            .as_str()
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| "Expected string value".to_string()),
        (DataType::Bool, _) => value
            .as_bool()
            .map(|b| vec![b as u8])
            .ok_or_else(|| "Expected boolean value".to_string()),
        (DataType::Address, _) => {
            let bytes = parse_hex(value, "address")?;
            if bytes.len() != 20 {
                return Err(format!("Address of {} bytes", bytes.len()));
            }
            Ok(bytes)
        }
        (data_type, _) => Err(format!("{:?} is not a single value", data_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MAIL: &str = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Person": [
                {"name": "name", "type": "string"},
                {"name": "wallet", "type": "address"}
            ],
            "Mail": [
                {"name": "from", "type": "Person"},
                {"name": "to", "type": "Person"},
                {"name": "contents", "type": "string"}
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": {"name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"},
            "to": {"name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"},
            "contents": "Hello, Bob!"
        }
    }"#;

    #[test]
    fn test_parse_field_type() {
        assert_eq!(parse_field_type("uint256"), Ok(FieldTypeSpec::uint(32)));
        assert_eq!(parse_field_type("uint"), Ok(FieldTypeSpec::uint(32)));
        assert_eq!(parse_field_type("int8"), Ok(FieldTypeSpec::int(1)));
        assert_eq!(parse_field_type("bytes32"), Ok(FieldTypeSpec::fixed_bytes(32)));
        assert_eq!(parse_field_type("Intent"), Ok(FieldTypeSpec::structure("Intent")));
        assert_eq!(
            parse_field_type("Person[2][]"),
            Ok(FieldTypeSpec::array(
                FieldTypeSpec::array(FieldTypeSpec::structure("Person"), Some(2)),
                None
            ))
        );
        assert!(parse_field_type("uint7").is_err());
        assert!(parse_field_type("bytes33").is_err());
    }

    #[test]
    fn test_integer_encodings() {
        assert_eq!(parse_uint_to_min_be(&json!(0), 32), Ok(vec![0]));
        assert_eq!(parse_uint_to_min_be(&json!("0x0100"), 32), Ok(vec![1, 0]));
        assert_eq!(parse_uint_to_min_be(&json!("256"), 2), Ok(vec![1, 0]));
        assert!(parse_uint_to_min_be(&json!(256), 1).is_err());
        assert!(parse_uint_to_min_be(&json!(1.5), 32).is_err());

        assert_eq!(parse_int_to_min_be(&json!(-1), 1), Ok(vec![0xFF]));
        assert_eq!(parse_int_to_min_be(&json!("-128"), 1), Ok(vec![0x80]));
        assert_eq!(parse_int_to_min_be(&json!(128), 2), Ok(vec![0x00, 0x80]));
        assert!(parse_int_to_min_be(&json!(128), 1).is_err());
        assert!(parse_int_to_min_be(&json!("-129"), 1).is_err());
    }

    #[test]
    fn test_values_by_path() {
        let data = TypedDataJson::from_json(MAIL).unwrap();

        assert_eq!(data.value_at(&[0, 0]).unwrap(), b"Ether Mail".to_vec());
        assert_eq!(data.value_at(&[0, 2]).unwrap(), vec![1]);
        assert_eq!(data.value_at(&[1, 1, 0]).unwrap(), b"Bob".to_vec());
        assert_eq!(data.value_at(&[1, 2]).unwrap(), b"Hello, Bob!".to_vec());
        assert_eq!(
            data.value_at(&[1, 0]),
            Err(TypedDataError::InvalidPath(vec![1, 0]))
        );
        assert!(data.value_at(&[2]).is_err());
        assert!(data.value_at(&[1, 9]).is_err());
    }

    #[test]
    fn test_arrays_and_inferred_domain() {
        let data = TypedDataJson::from_json(
            r#"{
                "types": {"Group": [{"name": "ids", "type": "uint8[]"}]},
                "primaryType": "Group",
                "domain": {"chainId": 5, "name": "G"},
                "message": {"ids": [1, 2, 3]}
            }"#,
        )
        .unwrap();

        assert_eq!(data.value_at(&[1, 0]).unwrap(), vec![0, 3]);
        assert_eq!(data.value_at(&[1, 0, 2]).unwrap(), vec![3]);
        let domain = data.struct_members(DOMAIN_TYPE).unwrap();
        let names: Vec<_> = domain.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["name", "chainId"]);
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(TypedDataJson::from_json("[]").is_err());
        assert!(TypedDataJson::from_json(r#"{"types": {}, "primaryType": "Mail", "domain": {}}"#).is_err());
    }
}
