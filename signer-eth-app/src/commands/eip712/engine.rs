// SPDX-License-Identifier: Apache-2.0

//! Schema collection and the `hashStruct` walker
//!
//! The walker keeps its own stack of frames instead of recursing, so a hostile
//! schema can only nest as deep as the frame limit allows.

use std::collections::{BTreeMap, VecDeque};

use evm_signer_device_base::{Property, Screen, Ui, UiExt};
use evm_signer_transport::{DeviceRequest, HostAnswer, HostLink};
use log::debug;

use super::encoding::{display_value, encode_value, type_hash};
use super::types::{FieldType, Schema, DOMAIN_TYPE};
use super::DOMAIN_ROOT;
use crate::constants::limits;
use crate::errors::{EthSignError, EthSignResult};
use crate::keccak::Keccak256Hasher;

/// Request every struct reachable from the domain and the primary type
pub async fn collect_schema<H>(link: &H, primary_type: &str) -> EthSignResult<Schema, H::Error>
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
{
    let mut schema = Schema::new();
    let mut pending = VecDeque::from([DOMAIN_TYPE.to_string()]);
    if primary_type != DOMAIN_TYPE {
        pending.push_back(primary_type.to_string());
    }

    while let Some(name) = pending.pop_front() {
        if schema.contains(&name) {
            continue;
        }
        let answer = link
            .exchange(DeviceRequest::TypedDataStruct { name: name.clone() })
            .await
            .map_err(EthSignError::Link)?;
        let members = match answer {
            HostAnswer::TypedDataStructAck { members } => members,
            other => {
                return Err(EthSignError::Protocol(format!(
                    "expected TypedDataStructAck, got {}",
                    other.name()
                )))
            }
        };
        debug!("struct {} has {} members", name, members.len());

        let referenced = schema
            .insert(&name, &members)
            .map_err(EthSignError::Data)?;
        pending.extend(referenced.into_iter().filter(|r| !schema.contains(r)));
    }
    Ok(schema)
}

pub fn member_names(schema: &Schema, name: &str) -> String {
    schema
        .members(name)
        .map(|members| {
            members
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

enum FrameKind {
    Struct { type_name: String },
    Array { label: String, entry: FieldType, len: u32 },
}

struct Frame {
    kind: FrameKind,
    path: Vec<u32>,
    /// `None` when members are written into the enclosing frame's hasher
    hasher: Option<Keccak256Hasher>,
    /// Children get their own screens
    show: bool,
    next: u32,
}

struct Child {
    field_type: FieldType,
    label: String,
    path: Vec<u32>,
}

impl Frame {
    fn is_array(&self) -> bool {
        matches!(self.kind, FrameKind::Array { .. })
    }

    fn next_child(&mut self, schema: &Schema) -> Result<Option<Child>, String> {
        let index = self.next;
        let child = match &self.kind {
            FrameKind::Struct { type_name } => {
                let members = schema
                    .members(type_name)
                    .ok_or_else(|| format!("Undefined struct {}", type_name))?;
                members
                    .get(index as usize)
                    .map(|m| (m.field_type.clone(), m.name.clone()))
            }
            FrameKind::Array { label, entry, len } => {
                (index < *len).then(|| (entry.clone(), format!("{}[{}]", label, index)))
            }
        };

        Ok(child.map(|(field_type, label)| {
            self.next += 1;
            let mut path = self.path.clone();
            path.push(index);
            Child {
                field_type,
                label,
                path,
            }
        }))
    }
}

fn absorb(stack: &mut [Frame], bytes: &[u8]) {
    if let Some(hasher) = stack.iter_mut().rev().find_map(|f| f.hasher.as_mut()) {
        hasher.absorb(bytes);
    }
}

/// Hashes structs whose values are pulled from the host one at a time
pub struct TypedDataWalker<'a, H, U> {
    link: &'a H,
    ui: &'a U,
    schema: &'a Schema,
    metamask_v4_compat: bool,
    chain_id: Option<u64>,
    type_hashes: BTreeMap<String, [u8; 32]>,
}

impl<'a, H, U> TypedDataWalker<'a, H, U>
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
{
    pub fn new(link: &'a H, ui: &'a U, schema: &'a Schema, metamask_v4_compat: bool) -> Self {
        TypedDataWalker {
            link,
            ui,
            schema,
            metamask_v4_compat,
            chain_id: None,
            type_hashes: BTreeMap::new(),
        }
    }

    /// `chainId` of the domain once it has been read
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    fn type_hash(&mut self, name: &str) -> EthSignResult<[u8; 32], H::Error> {
        if let Some(hash) = self.type_hashes.get(name) {
            return Ok(*hash);
        }
        let hash = type_hash(self.schema, name).map_err(EthSignError::Data)?;
        self.type_hashes.insert(name.to_string(), hash);
        Ok(hash)
    }

    fn struct_frame(
        &mut self,
        type_name: &str,
        path: Vec<u32>,
        show: bool,
        hashed: bool,
    ) -> EthSignResult<Frame, H::Error> {
        let hasher = if hashed {
            let mut hasher = Keccak256Hasher::new();
            hasher.absorb(&self.type_hash(type_name)?);
            Some(hasher)
        } else {
            None
        };
        Ok(Frame {
            kind: FrameKind::Struct {
                type_name: type_name.to_string(),
            },
            path,
            hasher,
            show,
            next: 0,
        })
    }

    async fn value(&self, path: &[u32]) -> EthSignResult<Vec<u8>, H::Error> {
        let answer = self
            .link
            .exchange(DeviceRequest::TypedDataValue {
                member_path: path.to_vec(),
            })
            .await
            .map_err(EthSignError::Link)?;
        match answer {
            HostAnswer::TypedDataValueAck { value } => Ok(value),
            other => Err(EthSignError::Protocol(format!(
                "expected TypedDataValueAck, got {}",
                other.name()
            ))),
        }
    }

    async fn array_length(&self, path: &[u32]) -> EthSignResult<u32, H::Error> {
        match self.value(path).await?.as_slice() {
            [high, low] => Ok(u16::from_be_bytes([*high, *low]) as u32),
            other => Err(EthSignError::Data(format!(
                "Array length of {} bytes",
                other.len()
            ))),
        }
    }

    fn check_depth(stack: &[Frame]) -> EthSignResult<(), H::Error> {
        if stack.len() >= limits::EIP712_MAX_DEPTH {
            return Err(EthSignError::Data(format!(
                "Nesting deeper than {} levels",
                limits::EIP712_MAX_DEPTH
            )));
        }
        Ok(())
    }

    fn remember_chain_id(&mut self, child: &Child, value: &[u8]) {
        let in_domain = child.path.len() == 2 && child.path[0] == DOMAIN_ROOT;
        if in_domain && child.label == "chainId" && value.len() <= 8 {
            let mut bytes = [0u8; 8];
            bytes[8 - value.len()..].copy_from_slice(value);
            self.chain_id = Some(u64::from_be_bytes(bytes));
        }
    }

    /// `hashStruct(type_name, value at path)`, walking the user through it when `show` is set
    pub async fn hash_struct(
        &mut self,
        type_name: &str,
        path: Vec<u32>,
        show: bool,
    ) -> EthSignResult<[u8; 32], H::Error> {
        let root = self.struct_frame(type_name, path, show, true)?;
        let mut stack = vec![root];

        loop {
            let (child, show, in_array) = match stack.last_mut() {
                Some(top) => (
                    top.next_child(self.schema).map_err(EthSignError::Data)?,
                    top.show,
                    top.is_array(),
                ),
                None => return Err(EthSignError::Data("Empty struct walk".to_string())),
            };

            let Some(child) = child else {
                let digest = stack.pop().and_then(|done| done.hasher).map(|h| h.finalize());
                match digest {
                    Some(digest) if stack.is_empty() => return Ok(digest),
                    Some(digest) => absorb(&mut stack, &digest),
                    None => {}
                }
                continue;
            };

            match &child.field_type {
                FieldType::Struct(name) => {
                    Self::check_depth(&stack)?;
                    let expand = show
                        && self
                            .ui
                            .confirm_or_details(
                                Screen::overview(child.label.as_str())
                                    .with_subtitle(name.as_str())
                                    .with_property(Property::new(
                                        "Members",
                                        member_names(self.schema, name),
                                    )),
                            )
                            .await?;
                    let hashed = !in_array || self.metamask_v4_compat;
                    let frame = self.struct_frame(name, child.path, expand, hashed)?;
                    stack.push(frame);
                }
                FieldType::Array { size, entry } => {
                    Self::check_depth(&stack)?;
                    let len = self.array_length(&child.path).await?;
                    if let Some(size) = size.filter(|s| *s != len) {
                        return Err(EthSignError::Data(format!(
                            "{} has {} elements, expected {}",
                            child.label, len, size
                        )));
                    }
                    let expand = show
                        && self
                            .ui
                            .confirm_or_details(
                                Screen::overview(child.label.as_str())
                                    .with_subtitle(child.field_type.to_string())
                                    .with_property(Property::new(
                                        "Size",
                                        format!("{} elements", len),
                                    )),
                            )
                            .await?;
                    stack.push(Frame {
                        kind: FrameKind::Array {
                            label: child.label,
                            entry: (**entry).clone(),
                            len,
                        },
                        path: child.path,
                        hasher: Some(Keccak256Hasher::new()),
                        show: expand,
                        next: 0,
                    });
                }
                leaf => {
                    let value = self.value(&child.path).await?;
                    let word = encode_value(leaf, &value)
                        .map_err(|e| EthSignError::Data(format!("{}: {}", child.label, e)))?;
                    if matches!(leaf, FieldType::Uint(_)) {
                        self.remember_chain_id(&child, &value);
                    }
                    if show {
                        let property = display_value(leaf, &value, self.chain_id.unwrap_or(1));
                        self.ui
                            .confirm(Screen::details(child.label.as_str()).with_property(property))
                            .await?;
                    }
                    absorb(&mut stack, &word);
                }
            }
        }
    }
}
