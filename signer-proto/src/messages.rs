// SPDX-License-Identifier: Apache-2.0

//! Signing requests, device requests, host answers and final responses

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::failure::Failure;
use crate::typed_data::StructMember;

/// Sign a legacy (EIP-155) transaction
///
/// Integer fields are big-endian byte strings exactly as they should be RLP encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignLegacyTx {
    /// BIP32 derivation path
    pub address_n: Vec<u32>,
    pub nonce: Vec<u8>,
    pub gas_price: Vec<u8>,
    pub gas_limit: Vec<u8>,
    /// Empty for contract creation, 20 bytes, or 21 bytes with a chain-specific prefix
    pub to: Vec<u8>,
    pub value: Vec<u8>,
    /// First bytes of the calldata, at most 1024
    pub data_initial_chunk: Vec<u8>,
    /// Total calldata length
    pub data_length: u32,
    pub chain_id: u64,
    /// Wanchain style envelope marker (1 or 6)
    pub tx_type: Option<u32>,
}

impl SignLegacyTx {
    pub fn new(address_n: Vec<u32>, chain_id: u64) -> Self {
        SignLegacyTx {
            address_n,
            chain_id,
            ..Default::default()
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        self.nonce = nonce.into();
        self
    }

    pub fn with_gas(mut self, gas_price: impl Into<Vec<u8>>, gas_limit: impl Into<Vec<u8>>) -> Self {
        self.gas_price = gas_price.into();
        self.gas_limit = gas_limit.into();
        self
    }

    pub fn with_to(mut self, to: impl Into<Vec<u8>>) -> Self {
        self.to = to.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = value.into();
        self
    }

    /// Attach the whole calldata when it fits into the first chunk
    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data_initial_chunk = data.into();
        self.data_length = self.data_initial_chunk.len() as u32;
        self
    }

    /// Attach the first chunk of a longer calldata
    pub fn with_data_chunk(mut self, first_chunk: impl Into<Vec<u8>>, data_length: u32) -> Self {
        self.data_initial_chunk = first_chunk.into();
        self.data_length = data_length;
        self
    }

    pub fn with_tx_type(mut self, tx_type: u32) -> Self {
        self.tx_type = Some(tx_type);
        self
    }
}

/// One entry of an EIP-2930 access list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListItem {
    pub address: Vec<u8>,
    pub storage_keys: Vec<Vec<u8>>,
}

/// Sign an EIP-1559 (type 2) transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignEip1559Tx {
    pub address_n: Vec<u32>,
    pub nonce: Vec<u8>,
    pub max_gas_fee: Vec<u8>,
    pub max_priority_fee: Vec<u8>,
    pub gas_limit: Vec<u8>,
    pub to: Vec<u8>,
    pub value: Vec<u8>,
    pub data_initial_chunk: Vec<u8>,
    pub data_length: u32,
    pub chain_id: u64,
    pub access_list: Vec<AccessListItem>,
}

impl SignEip1559Tx {
    pub fn new(address_n: Vec<u32>, chain_id: u64) -> Self {
        SignEip1559Tx {
            address_n,
            chain_id,
            ..Default::default()
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        self.nonce = nonce.into();
        self
    }

    pub fn with_fees(
        mut self,
        max_gas_fee: impl Into<Vec<u8>>,
        max_priority_fee: impl Into<Vec<u8>>,
        gas_limit: impl Into<Vec<u8>>,
    ) -> Self {
        self.max_gas_fee = max_gas_fee.into();
        self.max_priority_fee = max_priority_fee.into();
        self.gas_limit = gas_limit.into();
        self
    }

    pub fn with_to(mut self, to: impl Into<Vec<u8>>) -> Self {
        self.to = to.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data_initial_chunk = data.into();
        self.data_length = self.data_initial_chunk.len() as u32;
        self
    }

    pub fn with_data_chunk(mut self, first_chunk: impl Into<Vec<u8>>, data_length: u32) -> Self {
        self.data_initial_chunk = first_chunk.into();
        self.data_length = data_length;
        self
    }

    pub fn with_access_list(mut self, access_list: Vec<AccessListItem>) -> Self {
        self.access_list = access_list;
        self
    }
}

/// Sign EIP-712 typed data whose schema and values are pulled from the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTypedData {
    pub address_n: Vec<u32>,
    pub primary_type: String,
    /// Hash structs nested in arrays with `hashStruct` like MetaMask v4 does
    pub metamask_v4_compat: bool,
    /// Expected message hash, shown to the user and checked against the computed one
    pub show_message_hash: Option<Vec<u8>>,
}

impl SignTypedData {
    pub fn new(address_n: Vec<u32>, primary_type: impl Into<String>) -> Self {
        SignTypedData {
            address_n,
            primary_type: primary_type.into(),
            metamask_v4_compat: true,
            show_message_hash: None,
        }
    }

    pub fn with_metamask_v4_compat(mut self, compat: bool) -> Self {
        self.metamask_v4_compat = compat;
        self
    }

    pub fn with_message_hash(mut self, hash: impl Into<Vec<u8>>) -> Self {
        self.show_message_hash = Some(hash.into());
        self
    }
}

/// Sign a Gnosis Safe `SafeTx` as an owner
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignSafeTx {
    pub address_n: Vec<u32>,
    pub chain_id: u64,
    /// The Safe contract
    pub verifying_contract: Vec<u8>,
    pub to: Vec<u8>,
    pub value: Vec<u8>,
    pub data_initial_chunk: Vec<u8>,
    pub data_length: u32,
    /// 0 = call, 1 = delegatecall
    pub operation: u8,
    pub safe_tx_gas: Vec<u8>,
    pub base_gas: Vec<u8>,
    pub gas_price: Vec<u8>,
    pub gas_token: Vec<u8>,
    pub refund_receiver: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// A request that opens a signing session
///
/// Safe `approveHash` calls arrive as legacy or EIP-1559 transactions and are
/// recognized from their calldata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostRequest {
    SignLegacyTx(SignLegacyTx),
    SignEip1559Tx(SignEip1559Tx),
    SignTypedData(SignTypedData),
    SignSafeTx(SignSafeTx),
}

impl HostRequest {
    pub fn name(&self) -> &'static str {
        match self {
            HostRequest::SignLegacyTx(_) => "SignLegacyTx",
            HostRequest::SignEip1559Tx(_) => "SignEip1559Tx",
            HostRequest::SignTypedData(_) => "SignTypedData",
            HostRequest::SignSafeTx(_) => "SignSafeTx",
        }
    }
}

/// Something the device needs from the host in the middle of a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceRequest {
    /// Next calldata chunk of at most `data_length` bytes
    TxData { data_length: u32 },
    /// Definition of the named EIP-712 struct
    TypedDataStruct { name: String },
    /// Value (or array length) at the given member path
    TypedDataValue { member_path: Vec<u32> },
}

/// Host answer to a [`DeviceRequest`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostAnswer {
    TxAck { data_chunk: Vec<u8> },
    TypedDataStructAck { members: Vec<StructMember> },
    TypedDataValueAck { value: Vec<u8> },
}

impl HostAnswer {
    pub fn name(&self) -> &'static str {
        match self {
            HostAnswer::TxAck { .. } => "TxAck",
            HostAnswer::TypedDataStructAck { .. } => "TypedDataStructAck",
            HostAnswer::TypedDataValueAck { .. } => "TypedDataValueAck",
        }
    }
}

/// `(v, r, s)` of a signed transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v={} r=0x{} s=0x{}",
            self.v,
            hex::encode(self.r),
            hex::encode(self.s)
        )
    }
}

/// Signature over EIP-712 typed data, laid out as `r ‖ s ‖ v`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataSignature {
    pub address: [u8; 20],
    pub signature: Vec<u8>,
}

/// Owner signature over a SafeTx, laid out as `r ‖ s ‖ v`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeSignature {
    pub signature: Vec<u8>,
}

/// Final answer of a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceResponse {
    TxSignature(TxSignature),
    TypedDataSignature(TypedDataSignature),
    SafeSignature(SafeSignature),
    Failure(Failure),
}

impl DeviceResponse {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeviceResponse::Failure(_))
    }
}
