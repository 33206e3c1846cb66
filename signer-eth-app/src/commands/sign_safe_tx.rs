// SPDX-License-Identifier: Apache-2.0

//! Gnosis Safe `SafeTx` owner signatures

use async_trait::async_trait;
use evm_signer_device_base::{DerivationPath, Property, Screen, SecureElement, Ui};
use evm_signer_transport::{HostLink, SafeSignature, SignSafeTx};
use log::info;

use super::validate_calldata;
use crate::approval::{Review, SafeCallSummary};
use crate::chunks::ChunkedReader;
use crate::constants::{length, typehash, EIP712_PREFIX};
use crate::errors::{EthSignError, EthSignResult};
use crate::format::{checksum_address, format_hex, to_biguint};
use crate::keccak::Keccak256Hasher;
use crate::networks;
use crate::paths::check_path;
use crate::{EthApp, Session};

#[async_trait]
pub trait SignSafeTransaction<H, U, S>
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    /// Review a SafeTx and sign its EIP-712 digest, returned as `r ‖ s ‖ v`
    async fn sign_safe_tx(
        session: &Session<'_, H, U, S>,
        request: SignSafeTx,
    ) -> EthSignResult<SafeSignature, H::Error>;
}

#[async_trait]
impl<H, U, S> SignSafeTransaction<H, U, S> for EthApp
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    async fn sign_safe_tx(
        session: &Session<'_, H, U, S>,
        request: SignSafeTx,
    ) -> EthSignResult<SafeSignature, H::Error> {
        let fields = SafeTxFields::parse(&request)?;
        let path = DerivationPath::try_from(request.address_n.as_slice())?;
        let network = networks::by_chain_id(request.chain_id);
        check_path(session.ui, session.settings, &path, &network).await?;

        safe_tx_review(&request, &fields, &network)
            .walk(session.ui, session.settings)
            .await?;

        let mut data_hasher = Keccak256Hasher::new();
        data_hasher.absorb(&request.data_initial_chunk);
        ChunkedReader::new(
            session.link,
            request.data_length,
            request.data_initial_chunk.len(),
        )
        .stream_into(&mut data_hasher)
        .await?;

        let domain_hash = safe_domain_hash(request.chain_id, &fields.verifying_contract);
        let struct_hash = fields.struct_hash(&data_hasher.finalize());
        let digest = safe_digest(&domain_hash, &struct_hash);

        info!("SafeTx digest: {}", hex::encode(digest));
        let signature = session.secure_element.sign_digest(&path, &digest)?;
        Ok(SafeSignature {
            signature: signature.to_rsv(),
        })
    }
}

/// Validated, word-aligned SafeTx members
struct SafeTxFields {
    verifying_contract: [u8; 32],
    to: [u8; 32],
    value: [u8; 32],
    operation: u8,
    safe_tx_gas: [u8; 32],
    base_gas: [u8; 32],
    gas_price: [u8; 32],
    gas_token: [u8; 32],
    refund_receiver: [u8; 32],
    nonce: [u8; 32],
}

impl SafeTxFields {
    fn parse<E: std::error::Error>(request: &SignSafeTx) -> EthSignResult<Self, E> {
        validate_calldata(&request.data_initial_chunk, request.data_length)?;
        if request.chain_id == 0 {
            return Err(EthSignError::Validation("Chain ID out of bounds".to_string()));
        }
        if request.operation > 1 {
            return Err(EthSignError::Validation(format!(
                "Invalid operation {}",
                request.operation
            )));
        }

        Ok(SafeTxFields {
            verifying_contract: address_word(&request.verifying_contract, "verifying contract", false)?,
            to: address_word(&request.to, "recipient", false)?,
            value: uint_word(&request.value, "value")?,
            operation: request.operation,
            safe_tx_gas: uint_word(&request.safe_tx_gas, "safe tx gas")?,
            base_gas: uint_word(&request.base_gas, "base gas")?,
            gas_price: uint_word(&request.gas_price, "gas price")?,
            gas_token: address_word(&request.gas_token, "gas token", true)?,
            refund_receiver: address_word(&request.refund_receiver, "refund receiver", true)?,
            nonce: uint_word(&request.nonce, "nonce")?,
        })
    }

    fn struct_hash(&self, data_hash: &[u8; 32]) -> [u8; 32] {
        let mut operation = [0u8; 32];
        operation[31] = self.operation;

        let mut hasher = Keccak256Hasher::new();
        for word in [
            &typehash::SAFE_TX,
            &self.to,
            &self.value,
            data_hash,
            &operation,
            &self.safe_tx_gas,
            &self.base_gas,
            &self.gas_price,
            &self.gas_token,
            &self.refund_receiver,
            &self.nonce,
        ] {
            hasher.absorb(word);
        }
        hasher.finalize()
    }
}

fn uint_word<E: std::error::Error>(bytes: &[u8], name: &str) -> EthSignResult<[u8; 32], E> {
    if bytes.len() > length::WORD {
        return Err(EthSignError::Validation(format!(
            "Invalid {} length {}",
            name,
            bytes.len()
        )));
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(word)
}

/// Empty stands for the zero address where `optional` is set
fn address_word<E: std::error::Error>(
    bytes: &[u8],
    name: &str,
    optional: bool,
) -> EthSignResult<[u8; 32], E> {
    match bytes.len() {
        length::ADDRESS => uint_word(bytes, name),
        0 if optional => Ok([0u8; 32]),
        other => Err(EthSignError::Validation(format!(
            "Invalid {} length {}",
            name, other
        ))),
    }
}

fn word_address(word: &[u8; 32]) -> [u8; 20] {
    let mut address = [0u8; 20];
    address.copy_from_slice(&word[12..]);
    address
}

/// `hashStruct(EIP712Domain{chainId, verifyingContract})`
pub fn safe_domain_hash(chain_id: u64, verifying_contract: &[u8; 32]) -> [u8; 32] {
    let mut chain = [0u8; 32];
    chain[24..].copy_from_slice(&chain_id.to_be_bytes());

    let mut hasher = Keccak256Hasher::new();
    hasher.absorb(&typehash::SAFE_DOMAIN);
    hasher.absorb(&chain);
    hasher.absorb(verifying_contract);
    hasher.finalize()
}

pub fn safe_digest(domain_hash: &[u8; 32], struct_hash: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256Hasher::new();
    hasher.absorb(&EIP712_PREFIX);
    hasher.absorb(domain_hash);
    hasher.absorb(struct_hash);
    hasher.finalize()
}

fn safe_tx_review(request: &SignSafeTx, fields: &SafeTxFields, network: &networks::NetworkInfo) -> Review {
    let chain_id = request.chain_id;
    let value = to_biguint(&request.value);
    let summary = SafeCallSummary {
        to: word_address(&fields.to),
        value: &value,
        operation: fields.operation,
        data_length: request.data_length as usize,
        data: &request.data_initial_chunk,
    };
    let address = |word: &[u8; 32]| checksum_address(&word_address(word), chain_id);

    let overview = Screen::details("Sign Safe transaction")
        .with_property(Property::new("Safe", address(&fields.verifying_contract)))
        .with_properties(summary.properties(network));

    let mut details = Screen::details("Safe transaction details")
        .with_property(Property::new("Safe tx gas", to_biguint(&fields.safe_tx_gas).to_string()))
        .with_property(Property::new("Base gas", to_biguint(&fields.base_gas).to_string()))
        .with_property(Property::new("Gas price", to_biguint(&fields.gas_price).to_string()))
        .with_property(Property::new("Gas token", address(&fields.gas_token)))
        .with_property(Property::new("Refund receiver", address(&fields.refund_receiver)))
        .with_property(Property::new("Network", network.name));
    if !request.data_initial_chunk.is_empty() {
        details = details.with_property(Property::data(
            "Data",
            format_hex(&request.data_initial_chunk),
        ));
    }

    let confirm = Screen::confirm("Confirm Safe transaction")
        .with_property(Property::new("Nonce", to_biguint(&fields.nonce).to_string()));

    summary.decorate(Review::new(overview, confirm).with_details(details))
}
