// SPDX-License-Identifier: Apache-2.0

//! EIP-1559 (type 2) transaction signing

use async_trait::async_trait;
use evm_signer_device_base::{SecureElement, Ui};
use evm_signer_transport::{AccessListItem, HostLink, SignEip1559Tx, TxSignature};
use log::info;

use super::{tx_signature, validate_gas_fields, TxEnvelope};
use crate::approval::FeeSummary;
use crate::constants::{length, tx_type};
use crate::errors::{EthSignError, EthSignResult};
use crate::format::to_biguint;
use crate::keccak::Keccak256Hasher;
use crate::rlp::{self, Item, Kind, Sink};
use crate::{EthApp, Session};

#[async_trait]
pub trait SignEip1559Transaction<H, U, S>
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    /// Review and sign a type 2 transaction; `v` is the bare recovery bit
    async fn sign_eip1559_tx(
        session: &Session<'_, H, U, S>,
        request: SignEip1559Tx,
    ) -> EthSignResult<TxSignature, H::Error>;
}

#[async_trait]
impl<H, U, S> SignEip1559Transaction<H, U, S> for EthApp
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    async fn sign_eip1559_tx(
        session: &Session<'_, H, U, S>,
        request: SignEip1559Tx,
    ) -> EthSignResult<TxSignature, H::Error> {
        let envelope = TxEnvelope {
            address_n: &request.address_n,
            to: &request.to,
            value: &request.value,
            data_initial_chunk: &request.data_initial_chunk,
            data_length: request.data_length,
            chain_id: request.chain_id,
        };
        envelope.validate()?;
        validate_gas_fields(&[&request.max_gas_fee, &request.gas_limit])?;
        validate_gas_fields(&[&request.max_priority_fee, &request.gas_limit])?;
        validate_access_list(&request.access_list)?;

        let fee = FeeSummary::eip1559(
            &to_biguint(&request.max_gas_fee),
            &to_biguint(&request.max_priority_fee),
            &to_biguint(&request.gas_limit),
        );
        let path = envelope.approve(session, fee).await?;

        let head = [
            Item::Uint(request.chain_id),
            Item::Bytes(&request.nonce),
            Item::Bytes(&request.max_priority_fee),
            Item::Bytes(&request.max_gas_fee),
            Item::Bytes(&request.gas_limit),
            Item::Bytes(&request.to),
            Item::Bytes(&request.value),
        ];
        let access_list_payload = access_list_payload_length(&request.access_list);
        let payload_length = head.iter().map(rlp::encoded_length).sum::<usize>()
            + envelope.data_field_length()
            + rlp::list_length(access_list_payload);

        let mut hasher = Keccak256Hasher::new();
        hasher.absorb(&[tx_type::EIP1559]);
        rlp::write_header(&mut hasher, payload_length, Kind::List);
        for item in &head {
            rlp::write(&mut hasher, item);
        }
        envelope.stream_data(session.link, &mut hasher).await?;
        write_access_list(&mut hasher, &request.access_list, access_list_payload);
        let digest = hasher.finalize();

        info!("EIP-1559 transaction digest: {}", hex::encode(digest));
        let signature = session.secure_element.sign_digest(&path, &digest)?;
        Ok(tx_signature(&signature, signature.recovery_bit() as u64))
    }
}

fn validate_access_list<E: std::error::Error>(access_list: &[AccessListItem]) -> EthSignResult<(), E> {
    for item in access_list {
        if item.address.len() != length::ADDRESS {
            return Err(EthSignError::Validation(format!(
                "Invalid access list address length {}",
                item.address.len()
            )));
        }
        if let Some(key) = item.storage_keys.iter().find(|k| k.len() != length::WORD) {
            return Err(EthSignError::Validation(format!(
                "Invalid storage key length {}",
                key.len()
            )));
        }
    }
    Ok(())
}

fn storage_keys_payload_length(keys: &[Vec<u8>]) -> usize {
    keys.iter().map(|k| rlp::encoded_length(&Item::Bytes(k))).sum()
}

fn item_payload_length(item: &AccessListItem) -> usize {
    rlp::encoded_length(&Item::Bytes(&item.address))
        + rlp::list_length(storage_keys_payload_length(&item.storage_keys))
}

fn access_list_payload_length(access_list: &[AccessListItem]) -> usize {
    access_list
        .iter()
        .map(|item| rlp::list_length(item_payload_length(item)))
        .sum()
}

/// `[[address, [key, ...]], ...]`
fn write_access_list<S: Sink + ?Sized>(sink: &mut S, access_list: &[AccessListItem], payload_length: usize) {
    rlp::write_header(sink, payload_length, Kind::List);
    for item in access_list {
        rlp::write_header(sink, item_payload_length(item), Kind::List);
        rlp::write(sink, &Item::Bytes(&item.address));
        rlp::write_header(sink, storage_keys_payload_length(&item.storage_keys), Kind::List);
        for key in &item.storage_keys {
            rlp::write(sink, &Item::Bytes(key));
        }
    }
}
