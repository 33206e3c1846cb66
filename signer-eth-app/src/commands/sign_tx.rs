// SPDX-License-Identifier: Apache-2.0

//! Legacy transaction signing with EIP-155 replay protection

use async_trait::async_trait;
use evm_signer_device_base::{RecoverableSignature, SecureElement, Ui};
use evm_signer_transport::{HostLink, SignLegacyTx, TxSignature};
use log::info;

use super::{tx_signature, validate_gas_fields, TxEnvelope};
use crate::approval::FeeSummary;
use crate::constants::{limits, tx_type};
use crate::errors::{EthSignError, EthSignResult};
use crate::format::to_biguint;
use crate::keccak::Keccak256Hasher;
use crate::rlp::{self, Item, Kind};
use crate::{EthApp, Session};

#[async_trait]
pub trait SignLegacyTransaction<H, U, S>
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    /// Review and sign a legacy transaction
    async fn sign_legacy_tx(
        session: &Session<'_, H, U, S>,
        request: SignLegacyTx,
    ) -> EthSignResult<TxSignature, H::Error>;
}

#[async_trait]
impl<H, U, S> SignLegacyTransaction<H, U, S> for EthApp
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    async fn sign_legacy_tx(
        session: &Session<'_, H, U, S>,
        request: SignLegacyTx,
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
        validate_gas_fields(&[&request.gas_price, &request.gas_limit])?;
        if let Some(other) = request
            .tx_type
            .filter(|t| *t != tx_type::LEGACY_TYPE_1 && *t != tx_type::LEGACY_TYPE_6)
        {
            return Err(EthSignError::Validation(format!(
                "Unsupported transaction type {}",
                other
            )));
        }

        let fee = FeeSummary::legacy(
            &to_biguint(&request.gas_price),
            &to_biguint(&request.gas_limit),
        );
        let path = envelope.approve(session, fee).await?;

        let mut head = Vec::with_capacity(6);
        if let Some(t) = request.tx_type {
            head.push(Item::Uint(t as u64));
        }
        head.extend([
            Item::Bytes(&request.nonce),
            Item::Bytes(&request.gas_price),
            Item::Bytes(&request.gas_limit),
            Item::Bytes(&request.to),
            Item::Bytes(&request.value),
        ]);
        let tail = [Item::Uint(request.chain_id), Item::Uint(0), Item::Uint(0)];

        let payload_length = head
            .iter()
            .chain(tail.iter())
            .map(rlp::encoded_length)
            .sum::<usize>()
            + envelope.data_field_length();

        let mut hasher = Keccak256Hasher::new();
        rlp::write_header(&mut hasher, payload_length, Kind::List);
        for item in &head {
            rlp::write(&mut hasher, item);
        }
        envelope.stream_data(session.link, &mut hasher).await?;
        for item in &tail {
            rlp::write(&mut hasher, item);
        }
        let digest = hasher.finalize();

        info!("legacy transaction digest: {}", hex::encode(digest));
        let signature = session.secure_element.sign_digest(&path, &digest)?;
        Ok(tx_signature(&signature, eip155_v(request.chain_id, &signature)))
    }
}

/// `2 * chain_id + 35 + bit`, or just the bit when that would not fit 32 bits
pub fn eip155_v(chain_id: u64, signature: &RecoverableSignature) -> u64 {
    let bit = signature.recovery_bit() as u64;
    if chain_id > limits::MAX_CHAIN_ID {
        bit
    } else {
        2 * chain_id + 35 + bit
    }
}
