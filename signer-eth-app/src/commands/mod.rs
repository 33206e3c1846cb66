// SPDX-License-Identifier: Apache-2.0

//! Signing commands, one module per request

pub mod eip712;
pub mod sign_safe_tx;
pub mod sign_tx;
pub mod sign_tx_eip1559;

pub use eip712::*;
pub use sign_safe_tx::*;
pub use sign_tx::*;
pub use sign_tx_eip1559::*;

use evm_signer_device_base::{DerivationPath, RecoverableSignature, SecureElement, Ui};
use evm_signer_transport::{HostLink, TxSignature};
use log::debug;

use crate::approval::{review_transaction, FeeSummary, TxReview};
use crate::chunks::ChunkedReader;
use crate::classify::{classify, recipient_address};
use crate::constants::length;
use crate::errors::{EthSignError, EthSignResult};
use crate::format::to_biguint;
use crate::keccak::Keccak256Hasher;
use crate::networks;
use crate::paths::check_path;
use crate::rlp::{streamed_string_length, write_streamed_header};
use crate::Session;

/// Fields shared by legacy and EIP-1559 transactions
pub(crate) struct TxEnvelope<'a> {
    pub address_n: &'a [u32],
    pub to: &'a [u8],
    pub value: &'a [u8],
    pub data_initial_chunk: &'a [u8],
    pub data_length: u32,
    pub chain_id: u64,
}

impl TxEnvelope<'_> {
    pub(crate) fn validate<E: std::error::Error>(&self) -> EthSignResult<(), E> {
        validate_calldata(self.data_initial_chunk, self.data_length)?;

        match self.to.len() {
            0 if self.data_length == 0 => {
                return Err(EthSignError::Validation(
                    "Contract creation without data".to_string(),
                ))
            }
            0 | length::ADDRESS | length::PREFIXED_ADDRESS => {}
            other => {
                return Err(EthSignError::Validation(format!(
                    "Invalid recipient length {}",
                    other
                )))
            }
        }
        if self.value.len() > length::MAX_VALUE {
            return Err(EthSignError::Validation(format!(
                "Value is {} bytes long",
                self.value.len()
            )));
        }
        if self.chain_id == 0 {
            return Err(EthSignError::Validation("Chain ID out of bounds".to_string()));
        }
        Ok(())
    }

    /// Check the path, classify the call and walk the user through it
    pub(crate) async fn approve<H, U, S>(
        &self,
        session: &Session<'_, H, U, S>,
        fee: FeeSummary,
    ) -> EthSignResult<DerivationPath, H::Error>
    where
        H: HostLink + Sync,
        H::Error: std::error::Error + Send,
        U: Ui + Sync,
        S: SecureElement + Sync,
    {
        let path = DerivationPath::try_from(self.address_n)?;
        let network = networks::by_chain_id(self.chain_id);
        check_path(session.ui, session.settings, &path, &network).await?;

        let classification = classify(
            self.to,
            self.value,
            self.data_length,
            self.data_initial_chunk,
        );
        let review = TxReview {
            network,
            to: recipient_address(self.to),
            value: to_biguint(self.value),
            classification: &classification,
            data_length: self.data_length,
            data_initial_chunk: self.data_initial_chunk,
            fee,
        };
        review_transaction(session.ui, session.settings, &review).await?;
        Ok(path)
    }

    /// Encoded size of the calldata item
    pub(crate) fn data_field_length(&self) -> usize {
        streamed_string_length(
            self.data_length as usize,
            self.data_initial_chunk.first().copied(),
        )
    }

    /// Hash the calldata item, pulling whatever the request did not carry
    pub(crate) async fn stream_data<H>(
        &self,
        link: &H,
        hasher: &mut Keccak256Hasher,
    ) -> EthSignResult<(), H::Error>
    where
        H: HostLink + Sync,
        H::Error: std::error::Error + Send,
    {
        write_streamed_header(
            hasher,
            self.data_length as usize,
            self.data_initial_chunk.first().copied(),
        );
        hasher.absorb(self.data_initial_chunk);
        ChunkedReader::new(link, self.data_length, self.data_initial_chunk.len())
            .stream_into(hasher)
            .await
    }
}

pub(crate) fn validate_calldata<E: std::error::Error>(
    data_initial_chunk: &[u8],
    data_length: u32,
) -> EthSignResult<(), E> {
    if data_length > length::MAX_DATA_LENGTH {
        return Err(EthSignError::Validation(format!(
            "Data length {} exceeds limit",
            data_length
        )));
    }
    if data_length > 0 && data_initial_chunk.is_empty() {
        return Err(EthSignError::Validation(
            "Data length provided, but no initial chunk".to_string(),
        ));
    }
    if data_initial_chunk.len() > length::MAX_CHUNK_SIZE {
        return Err(EthSignError::Validation(
            "Initial data chunk too large".to_string(),
        ));
    }
    if data_initial_chunk.len() > data_length as usize {
        return Err(EthSignError::Validation(
            "Invalid size of initial chunk".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_gas_fields<E: std::error::Error>(fields: &[&[u8]]) -> EthSignResult<(), E> {
    let total: usize = fields.iter().map(|f| f.len()).sum();
    if total > length::MAX_GAS_FIELDS {
        return Err(EthSignError::Validation("Fee overflow".to_string()));
    }
    Ok(())
}

/// `r`, `s` and the given `v` of a transaction signature
pub(crate) fn tx_signature(signature: &RecoverableSignature, v: u64) -> TxSignature {
    debug!("recovery bit {}, v {}", signature.recovery_bit(), v);
    TxSignature {
        v,
        r: signature.r(),
        s: signature.s(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn envelope<'a>(to: &'a [u8], data: &'a [u8], data_length: u32) -> TxEnvelope<'a> {
        TxEnvelope {
            address_n: &[],
            to,
            value: &[],
            data_initial_chunk: data,
            data_length,
            chain_id: 1,
        }
    }

    fn invalid(envelope: TxEnvelope<'_>) -> bool {
        matches!(
            envelope.validate::<io::Error>(),
            Err(EthSignError::Validation(_))
        )
    }

    #[test]
    fn test_envelope_validation() {
        let to = [0x35; 20];
        assert!(envelope(&to, &[], 0).validate::<io::Error>().is_ok());
        assert!(envelope(&[0x01; 21], &[], 0).validate::<io::Error>().is_ok());
        assert!(envelope(&[], &[0x60], 1).validate::<io::Error>().is_ok());

        assert!(invalid(envelope(&[], &[], 0)));
        assert!(invalid(envelope(&[0x01; 19], &[], 0)));
        assert!(invalid(envelope(&to, &[], 10)));
        assert!(invalid(envelope(&to, &[1, 2, 3], 2)));
        assert!(invalid(envelope(&to, &[0; 1025], 2000)));
        assert!(invalid(envelope(&to, &[1], 16_000_001)));

        let mut zero_chain = envelope(&to, &[], 0);
        zero_chain.chain_id = 0;
        assert!(invalid(zero_chain));

        let mut wide_value = envelope(&to, &[], 0);
        wide_value.value = &[0xFF; 33];
        assert!(invalid(wide_value));
    }

    #[test]
    fn test_gas_fields() {
        assert!(validate_gas_fields::<io::Error>(&[&[0xFF; 15], &[0xFF; 15]]).is_ok());
        assert!(validate_gas_fields::<io::Error>(&[&[0xFF; 15], &[0xFF; 16]]).is_err());
    }
}
