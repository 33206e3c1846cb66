// SPDX-License-Identifier: Apache-2.0

//! Calldata classification
//!
//! Recognition only looks at the initial chunk, and only succeeds when that chunk
//! already holds the whole call. Byte ranges are checked against the declared
//! length before anything is decoded.

use log::debug;
use num_bigint::BigUint;

use crate::constants::{length, selector};
use crate::format::to_biguint;

/// Arguments of a Safe `execTransaction` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafeExecCall {
    pub to: [u8; 20],
    pub value: BigUint,
    pub data: Vec<u8>,
    /// 0 = call, 1 = delegatecall
    pub operation: u8,
    pub safe_tx_gas: BigUint,
    pub base_gas: BigUint,
    pub gas_price: BigUint,
    pub gas_token: [u8; 20],
    pub refund_receiver: [u8; 20],
    pub signatures: Vec<u8>,
}

impl SafeExecCall {
    pub fn is_delegatecall(&self) -> bool {
        self.operation == 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Native transfer, possibly with calldata nobody recognized
    PlainTransfer,
    Erc20Transfer {
        token_address: [u8; 20],
        recipient: [u8; 20],
        amount: BigUint,
    },
    Erc20Approve {
        token_address: [u8; 20],
        spender: [u8; 20],
        value: BigUint,
    },
    Erc721Transfer {
        token_address: [u8; 20],
        from: [u8; 20],
        to: [u8; 20],
        token_id: BigUint,
    },
    Erc1155Transfer {
        token_address: [u8; 20],
        from: [u8; 20],
        to: [u8; 20],
        token_id: BigUint,
        amount: BigUint,
        extra_data: Vec<u8>,
    },
    SafeApproveHash {
        safe_address: [u8; 20],
        hash: [u8; 32],
    },
    SafeExecTransaction {
        safe_address: [u8; 20],
        call: Box<SafeExecCall>,
    },
    /// Known selector whose arguments do not have the expected layout
    Unknown,
}

/// Variant tag of a [`Classification`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassificationKind {
    PlainTransfer,
    Erc20Transfer,
    Erc20Approve,
    Erc721Transfer,
    Erc1155Transfer,
    SafeApproveHash,
    SafeExecTransaction,
    Unknown,
}

impl Classification {
    pub fn kind(&self) -> ClassificationKind {
        match self {
            Classification::PlainTransfer => ClassificationKind::PlainTransfer,
            Classification::Erc20Transfer { .. } => ClassificationKind::Erc20Transfer,
            Classification::Erc20Approve { .. } => ClassificationKind::Erc20Approve,
            Classification::Erc721Transfer { .. } => ClassificationKind::Erc721Transfer,
            Classification::Erc1155Transfer { .. } => ClassificationKind::Erc1155Transfer,
            Classification::SafeApproveHash { .. } => ClassificationKind::SafeApproveHash,
            Classification::SafeExecTransaction { .. } => ClassificationKind::SafeExecTransaction,
            Classification::Unknown => ClassificationKind::Unknown,
        }
    }

    pub fn is_nft(&self) -> bool {
        matches!(
            self,
            Classification::Erc721Transfer { .. } | Classification::Erc1155Transfer { .. }
        )
    }
}

/// The 20-byte recipient of a transaction; a 21-byte `to` uses its trailing bytes
pub fn recipient_address(to: &[u8]) -> Option<[u8; 20]> {
    match to.len() {
        length::ADDRESS | length::PREFIXED_ADDRESS => {
            let mut address = [0u8; 20];
            address.copy_from_slice(&to[to.len() - length::ADDRESS..]);
            Some(address)
        }
        _ => None,
    }
}

fn address_at(data: &[u8], offset: usize) -> [u8; 20] {
    let mut address = [0u8; 20];
    address.copy_from_slice(&data[offset + 12..offset + length::WORD]);
    address
}

fn uint_at(data: &[u8], offset: usize) -> BigUint {
    to_biguint(&data[offset..offset + length::WORD])
}

/// A word holding a small integer, `None` when it does not fit a `u32`
fn small_uint_at(data: &[u8], offset: usize) -> Option<usize> {
    let word = data.get(offset..offset.checked_add(length::WORD)?)?;
    if word[..28].iter().any(|b| *b != 0) {
        return None;
    }
    let mut value = [0u8; 4];
    value.copy_from_slice(&word[28..]);
    Some(u32::from_be_bytes(value) as usize)
}

/// A word holding an address: 12 zero bytes then 20 address bytes
fn checked_address_at(data: &[u8], offset: usize) -> Option<[u8; 20]> {
    let word = data.get(offset..offset.checked_add(length::WORD)?)?;
    if word[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(address_at(data, offset))
}

/// ABI `bytes` at `offset` (relative to `args`): length word then payload
fn dynamic_bytes_at(args: &[u8], offset: usize) -> Option<&[u8]> {
    let size = small_uint_at(args, offset)?;
    let start = offset.checked_add(length::WORD)?;
    args.get(start..start.checked_add(size)?)
}

fn has_padded_first_word(data: &[u8], expected: &[u8; 4]) -> bool {
    data[..length::SELECTOR] == expected[..]
        && data[length::SELECTOR..length::CLASSIFIER_PREFIX]
            .iter()
            .all(|b| *b == 0)
}

/// Recognize the calldata of a transaction
///
/// `data` is the initial chunk; `data_length` is the full calldata length.
pub fn classify(to: &[u8], value: &[u8], data_length: u32, data: &[u8]) -> Classification {
    let Some(contract) = recipient_address(to) else {
        return Classification::PlainTransfer;
    };
    if !value.is_empty()
        || data.len() != data_length as usize
        || data.len() < length::CLASSIFIER_PREFIX
    {
        return Classification::PlainTransfer;
    }

    let classification = classify_call(&contract, data);
    debug!(
        "classified selector {} ({} bytes) as {:?}",
        hex::encode(&data[..length::SELECTOR]),
        data.len(),
        classification.kind()
    );
    classification
}

fn classify_call(contract: &[u8; 20], data: &[u8]) -> Classification {
    if data.len() == length::ERC20_CALL
        && (has_padded_first_word(data, &selector::ERC20_APPROVE)
            || has_padded_first_word(data, &selector::ERC20_INCREASE_ALLOWANCE))
    {
        return Classification::Erc20Approve {
            token_address: *contract,
            spender: address_at(data, 4),
            value: uint_at(data, 36),
        };
    }

    if data.len() == length::ERC20_CALL && has_padded_first_word(data, &selector::ERC20_TRANSFER) {
        return Classification::Erc20Transfer {
            token_address: *contract,
            recipient: address_at(data, 4),
            amount: uint_at(data, 36),
        };
    }

    if data.len() == length::ERC721_CALL
        && has_padded_first_word(data, &selector::ERC721_SAFE_TRANSFER_FROM)
    {
        return Classification::Erc721Transfer {
            token_address: *contract,
            from: address_at(data, 4),
            to: address_at(data, 36),
            token_id: uint_at(data, 68),
        };
    }

    if (data.len() == length::ERC1155_CALL || data.len() == length::ERC1155_CALL_WITH_DATA)
        && has_padded_first_word(data, &selector::ERC1155_SAFE_TRANSFER_FROM)
    {
        return classify_erc1155(contract, data).unwrap_or(Classification::Unknown);
    }

    if data.len() == length::SAFE_APPROVE_HASH_CALL
        && data[..length::SELECTOR] == selector::SAFE_APPROVE_HASH
    {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&data[4..36]);
        return Classification::SafeApproveHash {
            safe_address: *contract,
            hash,
        };
    }

    if (length::SAFE_EXEC_CALL_MIN..=length::SAFE_EXEC_CALL_MAX).contains(&data.len())
        && data[..length::SELECTOR] == selector::SAFE_EXEC_TRANSACTION
    {
        return match parse_exec_transaction(&data[length::SELECTOR..]) {
            Some(call) => Classification::SafeExecTransaction {
                safe_address: *contract,
                call: Box::new(call),
            },
            None => Classification::Unknown,
        };
    }

    Classification::PlainTransfer
}

/// from, to, id, amount, then `bytes data` which must sit right after the head
fn classify_erc1155(contract: &[u8; 20], data: &[u8]) -> Option<Classification> {
    const DATA_OFFSET: usize = 0xA0;

    let args = &data[length::SELECTOR..];
    if small_uint_at(args, 128)? != DATA_OFFSET {
        return None;
    }
    let extra_data = dynamic_bytes_at(args, DATA_OFFSET)?;
    let expected_len = if extra_data.is_empty() {
        length::ERC1155_CALL
    } else {
        length::ERC1155_CALL_WITH_DATA
    };
    if extra_data.len() > length::WORD || data.len() != expected_len {
        return None;
    }

    Some(Classification::Erc1155Transfer {
        token_address: *contract,
        from: address_at(data, 4),
        to: address_at(data, 36),
        token_id: uint_at(data, 68),
        amount: uint_at(data, 100),
        extra_data: extra_data.to_vec(),
    })
}

fn parse_exec_transaction(args: &[u8]) -> Option<SafeExecCall> {
    let operation = small_uint_at(args, 3 * length::WORD)?;
    if operation > 1 {
        return None;
    }
    let data_offset = small_uint_at(args, 2 * length::WORD)?;
    let signatures_offset = small_uint_at(args, 9 * length::WORD)?;

    Some(SafeExecCall {
        to: checked_address_at(args, 0)?,
        value: uint_at(args, length::WORD),
        data: dynamic_bytes_at(args, data_offset)?.to_vec(),
        operation: operation as u8,
        safe_tx_gas: uint_at(args, 4 * length::WORD),
        base_gas: uint_at(args, 5 * length::WORD),
        gas_price: uint_at(args, 6 * length::WORD),
        gas_token: checked_address_at(args, 7 * length::WORD)?,
        refund_receiver: checked_address_at(args, 8 * length::WORD)?,
        signatures: dynamic_bytes_at(args, signatures_offset)?.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::max_uint256;
    use crate::test_utils::{address, exec_transaction_calldata, word};

    fn erc20_call(selector: [u8; 4], target: [u8; 20], amount: &BigUint) -> Vec<u8> {
        let mut data = selector.to_vec();
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&target);
        data.extend_from_slice(&word(amount));
        data
    }

    #[test]
    fn test_erc20_transfer() {
        let usdt = address("0xdAC17F958D2ee523a2206206994597C13D831ec7");
        let recipient = address("0x742d35cc6634c0532925a3b844bc9e7595f0beb0");
        let data = erc20_call(selector::ERC20_TRANSFER, recipient, &BigUint::from(100_000_000u64));

        assert_eq!(
            classify(&usdt, &[], data.len() as u32, &data),
            Classification::Erc20Transfer {
                token_address: usdt,
                recipient,
                amount: BigUint::from(100_000_000u64),
            }
        );
    }

    #[test]
    fn test_erc20_approve_both_selectors() {
        let token = [0x11; 20];
        let spender = [0x22; 20];
        for selector in [selector::ERC20_APPROVE, selector::ERC20_INCREASE_ALLOWANCE] {
            let data = erc20_call(selector, spender, &max_uint256());
            assert_eq!(
                classify(&token, &[], 68, &data),
                Classification::Erc20Approve {
                    token_address: token,
                    spender,
                    value: max_uint256(),
                }
            );
        }
    }

    #[test]
    fn test_preconditions_fall_back_to_plain_transfer() {
        let data = erc20_call(selector::ERC20_TRANSFER, [0x22; 20], &BigUint::from(1u8));

        // native value attached
        assert_eq!(classify(&[0x11; 20], &[1], 68, &data), Classification::PlainTransfer);
        // streamed calldata
        assert_eq!(classify(&[0x11; 20], &[], 2000, &data), Classification::PlainTransfer);
        // contract creation
        assert_eq!(classify(&[], &[], 68, &data), Classification::PlainTransfer);
        // wrong length
        assert_eq!(
            classify(&[0x11; 20], &[], 67, &data[..67]),
            Classification::PlainTransfer
        );
        // dirty address padding
        let mut dirty = data.clone();
        dirty[5] = 1;
        assert_eq!(classify(&[0x11; 20], &[], 68, &dirty), Classification::PlainTransfer);
        // unknown selector
        let unknown = vec![0xde, 0xad, 0xbe, 0xef].into_iter().chain([0u8; 196]).collect::<Vec<_>>();
        assert_eq!(classify(&[0x11; 20], &[], 200, &unknown), Classification::PlainTransfer);
    }

    #[test]
    fn test_prefixed_recipient() {
        let mut to = vec![0x01];
        to.extend_from_slice(&[0x11; 20]);
        let data = erc20_call(selector::ERC20_TRANSFER, [0x22; 20], &BigUint::from(5u8));

        match classify(&to, &[], 68, &data) {
            Classification::Erc20Transfer { token_address, .. } => {
                assert_eq!(token_address, [0x11; 20])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_erc721() {
        let mut data = selector::ERC721_SAFE_TRANSFER_FROM.to_vec();
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&[0xAA; 20]);
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&[0xBB; 20]);
        data.extend_from_slice(&word(&BigUint::from(7u8)));

        assert_eq!(
            classify(&[0x11; 20], &[], 100, &data),
            Classification::Erc721Transfer {
                token_address: [0x11; 20],
                from: [0xAA; 20],
                to: [0xBB; 20],
                token_id: BigUint::from(7u8),
            }
        );
    }

    fn erc1155_call(offset: u8, extra: &[u8]) -> Vec<u8> {
        let mut data = selector::ERC1155_SAFE_TRANSFER_FROM.to_vec();
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&[0xAA; 20]);
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&[0xBB; 20]);
        data.extend_from_slice(&word(&BigUint::from(3u8)));
        data.extend_from_slice(&word(&BigUint::from(10u8)));
        data.extend_from_slice(&word(&BigUint::from(offset)));
        data.extend_from_slice(&word(&BigUint::from(extra.len())));
        if !extra.is_empty() {
            let mut padded = [0u8; 32];
            padded[..extra.len()].copy_from_slice(extra);
            data.extend_from_slice(&padded);
        }
        data
    }

    #[test]
    fn test_erc1155() {
        let data = erc1155_call(0xA0, &[]);
        assert_eq!(data.len(), 196);
        assert_eq!(
            classify(&[0x11; 20], &[], 196, &data).kind(),
            ClassificationKind::Erc1155Transfer
        );

        let data = erc1155_call(0xA0, &[0xCA, 0xFE]);
        assert_eq!(data.len(), 228);
        match classify(&[0x11; 20], &[], 228, &data) {
            Classification::Erc1155Transfer {
                amount, extra_data, ..
            } => {
                assert_eq!(amount, BigUint::from(10u8));
                assert_eq!(extra_data, vec![0xCA, 0xFE]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_erc1155_wrong_offset_is_unknown() {
        let data = erc1155_call(0xC0, &[]);
        assert_eq!(classify(&[0x11; 20], &[], 196, &data), Classification::Unknown);
    }

    #[test]
    fn test_safe_approve_hash() {
        let mut data = selector::SAFE_APPROVE_HASH.to_vec();
        data.extend_from_slice(&[0x5A; 32]);

        assert_eq!(
            classify(&[0x11; 20], &[], 36, &data),
            Classification::SafeApproveHash {
                safe_address: [0x11; 20],
                hash: [0x5A; 32],
            }
        );
    }

    #[test]
    fn test_safe_exec_transaction() {
        let inner = erc20_call(selector::ERC20_TRANSFER, [0x22; 20], &BigUint::from(9u8));
        let data = exec_transaction_calldata([0x33; 20], &BigUint::from(0u8), &inner, 1);
        assert!(data.len() >= 437);

        match classify(&[0x11; 20], &[], data.len() as u32, &data) {
            Classification::SafeExecTransaction { safe_address, call } => {
                assert_eq!(safe_address, [0x11; 20]);
                assert_eq!(call.to, [0x33; 20]);
                assert_eq!(call.data, inner);
                assert!(call.is_delegatecall());
                assert_eq!(call.signatures.len(), 65);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_safe_exec_with_bad_offset_is_unknown() {
        let mut data = exec_transaction_calldata([0x33; 20], &BigUint::from(0u8), &[], 0);
        // data offset pointing past the end
        data[4 + 64 + 30] = 0xFF;
        assert_eq!(
            classify(&[0x11; 20], &[], data.len() as u32, &data),
            Classification::Unknown
        );
    }
}
