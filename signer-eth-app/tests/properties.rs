// SPDX-License-Identifier: Apache-2.0

//! Properties of the codec, the hashing pipeline and the classifier

use std::collections::BTreeSet;

use evm_signer_device_base::RecoverableSignature;
use evm_signer_eth_app::chunks::ChunkedReader;
use evm_signer_eth_app::classify::classify;
use evm_signer_eth_app::constants::{limits, selector};
use evm_signer_eth_app::eip712::encoding::encode_type;
use evm_signer_eth_app::eip712::Schema;
use evm_signer_eth_app::eip155_v;
use evm_signer_eth_app::keccak::{keccak256, Keccak256Hasher};
use evm_signer_eth_app::rlp::{decode, encode, Item};
use evm_signer_transport::{FieldTypeSpec, HostAnswer, StructMember};
use evm_signer_transport_script::ScriptedHost;
use futures::executor::block_on;
use num_bigint::BigUint;
use proptest::prelude::*;

proptest! {
    #[test]
    fn rlp_strings_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..=1024)) {
        let encoded = encode(&Item::Bytes(&bytes));
        prop_assert_eq!(decode(&encoded).unwrap().as_bytes().unwrap(), bytes.as_slice());
    }

    #[test]
    fn rlp_integers_round_trip(word in any::<[u8; 32]>()) {
        let encoded = encode(&Item::UintBytes(&word));
        let decoded = decode(&encoded).unwrap().to_biguint().unwrap();
        prop_assert_eq!(decoded, BigUint::from_bytes_be(&word));
    }

    #[test]
    fn chunked_hash_matches_one_shot(
        data in prop::collection::vec(any::<u8>(), 0..3000),
        sizes in prop::collection::vec(1usize..=1024, 1..16),
    ) {
        let mut chunks = Vec::new();
        let mut offset = 0;
        for size in sizes.iter().cycle() {
            if offset >= data.len() {
                break;
            }
            let end = (offset + size).min(data.len());
            chunks.push(data[offset..end].to_vec());
            offset = end;
        }

        let first = chunks.first().cloned().unwrap_or_default();
        let host = ScriptedHost::with_answers(
            chunks.iter().skip(1).map(|chunk| HostAnswer::TxAck { data_chunk: chunk.clone() }),
        );
        let mut hasher = Keccak256Hasher::new();
        hasher.absorb(&first);
        block_on(ChunkedReader::new(&host, data.len() as u32, first.len()).stream_into(&mut hasher))
            .unwrap();

        prop_assert_eq!(hasher.finalize(), keccak256(&data));
        prop_assert_eq!(host.pending_answers(), 0);
    }

    #[test]
    fn classification_depends_on_prefix_and_lengths(
        selector_index in 0usize..6,
        random_selector in any::<[u8; 4]>(),
        zero_padding in any::<bool>(),
        padding in any::<[u8; 12]>(),
        length_index in 0usize..4,
        random_length in 16usize..400,
        with_value in any::<bool>(),
        tails in (prop::collection::vec(any::<u8>(), 400), prop::collection::vec(any::<u8>(), 400)),
    ) {
        let selectors = [
            selector::ERC20_TRANSFER,
            selector::ERC20_APPROVE,
            selector::ERC20_INCREASE_ALLOWANCE,
            selector::ERC721_SAFE_TRANSFER_FROM,
            selector::SAFE_APPROVE_HASH,
            random_selector,
        ];
        let length = [36, 68, 100, random_length][length_index];

        let mut prefix = selectors[selector_index].to_vec();
        prefix.extend_from_slice(if zero_padding { &[0u8; 12] } else { &padding });

        let calldata = |tail: &[u8]| {
            let mut data = prefix.clone();
            data.extend_from_slice(&tail[..length - 16]);
            data
        };
        let (first, second) = (calldata(&tails.0), calldata(&tails.1));
        let value: &[u8] = if with_value { &[0x01] } else { &[] };

        prop_assume!(
            first[..4] != selector::ERC1155_SAFE_TRANSFER_FROM
                && first[..4] != selector::SAFE_EXEC_TRANSACTION
        );
        prop_assert_eq!(
            classify(&[0x35; 20], value, length as u32, &first).kind(),
            classify(&[0x35; 20], value, length as u32, &second).kind()
        );
    }

    #[test]
    fn eip155_v_encoding(chain_id in 1u64..u64::MAX, bit in 0u8..=1) {
        let signature = RecoverableSignature::from_parts(bit, [0x01; 32], [0x02; 32]).unwrap();
        let v = eip155_v(chain_id, &signature);
        if chain_id <= limits::MAX_CHAIN_ID {
            prop_assert_eq!(v, 2 * chain_id + 35 + bit as u64);
        } else {
            prop_assert_eq!(v, bit as u64);
        }
    }

    #[test]
    fn encoded_type_lists_references_sorted_once(
        count in 1usize..8,
        edges in prop::collection::vec((0usize..8, 0usize..8, any::<bool>()), 0..16),
        roots in prop::collection::vec((0usize..8, any::<bool>()), 1..6),
    ) {
        const NAMES: [&str; 8] = ["Zulu", "Mike", "Alpha", "Kilo", "Bravo", "Echo", "Yankee", "Delta"];

        let member = |index: usize, target: usize, array: bool| {
            let spec = FieldTypeSpec::structure(NAMES[target]);
            let spec = if array { FieldTypeSpec::array(spec, None) } else { spec };
            StructMember::new(format!("field{}", index), spec)
        };
        let spelled = |index: usize, target: usize, array: bool| {
            format!("{}{} field{}", NAMES[target], if array { "[]" } else { "" }, index)
        };

        let mut schema = Schema::new();
        let mut definitions = Vec::new();
        let mut children = vec![Vec::new(); count];
        for (from, name) in NAMES.iter().enumerate().take(count) {
            let mut members = vec![StructMember::new("value", FieldTypeSpec::uint(32))];
            let mut text = vec!["uint256 value".to_string()];
            let targets = edges.iter().filter(|(f, t, _)| *f == from && *f < *t && *t < count);
            for (index, (_, to, array)) in targets.enumerate() {
                members.push(member(index, *to, *array));
                text.push(spelled(index, *to, *array));
                children[from].push(*to);
            }
            schema.insert(name, &members).unwrap();
            definitions.push(format!("{}({})", name, text.join(",")));
        }

        let roots: Vec<_> = roots.iter().map(|(t, a)| (t % count, *a)).collect();
        let members: Vec<_> = roots.iter().enumerate().map(|(i, (t, a))| member(i, *t, *a)).collect();
        schema.insert("Root", &members).unwrap();

        let mut reachable = BTreeSet::new();
        let mut pending: Vec<usize> = roots.iter().map(|(t, _)| *t).collect();
        while let Some(next) = pending.pop() {
            if reachable.insert(NAMES[next]) {
                pending.extend(children[next].iter().copied());
            }
        }

        let root_text: Vec<_> = roots.iter().enumerate().map(|(i, (t, a))| spelled(i, *t, *a)).collect();
        let mut expected = format!("Root({})", root_text.join(","));
        for name in &reachable {
            let index = NAMES.iter().position(|n| n == name).unwrap();
            expected.push_str(&definitions[index]);
        }

        prop_assert_eq!(encode_type(&schema, "Root").unwrap(), expected);
    }
}
