// SPDX-License-Identifier: Apache-2.0

//! Address and amount rendering
//!
//! Pure functions over their inputs; nothing here knows about screens.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::constants::limits;
use crate::keccak::keccak256;
use crate::networks::NetworkInfo;

/// Chains whose checksum commits to the chain id (EIP-1191)
const EIP1191_CHAINS: [u64; 2] = [30, 31];

/// EIP-55 mixed case address, EIP-1191 on the chains that use it
pub fn checksum_address(address: &[u8; 20], chain_id: u64) -> String {
    let lower = hex::encode(address);
    let hash = if EIP1191_CHAINS.contains(&chain_id) {
        keccak256(format!("{}0x{}", chain_id, lower).as_bytes())
    } else {
        keccak256(lower.as_bytes())
    };

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn format_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Big-endian bytes as an unsigned integer; empty is zero
pub fn to_biguint(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// 2^256 - 1
pub fn max_uint256() -> BigUint {
    (BigUint::one() << 256u32) - BigUint::one()
}

/// `value / 10^decimals` with the fraction's trailing zeros trimmed
pub fn format_amount(value: &BigUint, decimals: u32) -> String {
    let digits = value.to_str_radix(10);
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let (integer, fraction) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        let padding = "0".repeat(decimals - digits.len());
        ("0".to_string(), format!("{}{}", padding, digits))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer
    } else {
        format!("{}.{}", integer, fraction)
    }
}

pub fn format_token_amount(value: &BigUint, decimals: u32, symbol: &str) -> String {
    format!("{} {}", format_amount(value, decimals), symbol)
}

/// Native currency amount; dust below one gwei is shown in wei
pub fn format_native_amount(value: &BigUint, network: &NetworkInfo) -> String {
    if !value.is_zero() && *value < BigUint::from(limits::MIN_GWEI_DISPLAY) {
        format!("{} Wei {}", value, network.symbol)
    } else {
        format_token_amount(value, 18, network.symbol)
    }
}

/// Per-gas price in Gwei
pub fn format_gwei(value: &BigUint) -> String {
    format!("{} Gwei", format_amount(value, 9))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks;

    fn address(text: &str) -> [u8; 20] {
        let mut out = [0u8; 20];
        out.copy_from_slice(&hex::decode(text.trim_start_matches("0x")).unwrap());
        out
    }

    #[test]
    fn test_eip55() {
        assert_eq!(
            checksum_address(&address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"), 1),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        assert_eq!(
            checksum_address(&address("0xdac17f958d2ee523a2206206994597c13d831ec7"), 1),
            "0xdAC17F958D2ee523a2206206994597C13D831ec7"
        );
        assert_eq!(
            checksum_address(&address("0x742d35cc6634c0532925a3b844bc9e7595f0beb0"), 137),
            "0x742D35CC6634c0532925A3b844BC9E7595F0BEb0"
        );
    }

    #[test]
    fn test_eip1191() {
        let raw = address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
        assert_eq!(
            checksum_address(&raw, 30),
            "0x5aaEB6053f3e94c9b9a09f33669435E7ef1bEAeD"
        );
        assert_eq!(
            checksum_address(&raw, 31),
            "0x5aAeb6053F3e94c9b9A09F33669435E7EF1BEaEd"
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(&BigUint::from(100_000_000u64), 6), "100");
        assert_eq!(format_amount(&BigUint::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_amount(&BigUint::from(1u64), 6), "0.000001");
        assert_eq!(format_amount(&BigUint::zero(), 18), "0");
        assert_eq!(format_amount(&BigUint::from(42u64), 0), "42");
        assert_eq!(
            format_amount(&max_uint256(), 18),
            "115792089237316195423570985008687907853269984665640564039457.584007913129639935"
        );
    }

    #[test]
    fn test_native_amount() {
        let ethereum = networks::by_chain_id(1);
        assert_eq!(
            format_native_amount(&BigUint::from(10u64).pow(18), &ethereum),
            "1 ETH"
        );
        assert_eq!(format_native_amount(&BigUint::from(12345u64), &ethereum), "12345 Wei ETH");
        assert_eq!(format_native_amount(&BigUint::zero(), &ethereum), "0 ETH");
        assert_eq!(
            format_native_amount(&BigUint::from(1u64), &networks::by_chain_id(999_999_999)),
            "1 Wei UNKN"
        );
        assert_eq!(format_gwei(&BigUint::from(20_000_000_000u64)), "20 Gwei");
    }
}
