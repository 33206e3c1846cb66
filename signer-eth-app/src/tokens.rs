// SPDX-License-Identifier: Apache-2.0

//! ERC-20 token definitions, keyed by (chain id, contract address)

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    pub chain_id: u64,
    pub address: [u8; 20],
    pub symbol: &'static str,
    pub decimals: u32,
}

/// Symbol shown for contracts missing from the table
pub const UNKNOWN_TOKEN_SYMBOL: &str = "UNKN";

static TOKENS: &[TokenInfo] = &[
    TokenInfo {
        chain_id: 1,
        address: [
            0xda, 0xc1, 0x7f, 0x95, 0x8d, 0x2e, 0xe5, 0x23, 0xa2, 0x20, 0x62, 0x06, 0x99, 0x45,
            0x97, 0xc1, 0x3d, 0x83, 0x1e, 0xc7,
        ],
        symbol: "USDT",
        decimals: 6,
    },
    TokenInfo {
        chain_id: 1,
        address: [
            0xa0, 0xb8, 0x69, 0x91, 0xc6, 0x21, 0x8b, 0x36, 0xc1, 0xd1, 0x9d, 0x4a, 0x2e, 0x9e,
            0xb0, 0xce, 0x36, 0x06, 0xeb, 0x48,
        ],
        symbol: "USDC",
        decimals: 6,
    },
    TokenInfo {
        chain_id: 1,
        address: [
            0x6b, 0x17, 0x54, 0x74, 0xe8, 0x90, 0x94, 0xc4, 0x4d, 0xa9, 0x8b, 0x95, 0x4e, 0xed,
            0xea, 0xc4, 0x95, 0x27, 0x1d, 0x0f,
        ],
        symbol: "DAI",
        decimals: 18,
    },
    TokenInfo {
        chain_id: 1,
        address: [
            0xc0, 0x2a, 0xaa, 0x39, 0xb2, 0x23, 0xfe, 0x8d, 0x0a, 0x0e, 0x5c, 0x4f, 0x27, 0xea,
            0xd9, 0x08, 0x3c, 0x75, 0x6c, 0xc2,
        ],
        symbol: "WETH",
        decimals: 18,
    },
    TokenInfo {
        chain_id: 1,
        address: [
            0x22, 0x60, 0xfa, 0xc5, 0xe5, 0x54, 0x2a, 0x77, 0x3a, 0xa4, 0x4f, 0xbc, 0xfe, 0xdf,
            0x7c, 0x19, 0x3b, 0xc2, 0xc5, 0x99,
        ],
        symbol: "WBTC",
        decimals: 8,
    },
    TokenInfo {
        chain_id: 1,
        address: [
            0x51, 0x49, 0x10, 0x77, 0x1a, 0xf9, 0xca, 0x65, 0x6a, 0xf8, 0x40, 0xdf, 0xf8, 0x3e,
            0x82, 0x64, 0xec, 0xf9, 0x86, 0xca,
        ],
        symbol: "LINK",
        decimals: 18,
    },
    TokenInfo {
        chain_id: 137,
        address: [
            0x3c, 0x49, 0x9c, 0x54, 0x2c, 0xef, 0x5e, 0x38, 0x11, 0xe1, 0x19, 0x2c, 0xe7, 0x0d,
            0x8c, 0xc0, 0x3d, 0x5c, 0x33, 0x59,
        ],
        symbol: "USDC",
        decimals: 6,
    },
    TokenInfo {
        chain_id: 137,
        address: [
            0xc2, 0x13, 0x2d, 0x05, 0xd3, 0x1c, 0x91, 0x4a, 0x87, 0xc6, 0x61, 0x1c, 0x10, 0x74,
            0x8a, 0xeb, 0x04, 0xb5, 0x8e, 0x8f,
        ],
        symbol: "USDT",
        decimals: 6,
    },
    TokenInfo {
        chain_id: 42161,
        address: [
            0xaf, 0x88, 0xd0, 0x65, 0xe7, 0x7c, 0x8c, 0xc2, 0x23, 0x93, 0x27, 0xc5, 0xed, 0xb3,
            0xa4, 0x32, 0x26, 0x8e, 0x58, 0x31,
        ],
        symbol: "USDC",
        decimals: 6,
    },
    TokenInfo {
        chain_id: 8453,
        address: [
            0x83, 0x35, 0x89, 0xfc, 0xd6, 0xed, 0xb6, 0xe0, 0x8f, 0x4c, 0x7c, 0x32, 0xd4, 0xf7,
            0x1b, 0x54, 0xbd, 0xa0, 0x29, 0x13,
        ],
        symbol: "USDC",
        decimals: 6,
    },
];

pub fn token_by_address(chain_id: u64, address: &[u8; 20]) -> Option<&'static TokenInfo> {
    TOKENS
        .iter()
        .find(|t| t.chain_id == chain_id && t.address == *address)
}
