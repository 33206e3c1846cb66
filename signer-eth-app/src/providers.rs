// SPDX-License-Identifier: Apache-2.0

//! Well-known spenders shown by name on approval screens

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProviderInfo {
    pub chain_ids: &'static [u64],
    pub address: [u8; 20],
    pub name: &'static str,
}

const EVM_MAJOR: &[u64] = &[1, 10, 56, 137, 8453, 42161];

static PROVIDERS: &[ProviderInfo] = &[
    // AggregationRouterV5
    ProviderInfo {
        chain_ids: EVM_MAJOR,
        address: [
            0x11, 0x11, 0x11, 0x12, 0x54, 0xee, 0xb2, 0x54, 0x77, 0xb6, 0x8f, 0xb8, 0x5e, 0xd9,
            0x29, 0xf7, 0x3a, 0x96, 0x05, 0x82,
        ],
        name: "1inch",
    },
    // AggregationRouterV6
    ProviderInfo {
        chain_ids: EVM_MAJOR,
        address: [
            0x11, 0x11, 0x11, 0x12, 0x54, 0x21, 0xca, 0x6d, 0xc4, 0x52, 0xd2, 0x89, 0x31, 0x42,
            0x80, 0xa0, 0xf8, 0x84, 0x2a, 0x65,
        ],
        name: "1inch",
    },
    ProviderInfo {
        chain_ids: &[1],
        address: [
            0xde, 0xf1, 0xc0, 0xde, 0xd9, 0xbe, 0xc7, 0xf1, 0xa1, 0x67, 0x08, 0x19, 0x83, 0x32,
            0x40, 0xf0, 0x27, 0xb2, 0x5e, 0xff,
        ],
        name: "0x",
    },
    // GPv2VaultRelayer
    ProviderInfo {
        chain_ids: &[1, 100, 42161],
        address: [
            0xc9, 0x2e, 0x8b, 0xdf, 0x79, 0xf0, 0x50, 0x7f, 0x65, 0xa3, 0x92, 0xb0, 0xab, 0x46,
            0x67, 0x71, 0x6b, 0xfe, 0x01, 0x10,
        ],
        name: "CoW Swap",
    },
    ProviderInfo {
        chain_ids: &[1],
        address: [
            0x40, 0xaa, 0x95, 0x8d, 0xd8, 0x7f, 0xc8, 0x30, 0x5b, 0x97, 0xf2, 0xba, 0x92, 0x2c,
            0xdd, 0xca, 0x37, 0x4b, 0xcd, 0x7f,
        ],
        name: "OKX",
    },
    ProviderInfo {
        chain_ids: &[1],
        address: [
            0x3a, 0x23, 0xf9, 0x43, 0x18, 0x14, 0x08, 0xea, 0xc4, 0x24, 0x11, 0x6a, 0xf7, 0xb7,
            0x79, 0x0c, 0x94, 0xcb, 0x97, 0xa5,
        ],
        name: "Socket",
    },
    // Permit2
    ProviderInfo {
        chain_ids: EVM_MAJOR,
        address: [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x22, 0xd4, 0x73, 0x03, 0x0f, 0x11, 0x6d, 0xde, 0xe9,
            0xf6, 0xb4, 0x3a, 0xc7, 0x8b, 0xa3,
        ],
        name: "Uniswap",
    },
    // UniversalRouter
    ProviderInfo {
        chain_ids: &[1],
        address: [
            0x3f, 0xc9, 0x1a, 0x3a, 0xfd, 0x70, 0x39, 0x5c, 0xd4, 0x96, 0xc6, 0x47, 0xd5, 0xa6,
            0xcc, 0x9d, 0x4b, 0x2b, 0x7f, 0xad,
        ],
        name: "Uniswap",
    },
];

pub fn provider_by_address(chain_id: u64, address: &[u8; 20]) -> Option<&'static ProviderInfo> {
    PROVIDERS
        .iter()
        .find(|p| p.address == *address && p.chain_ids.contains(&chain_id))
}
