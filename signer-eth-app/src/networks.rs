// SPDX-License-Identifier: Apache-2.0

//! Built-in network definitions

/// Symbol shown for chains the device does not know
pub const UNKNOWN_SYMBOL: &str = "UNKN";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NetworkInfo {
    pub chain_id: u64,
    /// SLIP-44 coin type expected in derivation paths
    pub slip44: u32,
    pub symbol: &'static str,
    pub name: &'static str,
    pub testnet: bool,
    pub known: bool,
}

const fn network(
    chain_id: u64,
    slip44: u32,
    symbol: &'static str,
    name: &'static str,
    testnet: bool,
) -> NetworkInfo {
    NetworkInfo {
        chain_id,
        slip44,
        symbol,
        name,
        testnet,
        known: true,
    }
}

static NETWORKS: &[NetworkInfo] = &[
    network(1, 60, "ETH", "Ethereum", false),
    network(11155111, 1, "tSEP", "Sepolia", true),
    network(17000, 1, "tHOL", "Holesky", true),
    network(10, 614, "ETH", "Optimism", false),
    network(56, 714, "BNB", "BNB Smart Chain", false),
    network(61, 61, "ETC", "Ethereum Classic", false),
    network(100, 700, "xDAI", "Gnosis", false),
    network(137, 966, "POL", "Polygon", false),
    network(8453, 8453, "ETH", "Base", false),
    network(42161, 9001, "ETH", "Arbitrum One", false),
    network(43114, 9000, "AVAX", "Avalanche C-Chain", false),
    network(30, 137, "RBTC", "RSK", false),
    network(31, 37310, "tRBTC", "RSK Testnet", true),
];

/// Look up a chain; unknown chains get the `UNKN` symbol and slip44 60
pub fn by_chain_id(chain_id: u64) -> NetworkInfo {
    NETWORKS
        .iter()
        .find(|n| n.chain_id == chain_id)
        .copied()
        .unwrap_or(NetworkInfo {
            chain_id,
            slip44: 60,
            symbol: UNKNOWN_SYMBOL,
            name: "Unknown network",
            testnet: false,
            known: false,
        })
}

/// First network using the coin type of a derivation path, Ethereum otherwise
///
/// Typed data carries no chain up front, so its path checks go by coin type.
pub fn by_slip44(slip44: u32) -> NetworkInfo {
    NETWORKS
        .iter()
        .find(|n| n.slip44 == slip44)
        .copied()
        .unwrap_or(NETWORKS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let polygon = by_chain_id(137);
        assert_eq!(polygon.symbol, "POL");
        assert_eq!(polygon.slip44, 966);
        assert!(polygon.known);

        let unknown = by_chain_id(424242);
        assert_eq!(unknown.symbol, UNKNOWN_SYMBOL);
        assert_eq!(unknown.slip44, 60);
        assert!(!unknown.known);
    }

    #[test]
    fn test_slip44_lookup() {
        assert_eq!(by_slip44(966).chain_id, 137);
        assert!(by_slip44(1).testnet);
        assert_eq!(by_slip44(12345).chain_id, 1);
    }
}
