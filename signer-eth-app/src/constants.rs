// SPDX-License-Identifier: Apache-2.0

//! Selectors, sizes and limits of the signing pipeline

/// Function selectors recognized in calldata
pub mod selector {
    /// transfer(address,uint256)
    pub const ERC20_TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
    /// approve(address,uint256)
    pub const ERC20_APPROVE: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
    /// increaseAllowance(address,uint256)
    pub const ERC20_INCREASE_ALLOWANCE: [u8; 4] = [0x39, 0x50, 0x93, 0x51];
    /// safeTransferFrom(address,address,uint256)
    pub const ERC721_SAFE_TRANSFER_FROM: [u8; 4] = [0x42, 0x84, 0x2e, 0x0e];
    /// safeTransferFrom(address,address,uint256,uint256,bytes)
    pub const ERC1155_SAFE_TRANSFER_FROM: [u8; 4] = [0xf2, 0x42, 0x43, 0x2a];
    /// approveHash(bytes32)
    pub const SAFE_APPROVE_HASH: [u8; 4] = [0xd4, 0xd9, 0xbd, 0xcd];
    /// execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)
    pub const SAFE_EXEC_TRANSACTION: [u8; 4] = [0x6a, 0x76, 0x12, 0x02];
}

/// Data length constants
pub mod length {
    /// Largest calldata chunk exchanged with the host
    pub const MAX_CHUNK_SIZE: usize = 1024;
    /// Largest calldata accepted in a transaction
    pub const MAX_DATA_LENGTH: u32 = 16_000_000;
    pub const SELECTOR: usize = 4;
    pub const ADDRESS: usize = 20;
    /// Address preceded by a chain specific byte
    pub const PREFIXED_ADDRESS: usize = 21;
    pub const WORD: usize = 32;
    pub const MAX_VALUE: usize = 32;
    /// Combined length of the gas price (or fee caps) and gas limit
    pub const MAX_GAS_FIELDS: usize = 30;
    /// Selector and two words
    pub const ERC20_CALL: usize = 68;
    pub const ERC721_CALL: usize = 100;
    /// ERC-1155 transfer with empty extra data
    pub const ERC1155_CALL: usize = 196;
    /// ERC-1155 transfer with at most one word of extra data
    pub const ERC1155_CALL_WITH_DATA: usize = 228;
    pub const SAFE_APPROVE_HASH_CALL: usize = 36;
    pub const SAFE_EXEC_CALL_MIN: usize = 437;
    pub const SAFE_EXEC_CALL_MAX: usize = 1024;
    /// Bytes the classifier looks at: selector plus the zero padding of the first word
    pub const CLASSIFIER_PREFIX: usize = 16;
}

/// Policy limits
pub mod limits {
    /// Largest chain id whose EIP-155 `v` fits into 32 bits
    pub const MAX_CHAIN_ID: u64 = (0xFFFF_FFFF - 35) / 2;
    /// Struct and array nesting accepted in typed data
    pub const EIP712_MAX_DEPTH: usize = 5;
    /// Hardened account indices accepted by the path checks
    pub const MAX_ACCOUNT: u32 = 1 << 20;
    pub const MAX_ADDRESS_INDEX: u32 = 1_000_000;
    /// Native amounts below this many wei are shown in wei
    pub const MIN_GWEI_DISPLAY: u64 = 1_000_000_000;
}

/// Envelope markers
pub mod tx_type {
    /// Wanchain style legacy envelopes
    pub const LEGACY_TYPE_1: u32 = 1;
    pub const LEGACY_TYPE_6: u32 = 6;
    /// EIP-1559 typed envelope byte
    pub const EIP1559: u8 = 0x02;
}

/// Precomputed EIP-712 type hashes
pub mod typehash {
    /// keccak256("EIP712Domain(uint256 chainId,address verifyingContract)")
    pub const SAFE_DOMAIN: [u8; 32] = [
        0x47, 0xe7, 0x95, 0x34, 0xa2, 0x45, 0x95, 0x2e,
        0x8b, 0x16, 0x89, 0x3a, 0x33, 0x6b, 0x85, 0xa3,
        0xd9, 0xea, 0x9f, 0xa8, 0xc5, 0x73, 0xf3, 0xd8,
        0x03, 0xaf, 0xb9, 0x2a, 0x79, 0x46, 0x92, 0x18,
    ];

    /// keccak256 of the `SafeTx(...)` type string
    pub const SAFE_TX: [u8; 32] = [
        0xbb, 0x83, 0x10, 0xd4, 0x86, 0x36, 0x8d, 0xb6,
        0xbd, 0x6f, 0x84, 0x94, 0x02, 0xfd, 0xd7, 0x3a,
        0xd5, 0x3d, 0x31, 0x6b, 0x5a, 0x4b, 0x26, 0x44,
        0xad, 0x6e, 0xfe, 0x0f, 0x94, 0x12, 0x86, 0xd8,
    ];
}

/// Prefix of every EIP-712 digest
pub const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];
