// SPDX-License-Identifier: Apache-2.0

//! Streaming Keccak-256 (the pre-NIST padding Ethereum uses, not SHA3-256)

use sha3::{Digest, Keccak256};

use crate::rlp::Sink;

/// Single-pass hasher; start a new one for every digest
#[derive(Clone, Default)]
pub struct Keccak256Hasher {
    inner: Keccak256,
}

impl Keccak256Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    pub fn finalize(self) -> [u8; 32] {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&self.inner.finalize());
        digest
    }
}

impl Sink for Keccak256Hasher {
    fn absorb(&mut self, bytes: &[u8]) {
        Keccak256Hasher::absorb(self, bytes);
    }
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256Hasher::new();
    hasher.absorb(data);
    hasher.finalize()
}
