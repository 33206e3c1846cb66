// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DeviceError;

pub const HARDENED: u32 = 0x8000_0000;

/// Deepest path the secure element derives
pub const MAX_PATH_DEPTH: usize = 8;

/// BIP32 derivation path
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationPath {
    indices: Vec<u32>,
}

impl DerivationPath {
    pub fn new(indices: Vec<u32>) -> Result<Self, DeviceError> {
        if indices.is_empty() {
            return Err(DeviceError::InvalidPath("empty path".to_string()));
        }
        if indices.len() > MAX_PATH_DEPTH {
            return Err(DeviceError::InvalidPath(format!(
                "path too deep: {} (max {})",
                indices.len(),
                MAX_PATH_DEPTH
            )));
        }
        Ok(DerivationPath { indices })
    }

    /// m/44'/60'/account'/0/address_index
    pub fn ethereum_standard(account: u32, address_index: u32) -> Self {
        DerivationPath {
            indices: vec![
                44 | HARDENED,
                60 | HARDENED,
                account | HARDENED,
                0,
                address_index,
            ],
        }
    }

    /// m/44'/60'/0'/account, the layout of the legacy Ledger Live derivation
    pub fn ledger_legacy(account: u32) -> Self {
        DerivationPath {
            indices: vec![44 | HARDENED, 60 | HARDENED, HARDENED, account],
        }
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl TryFrom<&[u32]> for DerivationPath {
    type Error = DeviceError;

    fn try_from(indices: &[u32]) -> Result<Self, Self::Error> {
        DerivationPath::new(indices.to_vec())
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for index in &self.indices {
            if *index >= HARDENED {
                write!(f, "/{}'", index - HARDENED)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}
