// SPDX-License-Identifier: Apache-2.0

use crate::{DerivationPath, DeviceError};

pub const SIGNATURE_LENGTH: usize = 65;

/// Recoverable secp256k1 signature as the secure element returns it:
/// `27 + recovery_bit ‖ r ‖ s`, with a canonical (low) `s`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Result<Self, DeviceError> {
        match bytes[0] {
            27 | 28 => Ok(RecoverableSignature(bytes)),
            header => Err(DeviceError::SecureElement(format!(
                "invalid recovery header {}",
                header
            ))),
        }
    }

    pub fn from_parts(recovery_bit: u8, r: [u8; 32], s: [u8; 32]) -> Result<Self, DeviceError> {
        if recovery_bit > 1 {
            return Err(DeviceError::SecureElement(format!(
                "invalid recovery bit {}",
                recovery_bit
            )));
        }
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[0] = 27 + recovery_bit;
        bytes[1..33].copy_from_slice(&r);
        bytes[33..].copy_from_slice(&s);
        Ok(RecoverableSignature(bytes))
    }

    /// `27` or `28`
    pub fn header(&self) -> u8 {
        self.0[0]
    }

    pub fn recovery_bit(&self) -> u8 {
        self.0[0] - 27
    }

    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.0[1..33]);
        r
    }

    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.0[33..]);
        s
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// `r ‖ s ‖ v` with `v` in {27, 28}
    pub fn to_rsv(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIGNATURE_LENGTH);
        out.extend_from_slice(&self.0[1..]);
        out.push(self.0[0]);
        out
    }
}

/// Opaque signing capability; key material never leaves it
///
/// Calls are serialized by the session that owns the signer.
pub trait SecureElement {
    /// Sign a 32-byte digest with the key at `path`
    fn sign_digest(
        &self,
        path: &DerivationPath,
        digest: &[u8; 32],
    ) -> Result<RecoverableSignature, DeviceError>;

    /// Ethereum address of the key at `path`
    fn address(&self, path: &DerivationPath) -> Result<[u8; 20], DeviceError>;
}

impl<T> SecureElement for &T
where
    T: SecureElement + ?Sized,
{
    fn sign_digest(
        &self,
        path: &DerivationPath,
        digest: &[u8; 32],
    ) -> Result<RecoverableSignature, DeviceError> {
        (**self).sign_digest(path, digest)
    }

    fn address(&self, path: &DerivationPath) -> Result<[u8; 20], DeviceError> {
        (**self).address(path)
    }
}
