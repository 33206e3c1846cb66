// SPDX-License-Identifier: Apache-2.0

//! Doubles for the UI and the secure element

use std::collections::VecDeque;
use std::sync::Mutex;

use evm_signer_device_base::{
    async_trait, DerivationPath, DeviceError, Interaction, RecoverableSignature, Screen,
    SecureElement, Ui,
};
use num_bigint::BigUint;

use crate::constants::selector;

/// Answers screens from a script, then confirms everything
#[derive(Default)]
pub(crate) struct RecordingUi {
    answers: Mutex<VecDeque<Interaction>>,
    screens: Mutex<Vec<Screen>>,
}

impl RecordingUi {
    pub(crate) fn confirming() -> Self {
        Self::default()
    }

    pub(crate) fn with_answers(answers: impl IntoIterator<Item = Interaction>) -> Self {
        RecordingUi {
            answers: Mutex::new(answers.into_iter().collect()),
            screens: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn screens(&self) -> Vec<Screen> {
        self.screens.lock().unwrap().clone()
    }

    pub(crate) fn titles(&self) -> Vec<String> {
        self.screens().into_iter().map(|s| s.title).collect()
    }

    pub(crate) fn clear(&self) {
        self.screens.lock().unwrap().clear();
    }
}

#[async_trait]
impl Ui for RecordingUi {
    async fn interact(&self, screen: Screen) -> Result<Interaction, DeviceError> {
        self.screens.lock().unwrap().push(screen);
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Interaction::Confirm))
    }

    async fn notify(&self, screen: Screen) -> Result<(), DeviceError> {
        self.screens.lock().unwrap().push(screen);
        Ok(())
    }
}

/// Returns the same `r`, `s` for every digest and records what it signed
pub(crate) struct FixedSecureElement {
    pub(crate) recovery_bit: u8,
    pub(crate) address: [u8; 20],
    signed: Mutex<Vec<(DerivationPath, [u8; 32])>>,
}

impl FixedSecureElement {
    pub(crate) fn new(recovery_bit: u8) -> Self {
        FixedSecureElement {
            recovery_bit,
            address: [0xA1; 20],
            signed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn digests(&self) -> Vec<[u8; 32]> {
        self.signed.lock().unwrap().iter().map(|(_, d)| *d).collect()
    }

    pub(crate) fn last_digest(&self) -> Option<[u8; 32]> {
        self.digests().last().copied()
    }
}

impl SecureElement for FixedSecureElement {
    fn sign_digest(
        &self,
        path: &DerivationPath,
        digest: &[u8; 32],
    ) -> Result<RecoverableSignature, DeviceError> {
        self.signed.lock().unwrap().push((path.clone(), *digest));
        RecoverableSignature::from_parts(self.recovery_bit, [0x11; 32], [0x22; 32])
    }

    fn address(&self, _path: &DerivationPath) -> Result<[u8; 20], DeviceError> {
        Ok(self.address)
    }
}

pub(crate) fn address(text: &str) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&hex::decode(text.trim_start_matches("0x")).unwrap());
    out
}

pub(crate) fn word(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

fn address_word(address: &[u8; 20]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address);
    out
}

fn padded(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    out.resize(data.len().div_ceil(32) * 32, 0);
    out
}

/// ABI encoded `execTransaction` with a single 65-byte signature
pub(crate) fn exec_transaction_calldata(
    to: [u8; 20],
    value: &BigUint,
    data: &[u8],
    operation: u8,
) -> Vec<u8> {
    let data_offset = 10 * 32;
    let signatures_offset = data_offset + 32 + padded(data).len();
    let signature = [0x5Cu8; 65];

    let mut out = selector::SAFE_EXEC_TRANSACTION.to_vec();
    out.extend_from_slice(&address_word(&to));
    out.extend_from_slice(&word(value));
    out.extend_from_slice(&word(&BigUint::from(data_offset)));
    out.extend_from_slice(&word(&BigUint::from(operation)));
    out.extend_from_slice(&word(&BigUint::from(50_000u32)));
    out.extend_from_slice(&word(&BigUint::from(21_000u32)));
    out.extend_from_slice(&word(&BigUint::from(0u8)));
    out.extend_from_slice(&address_word(&[0u8; 20]));
    out.extend_from_slice(&address_word(&[0u8; 20]));
    out.extend_from_slice(&word(&BigUint::from(signatures_offset)));
    out.extend_from_slice(&word(&BigUint::from(data.len())));
    out.extend_from_slice(&padded(data));
    out.extend_from_slice(&word(&BigUint::from(signature.len())));
    out.extend_from_slice(&padded(&signature));
    out
}
