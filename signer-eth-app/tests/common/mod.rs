// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::sync::Mutex;

use evm_signer_device_base::{
    async_trait, DerivationPath, DeviceError, Interaction, RecoverableSignature, Screen,
    SecureElement, Ui,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Confirms every screen and keeps it
#[derive(Default)]
pub struct ConfirmingUi {
    screens: Mutex<Vec<Screen>>,
}

impl ConfirmingUi {
    pub fn screens(&self) -> Vec<Screen> {
        self.screens.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.screens().into_iter().map(|s| s.title).collect()
    }
}

#[async_trait]
impl Ui for ConfirmingUi {
    async fn interact(&self, screen: Screen) -> Result<Interaction, DeviceError> {
        self.screens.lock().unwrap().push(screen);
        Ok(Interaction::Confirm)
    }

    async fn notify(&self, screen: Screen) -> Result<(), DeviceError> {
        self.screens.lock().unwrap().push(screen);
        Ok(())
    }
}

/// Records digests and signs them with a constant `r`, `s`
pub struct RecordingSecureElement {
    pub recovery_bit: u8,
    digests: Mutex<Vec<[u8; 32]>>,
}

impl RecordingSecureElement {
    pub fn new(recovery_bit: u8) -> Self {
        RecordingSecureElement {
            recovery_bit,
            digests: Mutex::new(Vec::new()),
        }
    }

    pub fn digests(&self) -> Vec<[u8; 32]> {
        self.digests.lock().unwrap().clone()
    }
}

impl SecureElement for RecordingSecureElement {
    fn sign_digest(
        &self,
        _path: &DerivationPath,
        digest: &[u8; 32],
    ) -> Result<RecoverableSignature, DeviceError> {
        self.digests.lock().unwrap().push(*digest);
        RecoverableSignature::from_parts(self.recovery_bit, [0x0A; 32], [0x0B; 32])
    }

    fn address(&self, _path: &DerivationPath) -> Result<[u8; 20], DeviceError> {
        Ok([0x0C; 20])
    }
}

pub fn address(text: &str) -> Vec<u8> {
    hex::decode(text.trim_start_matches("0x")).unwrap()
}

pub fn word(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(bytes);
    out
}

pub fn path() -> Vec<u32> {
    DerivationPath::ethereum_standard(0, 0).indices().to_vec()
}
