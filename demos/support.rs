// SPDX-License-Identifier: Apache-2.0

//! Software stand-ins for the device used by the demos
//!
//! The screen prints to stdout and confirms everything. The secure element is
//! a single k256 key; it ignores the derivation path.

use std::error::Error;

use async_trait::async_trait;
use evm_signer_device_base::{
    Accent, DerivationPath, DeviceError, DeviceSettings, Interaction, RecoverableSignature, Screen,
    SecureElement, Ui,
};
use evm_signer_eth_app::keccak::keccak256;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

/// Names a JSON file with [`DeviceSettings`]
pub const SETTINGS_ENV: &str = "EVM_SIGNER_SETTINGS";
/// Hex private key of the demo secure element
pub const KEY_ENV: &str = "EVM_SIGNER_DEMO_KEY";

/// Well-known development key, never use it for real funds
const DEFAULT_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

pub fn init_logging() {
    env_logger::init();
}

/// Settings from the file named by `EVM_SIGNER_SETTINGS`, defaults otherwise
pub fn load_settings() -> Result<DeviceSettings, Box<dyn Error>> {
    match std::env::var(SETTINGS_ENV) {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)?;
            let settings = serde_json::from_str(&text)?;
            println!("⚙️  Settings loaded from {}", path);
            Ok(settings)
        }
        Err(_) => Ok(DeviceSettings::default()),
    }
}

/// Prints every screen and confirms it
pub struct ConsoleUi;

fn print_screen(screen: &Screen) {
    let marker = match screen.accent {
        Accent::Danger => "🟥",
        Accent::Normal => "📱",
    };
    println!("\n{} [{:?}] {}", marker, screen.kind, screen.title);
    if let Some(subtitle) = &screen.subtitle {
        println!("   {}", subtitle);
    }
    for banner in &screen.banners {
        println!("   ⚠️  {:?}: {}", banner.level, banner.text);
    }
    for property in &screen.properties {
        println!("   {}: {}", property.label, property.value);
    }
}

#[async_trait]
impl Ui for ConsoleUi {
    async fn interact(&self, screen: Screen) -> Result<Interaction, DeviceError> {
        print_screen(&screen);
        println!("   ✅ confirmed");
        Ok(Interaction::Confirm)
    }

    async fn notify(&self, screen: Screen) -> Result<(), DeviceError> {
        print_screen(&screen);
        Ok(())
    }
}

/// One secp256k1 key held in memory
pub struct SoftwareSecureElement {
    key: SigningKey,
}

impl SoftwareSecureElement {
    pub fn from_hex(key: &str) -> Result<Self, Box<dyn Error>> {
        let bytes = hex::decode(key.trim_start_matches("0x"))?;
        Ok(SoftwareSecureElement {
            key: SigningKey::from_slice(&bytes)?,
        })
    }

    /// Key from `EVM_SIGNER_DEMO_KEY`, or the development key
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let key = std::env::var(KEY_ENV).unwrap_or_else(|_| DEFAULT_KEY.to_string());
        Self::from_hex(&key)
    }
}

impl SecureElement for SoftwareSecureElement {
    fn sign_digest(
        &self,
        _path: &DerivationPath,
        digest: &[u8; 32],
    ) -> Result<RecoverableSignature, DeviceError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| DeviceError::SecureElement(e.to_string()))?;

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        RecoverableSignature::from_parts(recovery_id.is_y_odd() as u8, r, s)
    }

    fn address(&self, _path: &DerivationPath) -> Result<[u8; 20], DeviceError> {
        let point = self.key.verifying_key().to_encoded_point(false);
        let hash = keccak256(&point.as_bytes()[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        Ok(address)
    }
}
