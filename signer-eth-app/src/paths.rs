// SPDX-License-Identifier: Apache-2.0

//! Derivation path safety checks

use evm_signer_device_base::{
    Banner, DerivationPath, DeviceError, DeviceSettings, Property, Screen, Ui, UiExt, HARDENED,
};
use log::warn;

use crate::constants::limits;
use crate::networks::NetworkInfo;

const PURPOSE: u32 = 44 | HARDENED;

fn is_hardened_account(index: u32) -> bool {
    index >= HARDENED && index - HARDENED < limits::MAX_ACCOUNT
}

fn allowed_coin_types(network: &NetworkInfo) -> [u32; 3] {
    let testnet = if network.testnet { 1 } else { 60 };
    [network.slip44 | HARDENED, 60 | HARDENED, testnet | HARDENED]
}

/// `m/44'/c'/a'/0/i` or `m/44'/c'/0'/a` with `c` the network's coin type,
/// Ethereum's, or the shared testnet one on testnets
pub fn is_standard_path(path: &DerivationPath, network: &NetworkInfo) -> bool {
    let indices = path.indices();
    if indices.len() < 4 || indices[0] != PURPOSE {
        return false;
    }
    if !allowed_coin_types(network).contains(&indices[1]) {
        return false;
    }

    match indices {
        [_, _, account, 0, address_index] => {
            is_hardened_account(*account) && *address_index <= limits::MAX_ADDRESS_INDEX
        }
        [_, _, account, legacy_account] => {
            *account == HARDENED && *legacy_account <= limits::MAX_ADDRESS_INDEX
        }
        _ => false,
    }
}

/// Refuse or warn about paths outside the standard layouts, per the safety setting
pub async fn check_path<U>(
    ui: &U,
    settings: &DeviceSettings,
    path: &DerivationPath,
    network: &NetworkInfo,
) -> Result<(), DeviceError>
where
    U: Ui + Sync + ?Sized,
{
    if is_standard_path(path, network) {
        return Ok(());
    }

    warn!("non-standard derivation path {} for chain {}", path, network.chain_id);
    if settings.safety_checks().is_strict() {
        return Err(DeviceError::PolicyRejected(format!(
            "Forbidden key path {}",
            path
        )));
    }

    ui.confirm(
        Screen::warning("Wrong derivation path")
            .with_banner(Banner::warning(
                "The derivation path is unusual for this network",
            ))
            .with_property(Property::new("Path", path.to_string())),
    )
    .await
}
