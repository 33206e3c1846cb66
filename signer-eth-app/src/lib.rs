// SPDX-License-Identifier: Apache-2.0

//! Ethereum signing pipeline of a hardware wallet
//!
//! This crate takes signing requests from a host, shows the user what is being
//! signed, and returns signatures produced by the secure element. It covers
//! the Ethereum transaction formats and structured data a wallet signs.
//!
//! ## Features
//!
//! - **Legacy and EIP-1559 transactions**: RLP encoded and hashed while streaming,
//!   with calldata pulled from the host in chunks
//! - **Calldata decoding**: ERC-20, ERC-721, ERC-1155 and Gnosis Safe calls are shown
//!   in plain words, anything else goes through the blind-signing policy
//! - **EIP-712**: schema and values are pulled from the host and hashed on the fly
//! - **Gnosis Safe**: owner signatures over `SafeTx` with delegatecall warnings
//! - **Async/Await**: host link and screen are async traits, sessions suspend on them
//!

use evm_signer_device_base::{DeviceError, DeviceSettings, SecureElement, Ui, UiExt};
use evm_signer_transport::{
    DeviceResponse, HostLink, HostRequest, SafeSignature, SignEip1559Tx, SignLegacyTx,
    SignSafeTx, SignTypedData, TxSignature, TypedDataSignature,
};
use log::{info, warn};

pub mod approval;
pub mod chunks;
pub mod classify;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod format;
pub mod keccak;
pub mod networks;
pub mod paths;
pub mod providers;
pub mod rlp;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_utils;

pub use commands::*;
pub use errors::*;

/// Ethereum app marker the signing commands are implemented for
#[derive(Debug, Clone)]
pub struct EthApp;

/// Everything a signing command may touch while it runs
pub struct Session<'a, H, U, S> {
    pub link: &'a H,
    pub ui: &'a U,
    pub secure_element: &'a S,
    pub settings: &'a DeviceSettings,
}

/// Signing front end of the device
///
/// Owns its collaborators and runs one session per `&mut self` call, so two
/// sessions can never interleave.
#[derive(Debug)]
pub struct EthSigner<H, U, S> {
    link: H,
    ui: U,
    secure_element: S,
    settings: DeviceSettings,
}

impl<H, U, S> EthSigner<H, U, S>
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    pub fn new(link: H, ui: U, secure_element: S, settings: DeviceSettings) -> Self {
        EthSigner {
            link,
            ui,
            secure_element,
            settings,
        }
    }

    pub fn link(&self) -> &H {
        &self.link
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn secure_element(&self) -> &S {
        &self.secure_element
    }

    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    /// Replace the settings used by the next sessions
    pub fn set_settings(&mut self, settings: DeviceSettings) {
        self.settings = settings;
    }

    /// Ask the user for consent and switch turbo mode on if given
    pub async fn enable_turbo_mode(&mut self) -> Result<bool, DeviceError> {
        self.settings.enable_turbo_mode(&self.ui).await
    }

    fn session(&self) -> Session<'_, H, U, S> {
        Session {
            link: &self.link,
            ui: &self.ui,
            secure_element: &self.secure_element,
            settings: &self.settings,
        }
    }

    pub async fn sign_legacy_tx(
        &mut self,
        request: SignLegacyTx,
    ) -> EthSignResult<TxSignature, H::Error> {
        EthApp::sign_legacy_tx(&self.session(), request).await
    }

    pub async fn sign_eip1559_tx(
        &mut self,
        request: SignEip1559Tx,
    ) -> EthSignResult<TxSignature, H::Error> {
        EthApp::sign_eip1559_tx(&self.session(), request).await
    }

    pub async fn sign_typed_data(
        &mut self,
        request: SignTypedData,
    ) -> EthSignResult<TypedDataSignature, H::Error> {
        EthApp::sign_typed_data(&self.session(), request).await
    }

    pub async fn sign_safe_tx(
        &mut self,
        request: SignSafeTx,
    ) -> EthSignResult<SafeSignature, H::Error> {
        EthApp::sign_safe_tx(&self.session(), request).await
    }

    /// Run a whole session; failures come back as [`DeviceResponse::Failure`]
    pub async fn handle(&mut self, request: HostRequest) -> DeviceResponse {
        let name = request.name();
        info!("{} accepted", name);

        let result = match request {
            HostRequest::SignLegacyTx(request) => self
                .sign_legacy_tx(request)
                .await
                .map(DeviceResponse::TxSignature),
            HostRequest::SignEip1559Tx(request) => self
                .sign_eip1559_tx(request)
                .await
                .map(DeviceResponse::TxSignature),
            HostRequest::SignTypedData(request) => self
                .sign_typed_data(request)
                .await
                .map(DeviceResponse::TypedDataSignature),
            HostRequest::SignSafeTx(request) => self
                .sign_safe_tx(request)
                .await
                .map(DeviceResponse::SafeSignature),
        };

        match result {
            Ok(response) => {
                info!("{} signed", name);
                response
            }
            Err(error) => {
                warn!("{} failed: {}", name, error);
                self.report(&error).await;
                DeviceResponse::Failure(error.to_failure())
            }
        }
    }

    /// Tell the user why a session ended when they did not end it on a screen themselves
    async fn report(&self, error: &EthSignError<H::Error>) {
        let (title, message) = match error {
            EthSignError::Device(DeviceError::PolicyRejected(reason)) => ("Rejected", reason.as_str()),
            EthSignError::Device(DeviceError::Cancelled) => ("Cancelled", "Signing cancelled"),
            _ => return,
        };
        if let Err(ui_error) = self.ui.show_error(title, message).await {
            warn!("could not show error screen: {}", ui_error);
        }
    }
}
