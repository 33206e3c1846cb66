// SPDX-License-Identifier: Apache-2.0

//! EIP-712 typed data signing
//!
//! The device pulls the schema and then every value from the host, hashing as
//! it goes. Nothing but the running Keccak contexts and the current path is kept.

pub mod encoding;
pub mod engine;
pub mod json;
pub mod types;

pub use engine::{collect_schema, member_names, TypedDataWalker};
pub use json::{TypedDataError, TypedDataJson};
pub use types::{FieldType, Member, Schema, DOMAIN_TYPE};

use async_trait::async_trait;
use evm_signer_device_base::{
    DerivationPath, Property, Screen, SecureElement, Ui, UiExt, HARDENED,
};
use evm_signer_transport::{HostLink, SignTypedData, TypedDataSignature};
use log::{debug, info};

use crate::constants::EIP712_PREFIX;
use crate::errors::{EthSignError, EthSignResult};
use crate::keccak::Keccak256Hasher;
use crate::networks;
use crate::paths::check_path;
use crate::{EthApp, Session};

/// First member path index of the domain
pub const DOMAIN_ROOT: u32 = 0;
/// First member path index of the message
pub const MESSAGE_ROOT: u32 = 1;

const ETHEREUM_COIN_TYPE: u32 = 60;

#[async_trait]
pub trait SignTypedDataMessage<H, U, S>
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    /// Pull, review and sign EIP-712 typed data
    ///
    /// # Arguments
    /// * `session` - The host link, screen, secure element and settings of this session
    /// * `request` - Path, primary type and hashing options
    ///
    /// # Returns
    /// The signer's address and the signature as `r ‖ s ‖ v`
    async fn sign_typed_data(
        session: &Session<'_, H, U, S>,
        request: SignTypedData,
    ) -> EthSignResult<TypedDataSignature, H::Error>;
}

#[async_trait]
impl<H, U, S> SignTypedDataMessage<H, U, S> for EthApp
where
    H: HostLink + Sync,
    H::Error: std::error::Error + Send,
    U: Ui + Sync,
    S: SecureElement + Sync,
{
    async fn sign_typed_data(
        session: &Session<'_, H, U, S>,
        request: SignTypedData,
    ) -> EthSignResult<TypedDataSignature, H::Error> {
        let expected_hash = match &request.show_message_hash {
            Some(hash) => Some(<[u8; 32]>::try_from(hash.as_slice()).map_err(|_| {
                EthSignError::Validation(format!("Message hash of {} bytes", hash.len()))
            })?),
            None => None,
        };
        if request.primary_type.is_empty() {
            return Err(EthSignError::Validation("Empty primary type".to_string()));
        }

        let path = DerivationPath::try_from(request.address_n.as_slice())?;
        let coin_type = path
            .indices()
            .get(1)
            .map_or(ETHEREUM_COIN_TYPE, |index| index & !HARDENED);
        let network = networks::by_slip44(coin_type);
        check_path(session.ui, session.settings, &path, &network).await?;

        let schema = collect_schema(session.link, &request.primary_type).await?;
        let primary = request.primary_type.as_str();
        let ui = session.ui;
        let mut walker =
            TypedDataWalker::new(session.link, ui, &schema, request.metamask_v4_compat);

        let show_domain = ui
            .confirm_or_details(
                Screen::overview("Typed data")
                    .with_property(Property::new("Primary type", primary))
                    .with_property(Property::new(
                        "Domain members",
                        member_names(&schema, DOMAIN_TYPE),
                    )),
            )
            .await?;
        let domain_hash = walker
            .hash_struct(DOMAIN_TYPE, vec![DOMAIN_ROOT], show_domain)
            .await?;
        debug!("domain hash {}", hex::encode(domain_hash));

        let message_hash = if primary == DOMAIN_TYPE {
            ui.confirm(Screen::info("No message field")).await?;
            None
        } else {
            let show_message = ui
                .confirm_or_details(
                    Screen::overview(format!("Confirm {}", primary))
                        .with_property(Property::new("Members", member_names(&schema, primary))),
                )
                .await?;
            let hash = walker
                .hash_struct(primary, vec![MESSAGE_ROOT], show_message)
                .await?;
            debug!("message hash {}", hex::encode(hash));
            Some(hash)
        };

        if let Some(expected) = expected_hash {
            if message_hash != Some(expected) {
                return Err(EthSignError::Data(format!(
                    "Message hash mismatch, expected 0x{}",
                    hex::encode(expected)
                )));
            }
        }

        let mut confirm = Screen::confirm("Sign typed data")
            .with_property(Property::data("Domain hash", format!("0x{}", hex::encode(domain_hash))));
        if let Some(hash) = message_hash {
            confirm = confirm.with_property(Property::data(
                "Message hash",
                format!("0x{}", hex::encode(hash)),
            ));
        }
        ui.confirm(confirm).await?;

        let mut hasher = Keccak256Hasher::new();
        hasher.absorb(&EIP712_PREFIX);
        hasher.absorb(&domain_hash);
        if let Some(hash) = &message_hash {
            hasher.absorb(hash);
        }
        let digest = hasher.finalize();
        info!("typed data digest: {}", hex::encode(digest));

        let signature = session.secure_element.sign_digest(&path, &digest)?;
        Ok(TypedDataSignature {
            address: session.secure_element.address(&path)?,
            signature: signature.to_rsv(),
        })
    }
}
