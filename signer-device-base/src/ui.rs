// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

use crate::{Banner, DeviceError, Screen};

/// What the user did on a screen
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    Confirm,
    /// Asked for the detail pages behind an overview
    Details,
    Reject,
}

/// The display and its touch input
///
/// Every call is a suspension point; there is no timeout on the user.
#[async_trait]
pub trait Ui {
    /// Show a screen and wait for the user's decision
    async fn interact(&self, screen: Screen) -> Result<Interaction, DeviceError>;

    /// Show a screen without waiting for a decision
    async fn notify(&self, screen: Screen) -> Result<(), DeviceError>;
}

#[async_trait]
pub trait UiExt: Ui + Sync {
    /// Reject maps to [`DeviceError::Cancelled`], anything else continues
    async fn confirm(&self, screen: Screen) -> Result<(), DeviceError> {
        match self.interact(screen).await? {
            Interaction::Reject => Err(DeviceError::Cancelled),
            Interaction::Confirm | Interaction::Details => Ok(()),
        }
    }

    /// Returns `true` when the user wants to see the details first
    async fn confirm_or_details(&self, screen: Screen) -> Result<bool, DeviceError> {
        match self.interact(screen).await? {
            Interaction::Reject => Err(DeviceError::Cancelled),
            Interaction::Details => Ok(true),
            Interaction::Confirm => Ok(false),
        }
    }

    async fn show_error(&self, title: &str, message: &str) -> Result<(), DeviceError> {
        self.notify(Screen::error(title).with_banner(Banner::danger(message)))
            .await
    }
}

impl<T> UiExt for T where T: Ui + Sync + ?Sized {}

#[async_trait]
impl<T> Ui for &T
where
    T: Ui + Sync + ?Sized,
{
    async fn interact(&self, screen: Screen) -> Result<Interaction, DeviceError> {
        (**self).interact(screen).await
    }

    async fn notify(&self, screen: Screen) -> Result<(), DeviceError> {
        (**self).notify(screen).await
    }
}
