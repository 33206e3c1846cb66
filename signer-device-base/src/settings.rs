// SPDX-License-Identifier: Apache-2.0

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{DeviceError, Interaction, Property, Screen, Ui};

/// How non-standard derivation paths are treated
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyChecks {
    /// Refuse them
    #[default]
    Strict,
    /// Warn and let the user continue
    PromptAlways,
    /// Warn and let the user continue until the next restart
    PromptTemporarily,
}

impl SafetyChecks {
    pub fn is_strict(&self) -> bool {
        matches!(self, SafetyChecks::Strict)
    }
}

/// Device settings read at the start of each session
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    blind_signing: bool,
    /// Only `enable_turbo_mode` turns this on, never a settings file
    #[serde(skip_deserializing)]
    turbo_mode: bool,
    safety_checks: SafetyChecks,
}

impl DeviceSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow signing calldata the device cannot decode
    pub fn with_blind_signing(mut self, enabled: bool) -> Self {
        self.blind_signing = enabled;
        self
    }

    pub fn with_safety_checks(mut self, safety_checks: SafetyChecks) -> Self {
        self.safety_checks = safety_checks;
        self
    }

    pub fn blind_signing(&self) -> bool {
        self.blind_signing
    }

    pub fn turbo_mode(&self) -> bool {
        self.turbo_mode
    }

    pub fn safety_checks(&self) -> SafetyChecks {
        self.safety_checks
    }

    /// Ask for consent and switch turbo mode on when the user agrees
    ///
    /// Returns whether turbo mode is now on.
    pub async fn enable_turbo_mode<U>(&mut self, ui: &U) -> Result<bool, DeviceError>
    where
        U: Ui + Sync + ?Sized,
    {
        if self.turbo_mode {
            return Ok(true);
        }

        let consent = Screen::warning("Enable turbo mode?")
            .with_property(Property::new(
                "Turbo mode",
                "Transactions are confirmed on a single screen without the detailed review",
            ));
        match ui.interact(consent).await? {
            Interaction::Confirm => {
                info!("turbo mode enabled");
                self.turbo_mode = true;
            }
            Interaction::Details | Interaction::Reject => {
                warn!("turbo mode consent declined");
            }
        }
        Ok(self.turbo_mode)
    }

    pub fn disable_turbo_mode(&mut self) {
        self.turbo_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::executor::block_on;

    struct Answer(Interaction);

    #[async_trait]
    impl Ui for Answer {
        async fn interact(&self, _screen: Screen) -> Result<Interaction, DeviceError> {
            Ok(self.0)
        }

        async fn notify(&self, _screen: Screen) -> Result<(), DeviceError> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults_are_conservative() {
        let settings = DeviceSettings::default();
        assert!(!settings.blind_signing());
        assert!(!settings.turbo_mode());
        assert!(settings.safety_checks().is_strict());
    }

    #[test]
    fn test_turbo_mode_requires_consent() {
        let mut settings = DeviceSettings::new();
        assert_eq!(block_on(settings.enable_turbo_mode(&Answer(Interaction::Reject))), Ok(false));
        assert!(!settings.turbo_mode());

        assert_eq!(block_on(settings.enable_turbo_mode(&Answer(Interaction::Confirm))), Ok(true));
        assert!(settings.turbo_mode());

        settings.disable_turbo_mode();
        assert!(!settings.turbo_mode());
    }

    #[test]
    fn test_json_settings() {
        let settings: DeviceSettings =
            serde_json::from_str(r#"{"blind_signing":true,"safety_checks":"prompt_always"}"#)
                .unwrap();
        assert!(settings.blind_signing());
        assert!(!settings.turbo_mode());
        assert_eq!(settings.safety_checks(), SafetyChecks::PromptAlways);
    }

    #[test]
    fn test_json_settings_cannot_enable_turbo_mode() {
        let settings: DeviceSettings =
            serde_json::from_str(r#"{"blind_signing":true,"turbo_mode":true}"#).unwrap();
        assert!(settings.blind_signing());
        assert!(!settings.turbo_mode());
    }
}
