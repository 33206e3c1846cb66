// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised by the device collaborators (screen, secure element, settings)
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// The user rejected a confirmation screen
    #[error("Cancelled by user")]
    Cancelled,
    /// A device policy forbids the operation
    #[error("Rejected by policy: {0}")]
    PolicyRejected(String),
    /// Derivation path cannot be used
    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),
    /// Secure element refused or failed to sign
    #[error("Secure element error: {0}")]
    SecureElement(String),
    /// Display layer failure
    #[error("UI error: {0}")]
    Ui(String),
}

impl DeviceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DeviceError::Cancelled)
    }

    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, DeviceError::PolicyRejected(_))
    }
}
