// SPDX-License-Identifier: Apache-2.0

//! Error types for the signing pipeline

use evm_signer_device_base::DeviceError;
use evm_signer_transport::{Failure, FailureCode};
use thiserror::Error;

use crate::rlp::RlpError;

/// Errors that end a signing session
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EthSignError<E: std::error::Error> {
    /// The host link failed or timed out
    #[error("Host link error: {0}")]
    Link(E),

    /// Screen, secure element or policy
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Malformed request fields
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Host answered out of protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Typed data schema or value cannot be hashed
    #[error("Invalid typed data: {0}")]
    Data(String),

    /// Raised by callers of `rlp::decode`, such as hosts checking a signed payload
    #[error("RLP error: {0}")]
    Rlp(#[from] RlpError),
}

impl<E: std::error::Error> EthSignError<E> {
    /// Check if the user rejected a screen
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EthSignError::Device(DeviceError::Cancelled))
    }

    /// Check if a device policy refused the request
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, EthSignError::Device(DeviceError::PolicyRejected(_)))
    }

    /// Check if the request itself was malformed
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EthSignError::Validation(_)
                | EthSignError::Data(_)
                | EthSignError::Rlp(_)
                | EthSignError::Device(DeviceError::InvalidPath(_))
        )
    }

    /// Code reported to the host
    pub fn failure_code(&self) -> FailureCode {
        match self {
            EthSignError::Link(_) => FailureCode::ActionCancelled,
            EthSignError::Device(DeviceError::Cancelled) => FailureCode::ActionCancelled,
            EthSignError::Device(DeviceError::PolicyRejected(_)) => FailureCode::PolicyRejected,
            EthSignError::Device(DeviceError::InvalidPath(_)) => FailureCode::DataError,
            EthSignError::Device(DeviceError::SecureElement(_)) => FailureCode::ProcessError,
            EthSignError::Device(DeviceError::Ui(_)) => FailureCode::FirmwareError,
            EthSignError::Validation(_) | EthSignError::Data(_) | EthSignError::Rlp(_) => {
                FailureCode::DataError
            }
            EthSignError::Protocol(_) => FailureCode::ProcessError,
        }
    }

    pub fn to_failure(&self) -> Failure {
        Failure::new(self.failure_code(), self.to_string())
    }
}

/// Result type alias for signing sessions
pub type EthSignResult<T, E> = Result<T, EthSignError<E>>;
