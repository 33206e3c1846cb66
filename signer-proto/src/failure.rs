// SPDX-License-Identifier: Apache-2.0

//! Failure codes reported to the host

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host-visible failure classes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum FailureCode {
    /// Malformed request data (lengths, limits, schema)
    DataError = 3,
    /// Host broke the request/answer protocol
    ProcessError = 4,
    /// User rejected the action or the link went away
    ActionCancelled = 5,
    /// Device policy forbids the action
    PolicyRejected = 9,
    /// Something inside the device failed
    FirmwareError = 99,
}

impl FailureCode {
    /// Short human readable description
    pub fn description(&self) -> &'static str {
        match self {
            FailureCode::DataError => "Data error",
            FailureCode::ProcessError => "Process error",
            FailureCode::ActionCancelled => "Action cancelled",
            FailureCode::PolicyRejected => "Policy rejected",
            FailureCode::FirmwareError => "Firmware error",
        }
    }
}

/// Raised when a numeric failure code is not known
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Unknown failure code: {0}")]
pub struct UnknownFailureCode(pub u32);

impl TryFrom<u32> for FailureCode {
    type Error = UnknownFailureCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            3 => Ok(FailureCode::DataError),
            4 => Ok(FailureCode::ProcessError),
            5 => Ok(FailureCode::ActionCancelled),
            9 => Ok(FailureCode::PolicyRejected),
            99 => Ok(FailureCode::FirmwareError),
            other => Err(UnknownFailureCode(other)),
        }
    }
}

/// Final response of a session that did not produce a signature
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub code: FailureCode,
    pub message: String,
}

impl Failure {
    pub fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Failure {
            code,
            message: message.into(),
        }
    }
}
