// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The script ran out of answers
    #[error("Scripted host: no answer left for `{0}`")]
    Exhausted(String),
    /// Streaming data was requested past its end
    #[error("Scripted host: calldata exhausted, {requested} bytes requested")]
    DataExhausted { requested: u32 },
    /// Lock poisoned by a panicking holder
    #[error("Scripted host: state poisoned")]
    Poisoned,
}
