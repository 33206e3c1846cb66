// SPDX-License-Identifier: Apache-2.0

//! Host protocol for the EVM transaction signer
//!
//! Every signing session starts with a [`HostRequest`]. While the session runs the
//! device pulls whatever else it needs with [`DeviceRequest`]s, which the host answers
//! with a [`HostAnswer`]. The session ends with exactly one [`DeviceResponse`].
//!
//! Framing of these messages on the wire belongs to the transport and is not part of
//! this crate.

mod failure;
mod messages;
mod typed_data;

pub use failure::*;
pub use messages::*;
pub use typed_data::*;
