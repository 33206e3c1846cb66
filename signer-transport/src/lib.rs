// SPDX-License-Identifier: Apache-2.0

pub use async_trait::async_trait;
pub use evm_signer_proto::*;

/// Use to pull data from the host in the middle of a signing session
///
/// Every call is a suspension point of the session: the device asks, the host answers.
/// Transport level timeouts come back as `Self::Error`.
#[async_trait]
pub trait HostLink {
    /// Error defined by the link used
    type Error;

    /// Send a device request and wait for the host's answer
    async fn exchange(&self, request: DeviceRequest) -> Result<HostAnswer, Self::Error>;
}

#[async_trait]
impl<T> HostLink for &T
where
    T: HostLink + Sync + ?Sized,
{
    type Error = T::Error;

    async fn exchange(&self, request: DeviceRequest) -> Result<HostAnswer, Self::Error> {
        (**self).exchange(request).await
    }
}
