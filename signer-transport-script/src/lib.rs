// SPDX-License-Identifier: Apache-2.0

//! In-memory host that replays a script
//!
//! Answers queued with [`ScriptedHost::push`] are handed out in order. Calldata
//! registered with [`ScriptedHost::with_tx_data`] is served to `TxData` requests in
//! exactly the sizes the device asks for, the way a well behaved host would.

mod errors;

use std::{collections::VecDeque, sync::Mutex};

pub use errors::ScriptError;
use evm_signer_transport::{async_trait, DeviceRequest, HostAnswer, HostLink};
use log::info;

#[derive(Default)]
struct Script {
    answers: VecDeque<HostAnswer>,
    tx_data: Option<Vec<u8>>,
    tx_offset: usize,
    requests: Vec<DeviceRequest>,
}

#[derive(Default)]
pub struct ScriptedHost {
    script: Mutex<Script>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that serves the remainder of the calldata on demand
    pub fn with_tx_data(remaining: impl Into<Vec<u8>>) -> Self {
        let host = Self::default();
        if let Ok(mut script) = host.script.lock() {
            script.tx_data = Some(remaining.into());
        }
        host
    }

    pub fn with_answers(answers: impl IntoIterator<Item = HostAnswer>) -> Self {
        let host = Self::default();
        for answer in answers {
            host.push(answer);
        }
        host
    }

    /// Queue one more answer
    pub fn push(&self, answer: HostAnswer) {
        if let Ok(mut script) = self.script.lock() {
            script.answers.push_back(answer);
        }
    }

    /// Every request the device made so far
    pub fn requests(&self) -> Vec<DeviceRequest> {
        self.script
            .lock()
            .map(|script| script.requests.clone())
            .unwrap_or_default()
    }

    /// Queued answers that were never asked for
    pub fn pending_answers(&self) -> usize {
        self.script
            .lock()
            .map(|script| script.answers.len())
            .unwrap_or_default()
    }

    /// Streamed calldata bytes not yet served
    pub fn pending_tx_data(&self) -> usize {
        self.script
            .lock()
            .map(|script| {
                script
                    .tx_data
                    .as_ref()
                    .map_or(0, |data| data.len() - script.tx_offset)
            })
            .unwrap_or_default()
    }

    fn answer(&self, request: DeviceRequest) -> Result<HostAnswer, ScriptError> {
        let mut script = self.script.lock().map_err(|_| ScriptError::Poisoned)?;
        info!("[host] << {:?}", request);
        script.requests.push(request.clone());

        if let (DeviceRequest::TxData { data_length }, Some(data)) =
            (&request, script.tx_data.as_ref())
        {
            let start = script.tx_offset;
            if start >= data.len() {
                return Err(ScriptError::DataExhausted {
                    requested: *data_length,
                });
            }
            let end = std::cmp::min(start + *data_length as usize, data.len());
            let chunk = data[start..end].to_vec();
            script.tx_offset = end;

            info!("[host] >> TxAck [{:4}] {}", chunk.len(), hex::encode(&chunk));
            return Ok(HostAnswer::TxAck { data_chunk: chunk });
        }

        let answer = script
            .answers
            .pop_front()
            .ok_or_else(|| ScriptError::Exhausted(format!("{:?}", request)))?;
        info!("[host] >> {}", answer.name());
        Ok(answer)
    }
}

#[async_trait]
impl HostLink for ScriptedHost {
    type Error = ScriptError;

    async fn exchange(&self, request: DeviceRequest) -> Result<HostAnswer, Self::Error> {
        self.answer(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_serves_requested_chunk_sizes() {
        init();
        let host = ScriptedHost::with_tx_data((0u8..=255).collect::<Vec<_>>());

        let first = block_on(host.exchange(DeviceRequest::TxData { data_length: 100 })).unwrap();
        let second = block_on(host.exchange(DeviceRequest::TxData { data_length: 200 })).unwrap();

        assert_eq!(
            first,
            HostAnswer::TxAck {
                data_chunk: (0u8..100).collect()
            }
        );
        assert_eq!(
            second,
            HostAnswer::TxAck {
                data_chunk: (100u8..=255).collect()
            }
        );
        assert_eq!(host.pending_tx_data(), 0);
        assert_eq!(host.requests().len(), 2);
    }

    #[test]
    fn test_replays_answers_in_order() {
        init();
        let host = ScriptedHost::with_answers([
            HostAnswer::TypedDataValueAck { value: vec![1] },
            HostAnswer::TypedDataValueAck { value: vec![2] },
        ]);

        let request = DeviceRequest::TypedDataValue {
            member_path: vec![0, 0],
        };
        assert_eq!(
            block_on(host.exchange(request.clone())).unwrap(),
            HostAnswer::TypedDataValueAck { value: vec![1] }
        );
        assert_eq!(host.pending_answers(), 1);
        assert_eq!(
            block_on(host.exchange(request.clone())).unwrap(),
            HostAnswer::TypedDataValueAck { value: vec![2] }
        );
        assert!(matches!(
            block_on(host.exchange(request)),
            Err(ScriptError::Exhausted(_))
        ));
    }

    #[test]
    fn test_data_exhausted() {
        init();
        let host = ScriptedHost::with_tx_data(vec![0xAB; 4]);

        block_on(host.exchange(DeviceRequest::TxData { data_length: 4 })).unwrap();
        assert_eq!(
            block_on(host.exchange(DeviceRequest::TxData { data_length: 4 })),
            Err(ScriptError::DataExhausted { requested: 4 })
        );
    }
}
