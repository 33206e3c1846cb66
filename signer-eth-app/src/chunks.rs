// SPDX-License-Identifier: Apache-2.0

//! Pulls the calldata that did not fit into the signing request

use evm_signer_transport::{DeviceRequest, HostAnswer, HostLink};
use log::debug;

use crate::constants::length;
use crate::errors::{EthSignError, EthSignResult};
use crate::rlp::Sink;

/// Requests the remaining calldata in chunks of at most 1024 bytes
pub struct ChunkedReader<'a, H: ?Sized> {
    link: &'a H,
    remaining: u32,
}

impl<'a, H> ChunkedReader<'a, H>
where
    H: HostLink + Sync + ?Sized,
    H::Error: std::error::Error,
{
    /// `data_length` is the total; the initial chunk has already been consumed
    pub fn new(link: &'a H, data_length: u32, initial_chunk_len: usize) -> Self {
        ChunkedReader {
            link,
            remaining: data_length.saturating_sub(initial_chunk_len as u32),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Next chunk from the host, `None` once everything arrived
    pub async fn next_chunk(&mut self) -> EthSignResult<Option<Vec<u8>>, H::Error> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let requested = std::cmp::min(self.remaining, length::MAX_CHUNK_SIZE as u32);
        debug!("requesting {} bytes, {} remaining", requested, self.remaining);
        let answer = self
            .link
            .exchange(DeviceRequest::TxData {
                data_length: requested,
            })
            .await
            .map_err(EthSignError::Link)?;

        let chunk = match answer {
            HostAnswer::TxAck { data_chunk } => data_chunk,
            other => {
                return Err(EthSignError::Protocol(format!(
                    "expected TxAck, got {}",
                    other.name()
                )))
            }
        };
        if chunk.is_empty() || chunk.len() > requested as usize {
            return Err(EthSignError::Protocol(format!(
                "invalid data chunk of {} bytes, requested {}",
                chunk.len(),
                requested
            )));
        }

        self.remaining -= chunk.len() as u32;
        Ok(Some(chunk))
    }

    /// Feed every remaining chunk into `sink`
    pub async fn stream_into<S>(mut self, sink: &mut S) -> EthSignResult<(), H::Error>
    where
        S: Sink + Send + ?Sized,
    {
        while let Some(chunk) = self.next_chunk().await? {
            sink.absorb(&chunk);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keccak::{keccak256, Keccak256Hasher};
    use evm_signer_transport_script::{ScriptError, ScriptedHost};
    use futures::executor::block_on;

    #[test]
    fn test_requests_bounded_chunks() {
        let data: Vec<u8> = (0..3000u32).map(|i| i as u8).collect();
        let host = ScriptedHost::with_tx_data(data[1024..].to_vec());

        let mut hasher = Keccak256Hasher::new();
        hasher.absorb(&data[..1024]);
        block_on(ChunkedReader::new(&host, 3000, 1024).stream_into(&mut hasher)).unwrap();

        assert_eq!(hasher.finalize(), keccak256(&data));
        assert_eq!(
            host.requests(),
            vec![
                DeviceRequest::TxData { data_length: 1024 },
                DeviceRequest::TxData { data_length: 952 },
            ]
        );
    }

    #[test]
    fn test_nothing_to_read() {
        let host = ScriptedHost::new();
        let mut sink = Vec::new();
        block_on(ChunkedReader::new(&host, 10, 10).stream_into(&mut sink)).unwrap();

        assert!(sink.is_empty());
        assert!(host.requests().is_empty());
    }

    #[test]
    fn test_short_chunks_are_accepted() {
        let host = ScriptedHost::with_answers([
            HostAnswer::TxAck {
                data_chunk: vec![1; 10],
            },
            HostAnswer::TxAck {
                data_chunk: vec![2; 10],
            },
        ]);
        let mut sink = Vec::new();
        block_on(ChunkedReader::new(&host, 20, 0).stream_into(&mut sink)).unwrap();

        assert_eq!(sink.len(), 20);
        assert_eq!(
            host.requests()[1],
            DeviceRequest::TxData { data_length: 10 }
        );
    }

    #[test]
    fn test_oversized_chunk_is_protocol_error() {
        let host = ScriptedHost::with_answers([HostAnswer::TxAck {
            data_chunk: vec![0; 11],
        }]);
        let mut reader = ChunkedReader::new(&host, 10, 0);

        assert!(matches!(
            block_on(reader.next_chunk()),
            Err(EthSignError::Protocol(_))
        ));
    }

    #[test]
    fn test_empty_chunk_is_protocol_error() {
        let host = ScriptedHost::with_answers([HostAnswer::TxAck { data_chunk: vec![] }]);
        let mut reader = ChunkedReader::new(&host, 10, 0);

        assert!(matches!(
            block_on(reader.next_chunk()),
            Err(EthSignError::Protocol(_))
        ));
    }

    #[test]
    fn test_wrong_answer_and_link_failure() {
        let host = ScriptedHost::with_answers([HostAnswer::TypedDataValueAck { value: vec![] }]);
        let mut reader = ChunkedReader::new(&host, 10, 0);
        assert!(matches!(
            block_on(reader.next_chunk()),
            Err(EthSignError::Protocol(_))
        ));

        let exhausted = ScriptedHost::new();
        let mut reader = ChunkedReader::new(&exhausted, 10, 0);
        match block_on(reader.next_chunk()) {
            Err(EthSignError::Link(ScriptError::Exhausted(_))) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
