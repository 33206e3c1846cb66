// SPDX-License-Identifier: Apache-2.0

//! Recursive Length Prefix codec
//!
//! Encoding is streaming: items are written straight into a [`Sink`] (in practice
//! the Keccak hasher) and list headers are computed up front from
//! [`encoded_length`], so nothing is buffered. Decoding is strict and rejects
//! non-canonical input.

use num_bigint::BigUint;
use thiserror::Error;

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xC0;
const SHORT_PAYLOAD_MAX: usize = 55;

/// Anything that accepts encoded bytes
pub trait Sink {
    fn absorb(&mut self, bytes: &[u8]);
}

impl Sink for Vec<u8> {
    fn absorb(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    String,
    List,
}

/// A single RLP string
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Item<'a> {
    /// Written exactly as given
    Bytes(&'a [u8]),
    /// Big-endian unsigned integer; leading zero bytes are dropped
    UintBytes(&'a [u8]),
    Uint(u64),
}

impl Item<'_> {
    fn with_payload<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        match self {
            Item::Bytes(bytes) => f(bytes),
            Item::UintBytes(bytes) => f(trim_leading_zeros(bytes)),
            Item::Uint(value) => {
                let bytes = value.to_be_bytes();
                f(trim_leading_zeros(&bytes))
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RlpError {
    #[error("input ends inside an item")]
    UnexpectedEnd,
    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),
    #[error("{0} trailing bytes after the item")]
    TrailingBytes(usize),
    #[error("declared length does not fit")]
    LengthOverflow,
    #[error("expected a byte string, found a list")]
    ExpectedBytes,
    #[error("expected a list, found a byte string")]
    ExpectedList,
    #[error("integer is wider than {0} bits")]
    IntegerOverflow(u32),
}

pub(crate) fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

fn length_of_length(payload_length: usize) -> usize {
    let bytes = (payload_length as u64).to_be_bytes();
    trim_leading_zeros(&bytes).len()
}

/// Size of the header in front of a payload of `payload_length` bytes
pub fn header_length(payload_length: usize) -> usize {
    if payload_length <= SHORT_PAYLOAD_MAX {
        1
    } else {
        1 + length_of_length(payload_length)
    }
}

/// Encoded size of a byte string payload
pub fn string_length(payload: &[u8]) -> usize {
    if payload.len() == 1 && payload[0] < STRING_OFFSET {
        1
    } else {
        header_length(payload.len()) + payload.len()
    }
}

pub fn encoded_length(item: &Item<'_>) -> usize {
    item.with_payload(string_length)
}

/// Encoded size of a list whose items take `payload_length` bytes together
pub fn list_length(payload_length: usize) -> usize {
    header_length(payload_length) + payload_length
}

pub fn write_header<S: Sink + ?Sized>(sink: &mut S, payload_length: usize, kind: Kind) {
    let offset = match kind {
        Kind::String => STRING_OFFSET,
        Kind::List => LIST_OFFSET,
    };
    if payload_length <= SHORT_PAYLOAD_MAX {
        sink.absorb(&[offset + payload_length as u8]);
    } else {
        let bytes = (payload_length as u64).to_be_bytes();
        let length = trim_leading_zeros(&bytes);
        sink.absorb(&[offset + SHORT_PAYLOAD_MAX as u8 + length.len() as u8]);
        sink.absorb(length);
    }
}

pub fn write<S: Sink + ?Sized>(sink: &mut S, item: &Item<'_>) {
    item.with_payload(|payload| {
        if payload.len() == 1 && payload[0] < STRING_OFFSET {
            sink.absorb(payload);
        } else {
            write_header(sink, payload.len(), Kind::String);
            sink.absorb(payload);
        }
    })
}

pub fn encode(item: &Item<'_>) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_length(item));
    write(&mut out, item);
    out
}

pub fn encode_list(items: &[Item<'_>]) -> Vec<u8> {
    let payload_length = items.iter().map(encoded_length).sum();
    let mut out = Vec::with_capacity(list_length(payload_length));
    write_header(&mut out, payload_length, Kind::List);
    for item in items {
        write(&mut out, item);
    }
    out
}

/// Encoded size of a byte string that is streamed rather than held in memory
///
/// `first_byte` is the first payload byte when known; a lone byte below 0x80 is
/// its own encoding.
pub fn streamed_string_length(payload_length: usize, first_byte: Option<u8>) -> usize {
    match (payload_length, first_byte) {
        (1, Some(byte)) if byte < STRING_OFFSET => 1,
        _ => header_length(payload_length) + payload_length,
    }
}

/// Header of a streamed byte string, nothing for a lone byte below 0x80
pub fn write_streamed_header<S: Sink + ?Sized>(
    sink: &mut S,
    payload_length: usize,
    first_byte: Option<u8>,
) {
    if let (1, Some(byte)) = (payload_length, first_byte) {
        if byte < STRING_OFFSET {
            return;
        }
    }
    write_header(sink, payload_length, Kind::String);
}

/// A decoded RLP item borrowing from the input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded<'a> {
    Bytes(&'a [u8]),
    List(Vec<Decoded<'a>>),
}

impl<'a> Decoded<'a> {
    pub fn as_bytes(&self) -> Result<&'a [u8], RlpError> {
        match self {
            Decoded::Bytes(bytes) => Ok(bytes),
            Decoded::List(_) => Err(RlpError::ExpectedBytes),
        }
    }

    pub fn as_list(&self) -> Result<&[Decoded<'a>], RlpError> {
        match self {
            Decoded::List(items) => Ok(items),
            Decoded::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    /// Canonical unsigned integer: no leading zero bytes
    pub fn to_biguint(&self) -> Result<BigUint, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(RlpError::NonCanonical("integer with leading zero"));
        }
        Ok(BigUint::from_bytes_be(bytes))
    }

    pub fn to_u64(&self) -> Result<u64, RlpError> {
        let value = self.to_biguint()?;
        u64::try_from(&value).map_err(|_| RlpError::IntegerOverflow(64))
    }
}

/// Decode exactly one item spanning the whole input
pub fn decode(input: &[u8]) -> Result<Decoded<'_>, RlpError> {
    let (item, used) = decode_item(input)?;
    if used != input.len() {
        return Err(RlpError::TrailingBytes(input.len() - used));
    }
    Ok(item)
}

fn slice(input: &[u8], start: usize, length: usize) -> Result<&[u8], RlpError> {
    let end = start.checked_add(length).ok_or(RlpError::LengthOverflow)?;
    input.get(start..end).ok_or(RlpError::UnexpectedEnd)
}

fn read_long_length(input: &[u8], length_of_length: usize) -> Result<usize, RlpError> {
    let bytes = slice(input, 1, length_of_length)?;
    if bytes[0] == 0 {
        return Err(RlpError::NonCanonical("length with leading zero"));
    }
    let mut length: u64 = 0;
    for byte in bytes {
        length = (length << 8) | u64::from(*byte);
    }
    let length = usize::try_from(length).map_err(|_| RlpError::LengthOverflow)?;
    if length <= SHORT_PAYLOAD_MAX {
        return Err(RlpError::NonCanonical("long form for a short payload"));
    }
    Ok(length)
}

fn decode_item(input: &[u8]) -> Result<(Decoded<'_>, usize), RlpError> {
    let first = *input.first().ok_or(RlpError::UnexpectedEnd)?;
    match first {
        0x00..=0x7f => Ok((Decoded::Bytes(&input[..1]), 1)),
        0x80..=0xb7 => {
            let length = usize::from(first - STRING_OFFSET);
            let payload = slice(input, 1, length)?;
            if length == 1 && payload[0] < STRING_OFFSET {
                return Err(RlpError::NonCanonical("single byte with a header"));
            }
            Ok((Decoded::Bytes(payload), 1 + length))
        }
        0xb8..=0xbf => {
            let length_of_length = usize::from(first - 0xb7);
            let length = read_long_length(input, length_of_length)?;
            let payload = slice(input, 1 + length_of_length, length)?;
            Ok((Decoded::Bytes(payload), 1 + length_of_length + length))
        }
        0xc0..=0xf7 => {
            let length = usize::from(first - LIST_OFFSET);
            let payload = slice(input, 1, length)?;
            Ok((Decoded::List(decode_list(payload)?), 1 + length))
        }
        0xf8..=0xff => {
            let length_of_length = usize::from(first - 0xf7);
            let length = read_long_length(input, length_of_length)?;
            let payload = slice(input, 1 + length_of_length, length)?;
            Ok((
                Decoded::List(decode_list(payload)?),
                1 + length_of_length + length,
            ))
        }
    }
}

fn decode_list(mut payload: &[u8]) -> Result<Vec<Decoded<'_>>, RlpError> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, used) = decode_item(payload)?;
        items.push(item);
        payload = &payload[used..];
    }
    Ok(items)
}
