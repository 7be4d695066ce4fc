//! Whole-stream encoding/decoding: a chain of peers, recursively.

use tracing::debug;

use crate::codec::node::{read_node, write_node};
use crate::codec::primitives::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::model::Chain;
use crate::options::{self, Options};

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes every record of `chain` into `writer`, children before parents.
pub(crate) fn write_chain(writer: &mut Writer, chain: &Chain<'_>, options: Options) -> Result<(), EncodeError> {
    for node in chain {
        write_node(writer, node, options)?;
    }
    Ok(())
}

pub(crate) fn encode_chain(chain: &Chain<'_>, options: Options) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::with_capacity(chain.len() * 8);
    write_chain(&mut writer, chain, options)?;
    Ok(writer.into_bytes())
}

/// Encodes a chain using the process-wide default options.
pub fn encode(chain: &Chain<'_>) -> Result<Vec<u8>, EncodeError> {
    encode_with_options(chain, options::global())
}

/// Encodes a chain with the given options.
///
/// Byte order and mode come from `options`; width overrides may also come
/// from a node's local options.
pub fn encode_with_options(chain: &Chain<'_>, options: Options) -> Result<Vec<u8>, EncodeError> {
    let bytes = encode_chain(chain, options)?;
    debug!(peers = chain.len(), bytes = bytes.len(), "encoded chain");
    Ok(bytes)
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes consecutive records until `input` is exhausted.
///
/// The input must end exactly at a record boundary.
pub(crate) fn decode_chain<'a>(input: &'a [u8], options: Options, depth: usize) -> Result<Chain<'a>, DecodeError> {
    let mut reader = Reader::new(input);
    let mut chain = Chain::new();
    while !reader.is_empty() {
        chain.add_peer(read_node(&mut reader, options, depth)?);
    }
    Ok(chain)
}

/// Decodes a stream using the process-wide default options.
pub fn decode(input: &[u8]) -> Result<Chain<'_>, DecodeError> {
    decode_with_options(input, options::global())
}

/// Decodes a stream with the given options.
///
/// Without `COPYDATA` every payload borrows from `input`.
pub fn decode_with_options(input: &[u8], options: Options) -> Result<Chain<'_>, DecodeError> {
    let chain = decode_chain(input, options, 0)?;
    debug!(peers = chain.len(), bytes = input.len(), "decoded chain");
    Ok(chain)
}

/// Decodes a stream into a tree that owns all of its payloads.
pub fn decode_owned(input: &[u8], options: Options) -> Result<Chain<'static>, DecodeError> {
    decode_with_options(input, options | Options::COPYDATA).map(Chain::into_owned)
}
