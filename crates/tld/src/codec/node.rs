//! Record encoding/decoding: control byte, tag, length and payload.

use std::borrow::Cow;

use tracing::trace;

use crate::codec::control::Control;
use crate::codec::primitives::{Reader, Width, Writer};
use crate::codec::tree::{decode_chain, encode_chain};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MAX_NESTING_DEPTH, MAX_PAYLOAD_LEN};
use crate::model::{Node, Payload};
use crate::options::{Mode, Options, WireFormat};

/// A decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub control: Control,
    pub tag: u32,
    pub length: usize,
    /// Bytes occupied by the header on the wire.
    pub size: usize,
}

// =============================================================================
// ENCODING
// =============================================================================

/// Bytes that go on the wire as the node's payload.
///
/// Expanded embedded nodes are re-encoded from their children so the output
/// never depends on a stale cached length. An unexpanded embedded payload
/// is copied through when its mode and byte order match `options`, and
/// transcoded record by record otherwise.
fn wire_payload<'n>(node: &'n Node<'_>, options: Options) -> Result<Cow<'n, [u8]>, EncodeError> {
    if let Some(children) = node.embedded() {
        return Ok(Cow::Owned(encode_chain(children, options)?));
    }
    match node.payload_format() {
        Some(format) if node.is_embedded() && format != WireFormat::of(options) => {
            let decode_options = format.apply(options) - Options::DECODE_ONLY_TOP_LEVEL - Options::COPYDATA;
            let children = decode_chain(node.data(), decode_options, 1).map_err(|source| {
                EncodeError::InvalidEmbeddedPayload {
                    tag: node.tag(),
                    source,
                }
            })?;
            Ok(Cow::Owned(encode_chain(&children, options)?))
        }
        _ => Ok(Cow::Borrowed(node.data())),
    }
}

fn field_width(
    pinned: Option<Width>,
    value: u64,
    options: Options,
    field: &'static str,
) -> Result<Width, EncodeError> {
    let width = match pinned {
        Some(width) if options.contains(Options::OVERRIDE) => width,
        _ => Width::minimal(value),
    };
    if !width.is_field_width() {
        return Err(EncodeError::UnsupportedWidth {
            field,
            width: width.bytes(),
        });
    }
    Ok(width)
}

fn write_field(
    writer: &mut Writer,
    value: u64,
    width: Width,
    options: Options,
    field: &'static str,
) -> Result<(), EncodeError> {
    match options.mode() {
        Mode::Binary => writer.write_unsigned(value, width, options.endian(), field),
        Mode::Ascii => writer.write_hex(value, width, field),
    }
}

/// Writes a header describing `length` payload bytes for `node`.
fn write_header(
    writer: &mut Writer,
    node: &Node<'_>,
    length: usize,
    options: Options,
) -> Result<(), EncodeError> {
    let length = length as u64;
    if length > MAX_PAYLOAD_LEN {
        return Err(EncodeError::ValueTooWide {
            field: "length",
            value: length,
            width: Width::Four.bytes(),
        });
    }
    let local = node.effective_options(options);
    let tag_width = field_width(node.tag_width(), node.tag() as u64, local, "tag")?;
    let length_width = field_width(node.length_width(), length, local, "length")?;

    let control = Control {
        mode: options.mode(),
        length_width,
        embedded: node.is_embedded(),
        tag_width,
    };
    writer.write_byte(control.to_byte());
    write_field(writer, node.tag() as u64, tag_width, options, "tag")?;
    write_field(writer, length, length_width, options, "length")?;
    Ok(())
}

/// Appends one complete record (header and payload) for `node`.
pub(crate) fn write_node(writer: &mut Writer, node: &Node<'_>, options: Options) -> Result<(), EncodeError> {
    let payload = wire_payload(node, options)?;
    write_header(writer, node, payload.len(), options)?;
    writer.write_bytes(&payload);
    trace!(tag = node.tag(), length = payload.len(), "encoded record");
    Ok(())
}

/// Encodes only the header of `node`: control byte, tag and length.
pub fn encode_header(node: &Node<'_>, options: Options) -> Result<Vec<u8>, EncodeError> {
    let payload = wire_payload(node, options)?;
    let mut writer = Writer::with_capacity(1 + 2 * Width::Four.bytes());
    write_header(&mut writer, node, payload.len(), options)?;
    Ok(writer.into_bytes())
}

/// Encodes `node` as one record, ignoring any peers it may have.
pub fn encode_node(node: &Node<'_>, options: Options) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    write_node(&mut writer, node, options)?;
    Ok(writer.into_bytes())
}

// =============================================================================
// DECODING
// =============================================================================

fn read_field(
    reader: &mut Reader<'_>,
    width: Width,
    options: Options,
    field: &'static str,
) -> Result<u64, DecodeError> {
    match options.mode() {
        Mode::Binary => reader.read_unsigned(width, options.endian(), field),
        Mode::Ascii => reader.read_hex(width, field),
    }
}

pub(crate) fn read_header(reader: &mut Reader<'_>, options: Options) -> Result<Header, DecodeError> {
    let start = reader.position();
    let control = Control::from_byte(reader.read_byte("control")?);

    let expected = options.mode();
    if control.mode != expected {
        return Err(DecodeError::ModeMismatch {
            expected: expected.name(),
            found: control.mode.name(),
        });
    }
    for (field, width) in [("tag", control.tag_width), ("length", control.length_width)] {
        if !width.is_field_width() {
            return Err(DecodeError::UnsupportedWidth {
                field,
                width: width.bytes(),
            });
        }
    }

    // both fields are at most four bytes wide
    let tag = read_field(reader, control.tag_width, options, "tag")? as u32;
    let length = read_field(reader, control.length_width, options, "length")? as usize;

    Ok(Header {
        control,
        tag,
        length,
        size: reader.position() - start,
    })
}

pub(crate) fn read_node<'a>(
    reader: &mut Reader<'a>,
    options: Options,
    depth: usize,
) -> Result<Node<'a>, DecodeError> {
    let header = read_header(reader, options)?;
    let bytes = reader.read_bytes(header.length, "payload")?;

    let embedded = if header.control.embedded && !options.contains(Options::DECODE_ONLY_TOP_LEVEL) {
        if depth >= MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        Some(decode_chain(bytes, options, depth + 1)?)
    } else {
        None
    };

    let data = if options.copies_data() {
        Payload::try_copied(bytes)?
    } else {
        Payload::borrowed(bytes)
    };

    trace!(
        tag = header.tag,
        length = header.length,
        embedded = header.control.embedded,
        depth,
        "decoded record"
    );
    Ok(Node::from_decoded(
        header.tag,
        data,
        header.control.embedded,
        embedded,
        WireFormat::of(options),
    ))
}

/// Decodes the header at the start of `input`.
pub fn decode_header(input: &[u8], options: Options) -> Result<Header, DecodeError> {
    read_header(&mut Reader::new(input), options)
}

/// Decodes the record at the start of `input`, returning it with the number
/// of bytes consumed. Bytes after the record are left alone.
pub fn decode_node(input: &[u8], options: Options) -> Result<(Node<'_>, usize), DecodeError> {
    let mut reader = Reader::new(input);
    let node = read_node(&mut reader, options, 0)?;
    Ok((node, reader.position()))
}
