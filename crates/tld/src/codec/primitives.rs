//! Primitive encoding/decoding for the TLD binary format.
//!
//! Implements fixed-width unsigned integers in either byte order, the
//! minimal-width calculation used for tag and length fields, and the ASCII
//! hex variant of those fields.

use crate::error::{DecodeError, EncodeError};
use crate::limits::MAX_FIELD_WIDTH;
use crate::options::Endian;

// =============================================================================
// WIDTHS
// =============================================================================

/// Byte width of an unsigned integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Width {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl Width {
    /// Number of bytes this width occupies.
    #[inline]
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Smallest width whose unsigned range covers `value`.
    #[inline]
    pub fn minimal(value: u64) -> Width {
        if value <= u8::MAX as u64 {
            Width::One
        } else if value <= u16::MAX as u64 {
            Width::Two
        } else if value <= u32::MAX as u64 {
            Width::Four
        } else {
            Width::Eight
        }
    }

    /// Maps a byte count to a width, if it is one of 1, 2, 4 or 8.
    pub fn from_bytes(n: usize) -> Option<Width> {
        match n {
            1 => Some(Width::One),
            2 => Some(Width::Two),
            4 => Some(Width::Four),
            8 => Some(Width::Eight),
            _ => None,
        }
    }

    /// Two-bit code stored in the control byte.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Width::One => 0,
            Width::Two => 1,
            Width::Four => 2,
            Width::Eight => 3,
        }
    }

    /// Inverse of [`Width::code`]; only the low two bits are used.
    #[inline]
    pub fn from_code(code: u8) -> Width {
        match code & 0b11 {
            0 => Width::One,
            1 => Width::Two,
            2 => Width::Four,
            _ => Width::Eight,
        }
    }

    /// Largest value representable in this width.
    pub fn max_value(self) -> u64 {
        match self {
            Width::One => u8::MAX as u64,
            Width::Two => u16::MAX as u64,
            Width::Four => u32::MAX as u64,
            Width::Eight => u64::MAX,
        }
    }

    pub fn fits(self, value: u64) -> bool {
        value <= self.max_value()
    }

    /// Whether tag and length fields may use this width.
    pub fn is_field_width(self) -> bool {
        self.bytes() <= MAX_FIELD_WIDTH
    }
}

/// Smallest of {1, 2, 4, 8} bytes able to hold `value`.
///
/// Callers building numeric nodes by hand use this to size their payload.
#[inline]
pub fn minimal_width(value: u64) -> Width {
    Width::minimal(value)
}

/// Assembles an unsigned integer from the first `width` bytes of `bytes`.
pub fn read_unsigned(bytes: &[u8], width: Width, endian: Endian) -> Result<u64, DecodeError> {
    let mut reader = Reader::new(bytes);
    reader.read_unsigned(width, endian, "unsigned")
}

/// Writes `value` in exactly `width` bytes.
///
/// Fails with a length overflow if `value` does not fit.
pub fn write_unsigned(value: u64, width: Width, endian: Endian) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::with_capacity(width.bytes());
    writer.write_unsigned(value, width, endian, "unsigned")?;
    Ok(writer.into_bytes())
}

#[inline]
fn unsigned_from_bytes(bytes: &[u8], endian: Endian) -> u64 {
    match endian {
        Endian::Big => bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64),
        Endian::Little => bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | b as u64),
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives
/// with bounds checking and error handling.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let bytes = self.read_bytes(1, context)?;
        Ok(bytes[0])
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining_len();
        if n > available {
            return Err(DecodeError::UnexpectedEof {
                context,
                needed: n,
                available,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads an unsigned integer of the given width and byte order.
    #[inline]
    pub fn read_unsigned(
        &mut self,
        width: Width,
        endian: Endian,
        context: &'static str,
    ) -> Result<u64, DecodeError> {
        let bytes = self.read_bytes(width.bytes(), context)?;
        Ok(unsigned_from_bytes(bytes, endian))
    }

    /// Reads an unsigned integer written as `2 * width` ASCII hex digits.
    pub fn read_hex(&mut self, width: Width, context: &'static str) -> Result<u64, DecodeError> {
        let digits = self.read_bytes(width.bytes() * 2, context)?;
        digits.iter().try_fold(0u64, |acc, &byte| {
            let nibble = hex_value(byte).ok_or(DecodeError::InvalidHexDigit { byte, context })?;
            Ok((acc << 4) | nibble as u64)
        })
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

// =============================================================================
// ENCODING
// =============================================================================

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes an unsigned integer in exactly `width` bytes.
    #[inline]
    pub fn write_unsigned(
        &mut self,
        value: u64,
        width: Width,
        endian: Endian,
        field: &'static str,
    ) -> Result<(), EncodeError> {
        if !width.fits(value) {
            return Err(EncodeError::ValueTooWide {
                field,
                value,
                width: width.bytes(),
            });
        }
        let n = width.bytes();
        match endian {
            Endian::Big => self.buf.extend_from_slice(&value.to_be_bytes()[8 - n..]),
            Endian::Little => self.buf.extend_from_slice(&value.to_le_bytes()[..n]),
        }
        Ok(())
    }

    /// Writes an unsigned integer as `2 * width` uppercase ASCII hex digits.
    pub fn write_hex(&mut self, value: u64, width: Width, field: &'static str) -> Result<(), EncodeError> {
        if !width.fits(value) {
            return Err(EncodeError::ValueTooWide {
                field,
                value,
                width: width.bytes(),
            });
        }
        for shift in (0..width.bytes() * 2).rev() {
            let nibble = (value >> (shift * 4)) & 0xF;
            self.buf.push(HEX_DIGITS[nibble as usize]);
        }
        Ok(())
    }
}
