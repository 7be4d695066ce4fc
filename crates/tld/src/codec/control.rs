//! The control byte that leads every record.
//!
//! Bit layout, most significant bit first:
//!
//! ```text
//!   7      6 5        4 3          2          1 0
//! +------+----------+------------+----------+-----------+
//! | mode | reserved | length_w   | embedded | tag_w     |
//! +------+----------+------------+----------+-----------+
//! ```
//!
//! Width codes are `0 → 1`, `1 → 2`, `2 → 4`, `3 → 8` bytes. Reserved bits are
//! written as zero and ignored on read.

use crate::codec::primitives::Width;
use crate::options::Mode;

const MODE_BIT: u8 = 0b1000_0000;
const LENGTH_WIDTH_SHIFT: u8 = 3;
const EMBEDDED_BIT: u8 = 0b0000_0100;
const TAG_WIDTH_MASK: u8 = 0b0000_0011;

/// Decoded control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Control {
    pub mode: Mode,
    pub length_width: Width,
    pub embedded: bool,
    pub tag_width: Width,
}

impl Control {
    /// Packs the fields into a wire byte.
    pub fn to_byte(self) -> u8 {
        let mut byte = 0u8;
        if self.mode == Mode::Ascii {
            byte |= MODE_BIT;
        }
        byte |= self.length_width.code() << LENGTH_WIDTH_SHIFT;
        if self.embedded {
            byte |= EMBEDDED_BIT;
        }
        byte | self.tag_width.code()
    }

    /// Unpacks a wire byte. Never fails; widths are checked by the caller.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            mode: if byte & MODE_BIT != 0 { Mode::Ascii } else { Mode::Binary },
            length_width: Width::from_code(byte >> LENGTH_WIDTH_SHIFT),
            embedded: byte & EMBEDDED_BIT != 0,
            tag_width: Width::from_code(byte & TAG_WIDTH_MASK),
        }
    }
}
