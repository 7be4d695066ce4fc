//! TLD: a compact Tag-Length-Data binary tree codec.
//!
//! Every record is a control byte, a tag, a length and a payload. A payload
//! is either opaque bytes or, when the control byte's embedded bit is set,
//! a further chain of records. Peers follow each other on the wire, so a
//! stream decodes into a [`Chain`] of [`Node`]s and each embedded node owns
//! a child chain of its own.
//!
//! # Quick Start
//!
//! ```rust
//! use tld::{decode_with_options, encode_with_options, ChainBuilder, Options};
//!
//! let options = Options::COPYDATA;
//! let inventory = ChainBuilder::new(options)
//!     .container(0x10, |b| b
//!         .string(0x11, "enclosure 0")
//!         .number(0x12, 15)
//!     )
//!     .build()
//!     .unwrap();
//!
//! let bytes = encode_with_options(&inventory, options).unwrap();
//! let decoded = decode_with_options(&bytes, options).unwrap();
//!
//! assert_eq!(decoded.get_string(0x11, options).unwrap(), "enclosure 0");
//! assert_eq!(decoded.get_number(0x12, options).unwrap(), 15);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Nodes, chains, payload storage and the chain builder
//! - [`codec`]: Wire primitives and record/tree encoding and decoding
//! - [`search`]: Tag search and typed value access
//! - [`validate`]: Structural checks on in-memory trees
//! - [`util`]: Human-readable dumps
//! - [`options`]: Option flags and the process-wide defaults
//! - [`error`]: Error types
//! - [`limits`]: Decoder limits
//!
//! # Wire Format
//!
//! The control byte holds the mode (bit 7), the length width code
//! (bits 4-3), the embedded flag (bit 2) and the tag width code (bits 1-0).
//! Widths are 1, 2 or 4 bytes. In binary mode tag and length are unsigned
//! integers in the requested byte order; in ASCII mode they are uppercase
//! hex text, two characters per byte.
//!
//! # Security
//!
//! The decoder handles untrusted input: every length is checked against the
//! remaining bytes before anything is read or allocated, and embedded
//! records nest at most [`limits::MAX_NESTING_DEPTH`] levels deep.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod options;
pub mod search;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{
    decode, decode_header, decode_node, decode_owned, decode_with_options, encode, encode_header,
    encode_node, encode_with_options, minimal_width, read_unsigned, write_unsigned, Control,
    Header, Width,
};
pub use error::{DecodeError, EncodeError, ErrorKind, TreeError, ValidationError};
pub use model::{Chain, ChainBuilder, Node, Payload};
pub use options::{Endian, Mode, Options, OrThrow, WireFormat};
pub use search::{read_number, read_string};
pub use util::dump;
pub use validate::validate_chain;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
