//! Binary encoding/decoding for TLD streams.
//!
//! Three layers, leaf first: fixed-width primitives, single records
//! (control byte, tag, length, payload), and chains of peers with their
//! embedded children.

pub mod control;
pub mod node;
pub mod primitives;
pub mod tree;

pub use control::Control;
pub use node::{decode_header, decode_node, encode_header, encode_node, Header};
pub use primitives::{minimal_width, read_unsigned, write_unsigned, Reader, Width, Writer};
pub use tree::{decode, decode_owned, decode_with_options, encode, encode_with_options};
