//! Decoder limits and fixed sizes of the TLD format.

/// Payloads up to this many bytes are stored inline in the node.
pub const INLINE_PAYLOAD_CAPACITY: usize = 32;

/// Maximum depth of embedded chains the decoder will expand.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Widest tag or length field on the wire, in bytes.
pub const MAX_FIELD_WIDTH: usize = 4;

/// Largest payload a single record can describe.
pub const MAX_PAYLOAD_LEN: u64 = u32::MAX as u64;
