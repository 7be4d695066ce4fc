//! Error types for TLD encoding, decoding and tree operations.

use thiserror::Error;

/// Error kinds shared by every TLD error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// T001: Record mode does not match the requested mode
    UnsupportedMode,
    /// T002: Field width outside the supported set
    UnsupportedLength,
    /// T003: More matches than the caller allows
    MultipleTagsFound,
    /// T004: Required tag is absent
    TagNotFound,
    /// T005: Value does not fit the chosen width
    LengthOverflow,
    /// T006: Input ends before the record does
    LengthUnderflow,
    /// T007: Payload storage could not be reserved
    MemoryAllocationFailure,
    /// T008: Payload is empty where data is required
    NullDataPointer,
    /// T009: Payload is present but malformed for the requested view
    BadDataPointer,
    /// T010: Peer or embedded index out of range
    InvalidIndex,
    /// T011: Operation does not apply to embedded (or opaque) content
    InvalidOperationOnEmbedded,
    /// T012: Embedded records nested deeper than the decoder allows
    NestingTooDeep,
}

impl ErrorKind {
    /// Returns the error code string (e.g., "T001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedMode => "T001",
            ErrorKind::UnsupportedLength => "T002",
            ErrorKind::MultipleTagsFound => "T003",
            ErrorKind::TagNotFound => "T004",
            ErrorKind::LengthOverflow => "T005",
            ErrorKind::LengthUnderflow => "T006",
            ErrorKind::MemoryAllocationFailure => "T007",
            ErrorKind::NullDataPointer => "T008",
            ErrorKind::BadDataPointer => "T009",
            ErrorKind::InvalidIndex => "T010",
            ErrorKind::InvalidOperationOnEmbedded => "T011",
            ErrorKind::NestingTooDeep => "T012",
        }
    }
}

/// Error during binary decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("[T001] record mode {found} does not match requested mode {expected}")]
    ModeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("[T001] invalid ASCII hex digit {byte:#04x} in {context}")]
    InvalidHexDigit { byte: u8, context: &'static str },

    #[error("[T002] unsupported {field} width {width} (expected 1, 2 or 4)")]
    UnsupportedWidth { field: &'static str, width: usize },

    #[error("[T006] unexpected end of input while reading {context} (need {needed}, have {available})")]
    UnexpectedEof {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("[T007] failed to reserve {len} bytes for payload")]
    AllocationFailed { len: usize },

    #[error("[T012] embedded records nested deeper than {max} levels")]
    NestingTooDeep { max: usize },
}

impl DecodeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::ModeMismatch { .. } | DecodeError::InvalidHexDigit { .. } => {
                ErrorKind::UnsupportedMode
            }
            DecodeError::UnsupportedWidth { .. } => ErrorKind::UnsupportedLength,
            DecodeError::UnexpectedEof { .. } => ErrorKind::LengthUnderflow,
            DecodeError::AllocationFailed { .. } => ErrorKind::MemoryAllocationFailure,
            DecodeError::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
        }
    }
}

/// Error during binary encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("[T005] {field} value {value} does not fit in {width} bytes")]
    ValueTooWide {
        field: &'static str,
        value: u64,
        width: usize,
    },

    #[error("[T002] unsupported {field} width {width} (expected 1, 2 or 4)")]
    UnsupportedWidth { field: &'static str, width: usize },

    #[error("[T009] tag {tag:#x} cached embedded payload cannot be transcoded: {source}")]
    InvalidEmbeddedPayload { tag: u32, source: DecodeError },
}

impl EncodeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncodeError::ValueTooWide { .. } => ErrorKind::LengthOverflow,
            EncodeError::UnsupportedWidth { .. } => ErrorKind::UnsupportedLength,
            EncodeError::InvalidEmbeddedPayload { .. } => ErrorKind::BadDataPointer,
        }
    }
}

/// Error from searching, reading or mutating an in-memory tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("[T004] required tag {tag:#x} not found")]
    TagNotFound { tag: u32 },

    #[error("[T003] tag {tag:#x} found more than {max} times")]
    MultipleTagsFound { tag: u32, max: usize },

    #[error("[T002] tag {tag:#x} payload width {width} is not a numeric width")]
    UnsupportedNumericWidth { tag: u32, width: usize },

    #[error("[T005] tag {tag:#x} value {value} does not fit the requested type")]
    NumberOverflow { tag: u32, value: u64 },

    #[error("[T008] tag {tag:#x} has no payload")]
    EmptyPayload { tag: u32 },

    #[error("[T009] tag {tag:#x} payload is not a NUL-terminated UTF-8 string")]
    MalformedString { tag: u32 },

    #[error("[T010] {chain} index {index} out of bounds (size: {size})")]
    IndexOutOfBounds {
        chain: &'static str,
        index: usize,
        size: usize,
    },

    #[error("[T011] {operation} is not valid on {reason}")]
    InvalidOperation {
        operation: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl TreeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::TagNotFound { .. } => ErrorKind::TagNotFound,
            TreeError::MultipleTagsFound { .. } => ErrorKind::MultipleTagsFound,
            TreeError::UnsupportedNumericWidth { .. } => ErrorKind::UnsupportedLength,
            TreeError::NumberOverflow { .. } => ErrorKind::LengthOverflow,
            TreeError::EmptyPayload { .. } => ErrorKind::NullDataPointer,
            TreeError::MalformedString { .. } => ErrorKind::BadDataPointer,
            TreeError::IndexOutOfBounds { .. } => ErrorKind::InvalidIndex,
            TreeError::InvalidOperation { .. } => ErrorKind::InvalidOperationOnEmbedded,
            TreeError::Encode(e) => e.kind(),
            TreeError::Decode(e) => e.kind(),
        }
    }
}

/// Structural problem found by [`crate::validate::validate_chain`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("[T009] tag {tag:#x} caches {cached} payload bytes but its children encode to {encoded}")]
    StaleLength {
        tag: u32,
        cached: usize,
        encoded: usize,
    },

    #[error("[T005] tag {tag:#x} pins {field} width {width} which cannot hold {value}")]
    PinnedWidthTooNarrow {
        tag: u32,
        field: &'static str,
        width: usize,
        value: u64,
    },

    #[error("[T002] tag {tag:#x} pins unsupported {field} width {width}")]
    PinnedWidthUnsupported {
        tag: u32,
        field: &'static str,
        width: usize,
    },

    #[error("[T009] tag {tag:#x} embedded payload is not a record chain: {source}")]
    InvalidEmbeddedPayload { tag: u32, source: DecodeError },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ValidationError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::StaleLength { .. } => ErrorKind::BadDataPointer,
            ValidationError::PinnedWidthTooNarrow { .. } => ErrorKind::LengthOverflow,
            ValidationError::PinnedWidthUnsupported { .. } => ErrorKind::UnsupportedLength,
            ValidationError::InvalidEmbeddedPayload { .. } => ErrorKind::BadDataPointer,
            ValidationError::Encode(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = DecodeError::UnexpectedEof {
            context: "payload",
            needed: 4,
            available: 1,
        };
        assert!(err.to_string().starts_with(&format!("[{}]", err.kind().code())));

        let err = TreeError::TagNotFound { tag: 0x10 };
        assert_eq!(err.to_string(), "[T004] required tag 0x10 not found");
    }

    #[test]
    fn test_wrapped_kind() {
        let err: TreeError = EncodeError::ValueTooWide {
            field: "tag",
            value: 300,
            width: 1,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::LengthOverflow);

        let err: TreeError = DecodeError::NestingTooDeep { max: 64 }.into();
        assert_eq!(err.kind(), ErrorKind::NestingTooDeep);
    }
}
