//! Payload storage for a node.
//!
//! A payload either borrows caller memory for `'a` or owns its bytes. Owned
//! payloads of at most [`INLINE_PAYLOAD_CAPACITY`] bytes live inside the node
//! itself; larger ones go to the heap.

use std::fmt;
use std::ops::Deref;

use crate::error::DecodeError;
use crate::limits::INLINE_PAYLOAD_CAPACITY;

/// Bytes carried by a node.
#[derive(Clone)]
pub enum Payload<'a> {
    /// Borrowed from a buffer the caller keeps alive.
    Borrowed(&'a [u8]),
    /// Owned, small enough to sit in the node.
    Inline {
        len: u8,
        buf: [u8; INLINE_PAYLOAD_CAPACITY],
    },
    /// Owned, heap allocated.
    Heap(Vec<u8>),
}

impl<'a> Payload<'a> {
    /// An empty owned payload.
    pub const fn empty() -> Self {
        Payload::Inline {
            len: 0,
            buf: [0u8; INLINE_PAYLOAD_CAPACITY],
        }
    }

    pub fn borrowed(bytes: &'a [u8]) -> Self {
        Payload::Borrowed(bytes)
    }

    /// Copies `bytes` into owned storage.
    pub fn copied(bytes: &[u8]) -> Payload<'static> {
        if bytes.len() <= INLINE_PAYLOAD_CAPACITY {
            inline_from(bytes)
        } else {
            Payload::Heap(bytes.to_vec())
        }
    }

    /// Like [`Payload::copied`], but reports a failed heap reservation
    /// instead of aborting.
    pub fn try_copied(bytes: &[u8]) -> Result<Payload<'static>, DecodeError> {
        if bytes.len() <= INLINE_PAYLOAD_CAPACITY {
            return Ok(inline_from(bytes));
        }
        let mut heap = Vec::new();
        heap.try_reserve_exact(bytes.len())
            .map_err(|_| DecodeError::AllocationFailed { len: bytes.len() })?;
        heap.extend_from_slice(bytes);
        Ok(Payload::Heap(heap))
    }

    /// Takes ownership of `bytes`, moving small buffers inline.
    pub fn owned(bytes: Vec<u8>) -> Payload<'static> {
        if bytes.len() <= INLINE_PAYLOAD_CAPACITY {
            inline_from(&bytes)
        } else {
            Payload::Heap(bytes)
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Payload::Borrowed(bytes) => bytes,
            Payload::Inline { len, buf } => &buf[..*len as usize],
            Payload::Heap(bytes) => bytes,
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, Payload::Borrowed(_))
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Payload::Inline { .. })
    }

    /// Detaches the payload from any borrowed buffer.
    pub fn into_owned(self) -> Payload<'static> {
        match self {
            Payload::Borrowed(bytes) => Payload::copied(bytes),
            Payload::Inline { len, buf } => Payload::Inline { len, buf },
            Payload::Heap(bytes) => Payload::Heap(bytes),
        }
    }
}

fn inline_from(bytes: &[u8]) -> Payload<'static> {
    let mut buf = [0u8; INLINE_PAYLOAD_CAPACITY];
    buf[..bytes.len()].copy_from_slice(bytes);
    Payload::Inline {
        len: bytes.len() as u8,
        buf,
    }
}

impl Default for Payload<'_> {
    fn default() -> Self {
        Payload::empty()
    }
}

impl Deref for Payload<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for Payload<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for Payload<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Payload<'_> {}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = match self {
            Payload::Borrowed(_) => "Borrowed",
            Payload::Inline { .. } => "Inline",
            Payload::Heap(_) => "Heap",
        };
        f.debug_tuple(storage).field(&self.as_slice()).finish()
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Payload::Borrowed(bytes)
    }
}

impl From<Vec<u8>> for Payload<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::owned(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_selection() {
        assert!(Payload::copied(&[1, 2, 3]).is_inline());
        assert!(Payload::copied(&[0u8; INLINE_PAYLOAD_CAPACITY]).is_inline());
        assert!(matches!(
            Payload::copied(&[0u8; INLINE_PAYLOAD_CAPACITY + 1]),
            Payload::Heap(_)
        ));
        assert!(Payload::owned(vec![9; 4]).is_inline());
        assert!(Payload::borrowed(&[1]).is_borrowed());
    }

    #[test]
    fn test_equality_ignores_storage() {
        let bytes = [0xAAu8, 0xBB];
        assert_eq!(Payload::borrowed(&bytes), Payload::copied(&bytes));
        assert_eq!(Payload::empty(), Payload::borrowed(&[]));
    }

    #[test]
    fn test_into_owned_detaches() {
        let mut source = vec![1u8, 2, 3];
        let owned = Payload::borrowed(&source).into_owned();
        source[0] = 42;
        assert_eq!(owned.as_slice(), &[1, 2, 3]);
        assert!(!owned.is_borrowed());
    }

    #[test]
    fn test_try_copied_large() {
        let big = vec![7u8; 1000];
        let payload = Payload::try_copied(&big).unwrap();
        assert_eq!(payload.len(), 1000);
        assert!(matches!(payload, Payload::Heap(_)));
    }
}
