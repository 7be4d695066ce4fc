//! Structural checks for in-memory trees.
//!
//! Encoding always recomputes lengths from the children, so a tree that
//! fails these checks can still be encoded. The checks catch trees whose
//! cached state disagrees with what would go on the wire.

use tracing::debug;

use crate::codec::primitives::Width;
use crate::codec::tree::{decode_chain, encode_chain};
use crate::error::ValidationError;
use crate::model::{Chain, Node};
use crate::options::Options;

/// Checks every node of `chain` and its expanded embedded chains.
///
/// - an expanded embedded node caches exactly the encoding of its children
/// - an unexpanded embedded node caches a complete record chain
/// - widths pinned under `OVERRIDE` are supported and large enough
///
/// Returns the first problem found in search order.
pub fn validate_chain(chain: &Chain<'_>, options: Options) -> Result<(), ValidationError> {
    for node in chain {
        validate_node(node, options)?;
    }
    debug!(nodes = chain.len(), "validated chain");
    Ok(())
}

fn validate_node(node: &Node<'_>, options: Options) -> Result<(), ValidationError> {
    let length = match node.embedded() {
        Some(children) => {
            let encoded = encode_chain(children, options)?;
            if encoded.as_slice() != node.data() {
                return Err(ValidationError::StaleLength {
                    tag: node.tag(),
                    cached: node.length(),
                    encoded: encoded.len(),
                });
            }
            validate_chain(children, options)?;
            encoded.len()
        }
        None if node.is_embedded() => {
            let format_options = node.payload_format().map_or(options, |format| format.apply(options));
            let decode_options = (format_options | Options::COPYDATA) - Options::DECODE_ONLY_TOP_LEVEL;
            decode_chain(node.data(), decode_options, 1).map_err(|source| {
                ValidationError::InvalidEmbeddedPayload {
                    tag: node.tag(),
                    source,
                }
            })?;
            node.length()
        }
        None => node.length(),
    };

    if node.effective_options(options).contains(Options::OVERRIDE) {
        check_pinned(node, node.tag_width(), node.tag() as u64, "tag")?;
        check_pinned(node, node.length_width(), length as u64, "length")?;
    }
    Ok(())
}

fn check_pinned(
    node: &Node<'_>,
    pinned: Option<Width>,
    value: u64,
    field: &'static str,
) -> Result<(), ValidationError> {
    let Some(width) = pinned else {
        return Ok(());
    };
    if !width.is_field_width() {
        return Err(ValidationError::PinnedWidthUnsupported {
            tag: node.tag(),
            field,
            width: width.bytes(),
        });
    }
    if !width.fits(value) {
        return Err(ValidationError::PinnedWidthTooNarrow {
            tag: node.tag(),
            field,
            width: width.bytes(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_with_options, encode_with_options};
    use crate::error::ErrorKind;

    fn parent() -> Node<'static> {
        let mut root = Node::container(0x10);
        root.add_embedded(Node::copied(0x01, &[0xAA]), true, Options::empty())
            .unwrap();
        root
    }

    #[test]
    fn test_consistent_tree_passes() {
        let chain = Chain::from(parent());
        validate_chain(&chain, Options::empty()).unwrap();
    }

    #[test]
    fn test_stale_length_detected() {
        let mut root = parent();
        root.add_embedded(Node::copied(0x02, &[0xBB, 0xCC]), false, Options::empty())
            .unwrap();
        let chain = Chain::from(root);
        let err = validate_chain(&chain, Options::empty()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::StaleLength {
                tag: 0x10,
                cached: 4,
                encoded: 9,
            }
        );
        assert_eq!(err.kind(), ErrorKind::BadDataPointer);

        let mut chain = chain;
        chain
            .peer_at_mut(0)
            .unwrap()
            .update_length(Options::empty())
            .unwrap();
        validate_chain(&chain, Options::empty()).unwrap();
    }

    #[test]
    fn test_pinned_width_too_narrow() {
        let node = Node::copied(0x1FF, &[]).with_tag_width(Width::One);
        let chain = Chain::from(node);
        // pins are ignored without OVERRIDE
        validate_chain(&chain, Options::empty()).unwrap();

        let err = validate_chain(&chain, Options::OVERRIDE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthOverflow);
    }

    #[test]
    fn test_pinned_eight_byte_width_rejected() {
        let node = Node::copied(1, &[1])
            .with_length_width(Width::Eight)
            .with_local_options(Options::OVERRIDE);
        let err = validate_chain(&Chain::from(node), Options::empty()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedLength);
    }

    #[test]
    fn test_unexpanded_payload_checked() {
        let bytes = encode_with_options(&Chain::from(parent()), Options::empty()).unwrap();
        let chain = decode_with_options(&bytes, Options::DECODE_ONLY_TOP_LEVEL).unwrap();
        validate_chain(&chain, Options::empty()).unwrap();

        // embedded flag set, payload truncated mid-record
        let broken = [0x04, 0x10, 0x02, 0x00, 0x01];
        let chain = decode_with_options(&broken, Options::DECODE_ONLY_TOP_LEVEL).unwrap();
        let err = validate_chain(&chain, Options::empty()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidEmbeddedPayload { tag: 0x10, .. }
        ));
    }
}
