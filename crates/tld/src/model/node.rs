//! A single TLD record and the operations on its embedded chain.

use tracing::warn;

use crate::codec::primitives::{Width, write_unsigned};
use crate::codec::tree::{decode_chain, encode_chain};
use crate::error::{DecodeError, EncodeError, TreeError};
use crate::model::{Chain, Payload};
use crate::options::{Options, WireFormat};

/// One Tag-Length-Data record.
///
/// For an embedded node, `data` caches the encoded concatenation of the
/// children as of the last length update, and `embedded` holds the decoded
/// children. A node decoded with `DECODE_ONLY_TOP_LEVEL` is embedded but
/// unexpanded: it has the cached bytes and no chain until [`Node::expand`].
#[derive(Debug, Clone)]
pub struct Node<'a> {
    tag: u32,
    data: Payload<'a>,
    embedded_flag: bool,
    embedded: Option<Chain<'a>>,
    /// Set once the caller has taken the children; the cached payload then
    /// no longer describes a chain this node owns.
    detached: bool,
    /// Mode and byte order the cached embedded payload was written in.
    payload_format: Option<WireFormat>,
    tag_width: Option<Width>,
    length_width: Option<Width>,
    local_options: Option<Options>,
}

impl<'a> Node<'a> {
    fn with_payload(tag: u32, data: Payload<'a>) -> Self {
        Self {
            tag,
            data,
            embedded_flag: false,
            embedded: None,
            detached: false,
            payload_format: None,
            tag_width: None,
            length_width: None,
            local_options: None,
        }
    }

    /// A leaf that borrows `data` from the caller.
    pub fn borrowed(tag: u32, data: &'a [u8]) -> Self {
        Self::with_payload(tag, Payload::borrowed(data))
    }

    /// A leaf holding a private copy of `data`.
    pub fn copied(tag: u32, data: &[u8]) -> Node<'static> {
        Node::with_payload(tag, Payload::copied(data))
    }

    /// A leaf taking ownership of `data`.
    pub fn owned(tag: u32, data: Vec<u8>) -> Node<'static> {
        Node::with_payload(tag, Payload::owned(data))
    }

    /// A leaf that copies or borrows `data` depending on `COPYDATA`.
    pub fn with_options(tag: u32, data: &'a [u8], options: Options) -> Self {
        if options.copies_data() {
            Self::with_payload(tag, Payload::copied(data))
        } else {
            Self::borrowed(tag, data)
        }
    }

    /// A numeric leaf stored in the minimal width, in the byte order of
    /// `options`.
    pub fn number(tag: u32, value: u64, options: Options) -> Node<'static> {
        let width = Width::minimal(value);
        // the minimal width always fits the value
        let bytes = write_unsigned(value, width, options.endian()).unwrap_or_default();
        Node::owned(tag, bytes)
    }

    /// A NUL-terminated string leaf.
    pub fn string(tag: u32, value: &str) -> Node<'static> {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        Node::owned(tag, bytes)
    }

    /// An embedded node with no children yet.
    pub fn container(tag: u32) -> Node<'static> {
        Node {
            embedded_flag: true,
            embedded: Some(Chain::new()),
            ..Node::with_payload(tag, Payload::empty())
        }
    }

    /// An embedded node owning `children`, with its length already computed.
    pub fn parent(tag: u32, children: Chain<'a>, options: Options) -> Result<Self, EncodeError> {
        let mut node = Self {
            embedded_flag: true,
            embedded: Some(children),
            ..Self::with_payload(tag, Payload::empty())
        };
        node.update_length(options)?;
        Ok(node)
    }

    pub(crate) fn from_decoded(
        tag: u32,
        data: Payload<'a>,
        embedded_flag: bool,
        embedded: Option<Chain<'a>>,
        format: WireFormat,
    ) -> Self {
        Self {
            embedded_flag,
            embedded,
            payload_format: embedded_flag.then_some(format),
            ..Self::with_payload(tag, data)
        }
    }

    /// Pins the tag field width; honoured when `OVERRIDE` is in effect.
    pub fn with_tag_width(mut self, width: Width) -> Self {
        self.tag_width = Some(width);
        self
    }

    /// Pins the length field width; honoured when `OVERRIDE` is in effect.
    pub fn with_length_width(mut self, width: Width) -> Self {
        self.length_width = Some(width);
        self
    }

    /// Options that replace the call options for this node's width and
    /// copy decisions. Byte order and mode always come from the call.
    pub fn with_local_options(mut self, options: Options) -> Self {
        self.local_options = Some(options);
        self
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn payload(&self) -> &Payload<'a> {
        &self.data
    }

    /// Length of the payload as last computed.
    pub fn length(&self) -> usize {
        self.data.len()
    }

    /// Whether the control byte marks this node's payload as embedded records.
    pub fn is_embedded(&self) -> bool {
        self.embedded_flag
    }

    /// Whether the embedded payload has been decoded into a chain.
    pub fn is_expanded(&self) -> bool {
        self.embedded.is_some()
    }

    pub fn embedded(&self) -> Option<&Chain<'a>> {
        self.embedded.as_ref()
    }

    /// Mutable access to the children. The cached length is not refreshed;
    /// call [`Node::update_length`] afterwards if it matters.
    pub fn embedded_mut(&mut self) -> Option<&mut Chain<'a>> {
        self.embedded.as_mut()
    }

    pub fn tag_width(&self) -> Option<Width> {
        self.tag_width
    }

    pub fn length_width(&self) -> Option<Width> {
        self.length_width
    }

    /// Mode and byte order of the cached embedded payload, if known.
    pub fn payload_format(&self) -> Option<WireFormat> {
        self.payload_format
    }

    pub fn local_options(&self) -> Option<Options> {
        self.local_options
    }

    /// Local options if set, otherwise `options`.
    pub fn effective_options(&self, options: Options) -> Options {
        self.local_options.unwrap_or(options)
    }

    /// Returns the child at `index` of the embedded chain.
    pub fn embedded_at(&self, index: usize) -> Result<&Node<'a>, TreeError> {
        let children = self.embedded.as_ref().map(Chain::nodes).unwrap_or(&[]);
        children.get(index).ok_or(TreeError::IndexOutOfBounds {
            chain: "embedded",
            index,
            size: children.len(),
        })
    }

    /// Replaces the payload of a leaf.
    pub fn set_data(&mut self, data: Payload<'a>) -> Result<(), TreeError> {
        if self.embedded_flag {
            return Err(TreeError::InvalidOperation {
                operation: "set_data",
                reason: "an embedded node",
            });
        }
        self.data = data;
        Ok(())
    }

    /// Appends `child` to the end of the embedded chain.
    ///
    /// With `update_length`, the whole chain is re-encoded and cached as
    /// this node's payload, which costs time proportional to the existing
    /// embedded bytes.
    pub fn add_embedded(
        &mut self,
        child: Node<'a>,
        update_length: bool,
        options: Options,
    ) -> Result<(), TreeError> {
        if !self.embedded_flag && !self.data.is_empty() {
            return Err(TreeError::InvalidOperation {
                operation: "add_embedded",
                reason: "a node holding opaque data",
            });
        }
        self.expand(options)?;
        self.embedded_flag = true;
        self.detached = false;
        self.embedded.get_or_insert_with(Chain::new).add_peer(child);
        if update_length {
            self.update_length(options)?;
        } else {
            warn!(tag = self.tag, "embedded chain changed without a length update");
        }
        Ok(())
    }

    /// Detaches the embedded chain and hands it to the caller.
    ///
    /// The cached payload and the embedded flag are left as they were, but
    /// the node no longer decodes children from that payload: the next
    /// [`Node::add_embedded`] starts a new chain.
    pub fn remove_embedded(&mut self) -> Option<Chain<'a>> {
        let children = self.embedded.take();
        self.detached |= children.is_some();
        children
    }

    /// Re-encodes the embedded chain into the cached payload.
    pub fn update_length(&mut self, options: Options) -> Result<(), EncodeError> {
        if let Some(children) = &self.embedded {
            self.data = Payload::owned(encode_chain(children, options)?);
            self.payload_format = Some(WireFormat::of(options));
        }
        Ok(())
    }

    /// Decodes an unexpanded embedded payload into its child chain.
    ///
    /// The payload must be exactly a concatenation of complete records. A
    /// node whose children were taken by [`Node::remove_embedded`] stays
    /// unexpanded. Children of a borrowed payload borrow the same buffer; children of an
    /// owned payload get their own copies.
    pub fn expand(&mut self, options: Options) -> Result<(), DecodeError> {
        if !self.embedded_flag || self.embedded.is_some() || self.detached {
            return Ok(());
        }
        let options = self.payload_format.map_or(options, |format| format.apply(options))
            - Options::DECODE_ONLY_TOP_LEVEL;
        let children = match &self.data {
            Payload::Borrowed(bytes) => decode_chain(*bytes, options, 1)?,
            owned => decode_chain(owned.as_slice(), options | Options::COPYDATA, 1)?.into_owned(),
        };
        self.embedded = Some(children);
        Ok(())
    }

    /// Detaches the node and its children from any borrowed buffer.
    pub fn into_owned(self) -> Node<'static> {
        Node {
            tag: self.tag,
            data: self.data.into_owned(),
            embedded_flag: self.embedded_flag,
            embedded: self.embedded.map(Chain::into_owned),
            detached: self.detached,
            payload_format: self.payload_format,
            tag_width: self.tag_width,
            length_width: self.length_width,
            local_options: self.local_options,
        }
    }

    /// Depth of the deepest expanded embedded chain below this node.
    pub fn depth(&self) -> usize {
        self.embedded
            .as_ref()
            .map(|children| 1 + children.iter().map(Node::depth).max().unwrap_or(0))
            .unwrap_or(0)
    }
}

/// Structural equality: same tag, same embedded flag, and either the same
/// children (when both sides are expanded) or the same payload bytes.
impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        if self.tag != other.tag || self.embedded_flag != other.embedded_flag {
            return false;
        }
        match (&self.embedded, &other.embedded) {
            (Some(a), Some(b)) => a == b,
            _ => self.data == other.data,
        }
    }
}

impl Eq for Node<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_number_uses_minimal_width() {
        assert_eq!(Node::number(1, 0x7F, Options::empty()).data(), &[0x7F]);
        assert_eq!(Node::number(1, 0x1234, Options::empty()).data(), &[0x12, 0x34]);
        assert_eq!(
            Node::number(1, 0x1234, Options::ENDIAN_LITTLE).data(),
            &[0x34, 0x12]
        );
        assert_eq!(Node::number(1, 0x1_0000, Options::empty()).length(), 4);
        assert_eq!(Node::number(1, u64::MAX, Options::empty()).length(), 8);
    }

    #[test]
    fn test_string_is_nul_terminated() {
        let node = Node::string(7, "spa");
        assert_eq!(node.data(), b"spa\0");
    }

    #[test]
    fn test_copy_and_borrow_contract() {
        let mut source = vec![1u8, 2, 3];
        let copied = Node::with_options(1, &source, Options::COPYDATA).into_owned();
        source[0] = 9;
        assert_eq!(copied.data(), &[1, 2, 3]);

        let borrowed = Node::with_options(1, &source, Options::empty());
        assert!(borrowed.payload().is_borrowed());
        assert_eq!(borrowed.data(), &[9, 2, 3]);
    }

    #[test]
    fn test_add_embedded_updates_length() {
        let mut root = Node::container(0x10);
        root.add_embedded(Node::copied(0x01, &[0xAA]), true, Options::empty())
            .unwrap();
        root.add_embedded(Node::copied(0x02, &[0xBB, 0xCC]), true, Options::empty())
            .unwrap();
        assert_eq!(root.length(), 9);
        assert_eq!(
            root.data(),
            &[0x00, 0x01, 0x01, 0xAA, 0x00, 0x02, 0x02, 0xBB, 0xCC]
        );
        assert_eq!(root.embedded_at(1).unwrap().tag(), 0x02);
    }

    #[test]
    fn test_add_embedded_without_update_keeps_length() {
        let mut root = Node::container(0x10);
        root.add_embedded(Node::copied(0x01, &[0xAA]), false, Options::empty())
            .unwrap();
        assert_eq!(root.length(), 0);
        assert_eq!(root.embedded().unwrap().len(), 1);
    }

    #[test]
    fn test_add_embedded_to_opaque_leaf_fails() {
        let mut leaf = Node::copied(0x01, &[0xAA]);
        let err = leaf
            .add_embedded(Node::copied(0x02, &[]), true, Options::empty())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperationOnEmbedded);
    }

    #[test]
    fn test_empty_leaf_becomes_embedded() {
        let mut node = Node::copied(0x01, &[]);
        node.add_embedded(Node::copied(0x02, &[0x05]), true, Options::empty())
            .unwrap();
        assert!(node.is_embedded());
        assert_eq!(node.length(), 4);
    }

    #[test]
    fn test_set_data_on_embedded_fails() {
        let mut root = Node::container(0x10);
        let err = root.set_data(Payload::copied(&[1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperationOnEmbedded);
    }

    #[test]
    fn test_remove_embedded_keeps_header() {
        let mut root = Node::container(0x10);
        root.add_embedded(Node::copied(0x01, &[0xAA]), true, Options::empty())
            .unwrap();
        let detached = root.remove_embedded().unwrap();
        assert_eq!(detached.len(), 1);
        assert_eq!(detached.peer_at(0).unwrap().tag(), 0x01);
        assert!(root.is_embedded());
        assert!(!root.is_expanded());
        assert_eq!(root.length(), 4);
        assert!(root.remove_embedded().is_none());
    }

    #[test]
    fn test_add_after_remove_starts_new_chain() {
        let mut root = Node::container(0x10);
        root.add_embedded(Node::copied(0x01, &[0xAA]), true, Options::empty())
            .unwrap();
        let detached = root.remove_embedded().unwrap();
        assert_eq!(detached.len(), 1);

        // the stale payload is not decoded back into children
        root.expand(Options::empty()).unwrap();
        assert!(!root.is_expanded());

        root.add_embedded(Node::copied(0x02, &[0xBB]), true, Options::empty())
            .unwrap();
        let tags: Vec<u32> = root.embedded().unwrap().iter().map(Node::tag).collect();
        assert_eq!(tags, vec![0x02]);
        assert_eq!(
            crate::codec::encode_node(&root, Options::empty()).unwrap(),
            vec![0x04, 0x10, 0x04, 0x00, 0x02, 0x01, 0xBB]
        );
    }

    #[test]
    fn test_embedded_at_out_of_range() {
        let root = Node::container(0x10);
        let err = root.embedded_at(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIndex);
    }

    #[test]
    fn test_depth() {
        let leaf = Node::copied(3, &[1]);
        let mid = Node::parent(2, Chain::from(leaf), Options::empty()).unwrap();
        let top = Node::parent(1, Chain::from(mid), Options::empty()).unwrap();
        assert_eq!(top.depth(), 2);
        assert_eq!(Node::copied(1, &[]).depth(), 0);
    }
}
