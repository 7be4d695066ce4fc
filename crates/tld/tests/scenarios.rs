//! End-to-end scenarios: wire layout, search scope, typed access and the
//! borrow/copy contract.

use tld::{
    decode_node, decode_owned, decode_with_options, encode_header, encode_with_options, validate_chain,
    Chain, ChainBuilder, ErrorKind, Node, Options, OrThrow, TreeError, Width,
};

/// Root 0x10 holding children 0x01 = [AA] and 0x02 = [BB CC].
fn enclosure() -> Chain<'static> {
    let mut root = Node::container(0x10);
    root.add_embedded(Node::copied(0x01, &[0xAA]), true, Options::empty())
        .unwrap();
    root.add_embedded(Node::copied(0x02, &[0xBB, 0xCC]), true, Options::empty())
        .unwrap();
    Chain::from(root)
}

#[test]
fn test_embedded_root_wire_layout() {
    let bytes = encode_with_options(&enclosure(), Options::empty()).unwrap();
    // each child is control, tag, length and data, so the root payload is 9 bytes
    assert_eq!(
        bytes,
        vec![
            0x04, 0x10, 0x09, //
            0x00, 0x01, 0x01, 0xAA, //
            0x00, 0x02, 0x02, 0xBB, 0xCC,
        ]
    );

    let header = encode_header(enclosure().peer_at(0).unwrap(), Options::empty()).unwrap();
    assert_eq!(header, vec![0x04, 0x10, 0x09]);
}

#[test]
fn test_ascii_and_little_endian_layouts() {
    let node = Chain::from(Node::copied(0x1234, &[0x7F]));

    let little = encode_with_options(&node, Options::ENDIAN_LITTLE).unwrap();
    assert_eq!(little, vec![0x01, 0x34, 0x12, 0x01, 0x7F]);

    let ascii = encode_with_options(&node, Options::MODE_ASCII).unwrap();
    assert_eq!(ascii, b"\x81123401\x7F".to_vec());

    // a binary decoder refuses ASCII records
    let err = decode_with_options(&ascii, Options::empty()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMode);
    assert_eq!(decode_with_options(&ascii, Options::MODE_ASCII).unwrap(), node);
}

#[test]
fn test_pinned_widths_under_override() {
    let node = Node::copied(0x05, &[0x01])
        .with_tag_width(Width::Two)
        .with_length_width(Width::Four);
    let chain = Chain::from(node);

    let minimal = encode_with_options(&chain, Options::empty()).unwrap();
    assert_eq!(minimal, vec![0x00, 0x05, 0x01, 0x01]);

    let pinned = encode_with_options(&chain, Options::OVERRIDE).unwrap();
    assert_eq!(pinned, vec![0x11, 0x00, 0x05, 0x00, 0x00, 0x00, 0x01, 0x01]);
    assert_eq!(decode_with_options(&pinned, Options::empty()).unwrap(), chain);
}

#[test]
fn test_search_scope_matrix() {
    // A embeds B, C is A's peer
    let mut a = Node::container(0xA);
    a.add_embedded(Node::copied(0xB, &[1]), true, Options::empty())
        .unwrap();
    let mut tree = Chain::from(a);
    tree.add_peer(Node::copied(0xC, &[2]));

    let embedded = Options::SEARCH_EMBEDDED_ONLY;
    let peers = Options::SEARCH_PEERS_ONLY;
    assert!(tree.find_with_options(0xB, embedded).unwrap().is_some());
    assert!(tree.find_with_options(0xC, embedded).unwrap().is_none());
    assert!(tree.find_with_options(0xC, peers).unwrap().is_some());
    assert!(tree.find_with_options(0xB, peers).unwrap().is_none());

    let err = tree
        .find_with_options(0xB, peers | Options::REQUIRED_TAG)
        .unwrap_err();
    assert_eq!(err, TreeError::TagNotFound { tag: 0xB });
}

#[test]
fn test_decoded_inventory_accessors() {
    let options = Options::COPYDATA;
    let inventory = ChainBuilder::new(options)
        .number(0x01, 2)
        .container(0x10, |b| b.string(0x11, "enclosure 0").number(0x12, 15))
        .container(0x10, |b| b.string(0x11, "enclosure 1").big_number(0x12, 1 << 33))
        .build()
        .unwrap();
    let bytes = encode_with_options(&inventory, options).unwrap();
    let decoded = decode_with_options(&bytes, Options::empty()).unwrap();

    assert_eq!(decoded.get_number(0x01, Options::empty()).unwrap(), 2);

    // one name per enclosure: the first in search order wins
    assert_eq!(decoded.get_string(0x11, Options::empty()).unwrap(), "enclosure 0");
    let err = decoded
        .get_string(0x11, Options::REQUIRED_TAG)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MultipleTagsFound);
    assert_eq!(
        decoded
            .get_string(0x11, Options::REQUIRED_TAG | Options::ALLOW_MULTIPLE_TAGS)
            .unwrap(),
        "enclosure 0"
    );

    let second = decoded.peer_at(2).unwrap().embedded().unwrap();
    assert_eq!(second.get_big_number(0x12, Options::empty()).unwrap(), 1 << 33);
    let err = second.get_number(0x12, Options::empty()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LengthOverflow);

    let names: Vec<&[u8]> = decoded
        .find_all(0x11, Options::empty())
        .into_iter()
        .map(Node::data)
        .collect();
    assert_eq!(names, vec![&b"enclosure 0\0"[..], &b"enclosure 1\0"[..]]);

    validate_chain(&decoded, Options::empty()).unwrap();
}

#[test]
fn test_copy_contract() {
    let mut source = vec![0xAA, 0xBB];
    let copied = Node::with_options(0x01, &source, Options::COPYDATA).into_owned();
    source[0] = 0x00;
    assert_eq!(copied.data(), &[0xAA, 0xBB]);
}

#[test]
fn test_borrow_contract() {
    let mut source = vec![0x00, 0x01, 0x01, 0xAA];
    {
        let borrowed = Node::with_options(0x01, &source, Options::empty());
        assert!(borrowed.payload().is_borrowed());
        assert_eq!(borrowed.data().as_ptr(), source.as_ptr());

        let chain = decode_with_options(&source, Options::empty()).unwrap();
        let node = chain.peer_at(0).unwrap();
        assert!(std::ptr::eq(node.data().as_ptr(), &source[3]));
    }
    // once the borrow ends the caller may change the buffer; the next
    // borrowing decode sees the new bytes
    source[3] = 0x55;
    let chain = decode_with_options(&source, Options::empty()).unwrap();
    assert_eq!(chain.peer_at(0).unwrap().data(), &[0x55]);

    let owned = decode_owned(&source, Options::empty()).unwrap();
    source[3] = 0x66;
    assert_eq!(owned.peer_at(0).unwrap().data(), &[0x55]);
}

#[test]
fn test_top_level_decode_then_expand() {
    let bytes = encode_with_options(&enclosure(), Options::empty()).unwrap();
    let mut chain = decode_with_options(&bytes, Options::DECODE_ONLY_TOP_LEVEL).unwrap();
    let root = chain.peer_at_mut(0).unwrap();
    assert!(root.is_embedded());
    assert!(!root.is_expanded());
    assert!(root.embedded_at(0).is_err());

    root.expand(Options::empty()).unwrap();
    assert_eq!(root.embedded_at(1).unwrap().data(), &[0xBB, 0xCC]);
    assert_eq!(chain, enclosure());
}

#[test]
fn test_decode_node_leaves_trailing_bytes() {
    let mut bytes = encode_with_options(&enclosure(), Options::empty()).unwrap();
    bytes.extend_from_slice(&[0x00, 0x07, 0x00]);
    let (node, consumed) = decode_node(&bytes, Options::empty()).unwrap();
    assert_eq!(consumed, 12);
    assert_eq!(node.tag(), 0x10);
    assert_eq!(node.embedded().map(Chain::len), Some(2));
}

#[test]
fn test_truncated_header_claim() {
    // length claims four bytes, two remain
    let err = decode_with_options(&[0x00, 0x01, 0x04, 0xAA, 0xBB], Options::empty()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LengthUnderflow);
}

#[test]
#[should_panic(expected = "[T004]")]
fn test_or_throw_panics_on_missing_tag() {
    let tree = enclosure();
    let options = Options::THROW;
    let _ = tree.get_number(0x99, options).or_throw(options);
}
