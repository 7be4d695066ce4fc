//! Tag search and typed accessors over a chain.
//!
//! Search order: the nodes of a chain are visited in peer order first, then
//! each node's embedded chain is searched in the same way, in peer order. So
//! a peer is always found before anything nested under an earlier peer.
//!
//! Scope, relative to the starting peer:
//! - default: the starting peer, the peers after it, and all their
//!   descendants
//! - `SEARCH_PEERS_ONLY`: the starting peer and the peers after it
//! - `SEARCH_EMBEDDED_ONLY`: descendants of the starting peer
//!
//! Setting both scope flags selects the default scope.

use std::ops::ControlFlow;

use crate::codec::primitives::{read_unsigned, Width};
use crate::error::TreeError;
use crate::model::{Chain, Node};
use crate::options::{self, Options};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    PeersOnly,
    EmbeddedOnly,
}

impl Scope {
    fn from_options(options: Options) -> Self {
        let peers = options.contains(Options::SEARCH_PEERS_ONLY);
        let embedded = options.contains(Options::SEARCH_EMBEDDED_ONLY);
        match (peers, embedded) {
            (true, false) => Scope::PeersOnly,
            (false, true) => Scope::EmbeddedOnly,
            _ => Scope::All,
        }
    }
}

fn visit_chain<'n, 'a, F>(nodes: &'n [Node<'a>], f: &mut F) -> ControlFlow<()>
where
    F: FnMut(&'n Node<'a>) -> ControlFlow<()>,
{
    for node in nodes {
        f(node)?;
    }
    for node in nodes {
        if let Some(children) = node.embedded() {
            visit_chain(children.nodes(), f)?;
        }
    }
    ControlFlow::Continue(())
}

fn visit<'n, 'a, F>(chain: &'n Chain<'a>, start: usize, scope: Scope, mut f: F)
where
    F: FnMut(&'n Node<'a>) -> ControlFlow<()>,
{
    let peers = chain.nodes().get(start..).unwrap_or(&[]);
    let _ = match scope {
        Scope::All => visit_chain(peers, &mut f),
        Scope::PeersOnly => peers.iter().try_for_each(&mut f),
        Scope::EmbeddedOnly => match peers.first().and_then(Node::embedded) {
            Some(children) => visit_chain(children.nodes(), &mut f),
            None => ControlFlow::Continue(()),
        },
    };
}

/// Collects up to `limit` nodes tagged `tag`, in search order.
fn collect_matches<'n, 'a>(
    chain: &'n Chain<'a>,
    start: usize,
    tag: u32,
    limit: usize,
    options: Options,
) -> Vec<&'n Node<'a>> {
    let mut matches = Vec::new();
    visit(chain, start, Scope::from_options(options), |node| {
        if node.tag() == tag {
            matches.push(node);
            if matches.len() >= limit {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    });
    matches
}

impl<'a> Chain<'a> {
    /// Finds `tag` using the process-wide default options.
    pub fn find(&self, tag: u32) -> Result<Option<&Node<'a>>, TreeError> {
        self.find_with_options(tag, options::global())
    }

    /// Finds the first node tagged `tag`.
    ///
    /// With `REQUIRED_TAG`, absence is `TagNotFound` and a second match is
    /// `MultipleTagsFound` unless `ALLOW_MULTIPLE_TAGS` is also set.
    pub fn find_with_options(&self, tag: u32, options: Options) -> Result<Option<&Node<'a>>, TreeError> {
        self.find_from(0, tag, options)
    }

    /// Like [`Chain::find_with_options`], starting at peer `start`.
    pub fn find_from(&self, start: usize, tag: u32, options: Options) -> Result<Option<&Node<'a>>, TreeError> {
        if options.contains(Options::REQUIRED_TAG) {
            return self.find_reference_from(start, tag, 1, options);
        }
        Ok(collect_matches(self, start, tag, 1, options).into_iter().next())
    }

    /// Finds `tag`, allowing at most `max_occurrences` matches.
    ///
    /// More matches than that is `MultipleTagsFound` unless
    /// `ALLOW_MULTIPLE_TAGS` is set. No match is `TagNotFound` under
    /// `REQUIRED_TAG`, otherwise `Ok(None)`. A limit of zero is treated as one.
    pub fn find_reference(
        &self,
        tag: u32,
        max_occurrences: usize,
        options: Options,
    ) -> Result<Option<&Node<'a>>, TreeError> {
        self.find_reference_from(0, tag, max_occurrences, options)
    }

    fn find_reference_from(
        &self,
        start: usize,
        tag: u32,
        max_occurrences: usize,
        options: Options,
    ) -> Result<Option<&Node<'a>>, TreeError> {
        let max = max_occurrences.max(1);
        let matches = collect_matches(self, start, tag, max.saturating_add(1), options);
        if matches.len() > max && !options.contains(Options::ALLOW_MULTIPLE_TAGS) {
            return Err(TreeError::MultipleTagsFound { tag, max });
        }
        match matches.first() {
            Some(node) => Ok(Some(*node)),
            None if options.contains(Options::REQUIRED_TAG) => Err(TreeError::TagNotFound { tag }),
            None => Ok(None),
        }
    }

    /// Every node tagged `tag` within the search scope, in search order.
    pub fn find_all(&self, tag: u32, options: Options) -> Vec<&Node<'a>> {
        collect_matches(self, 0, tag, usize::MAX, options)
    }

    /// First match in search order. Multiplicity is only checked when the
    /// caller passed `REQUIRED_TAG`.
    fn find_required(&self, tag: u32, options: Options) -> Result<&Node<'a>, TreeError> {
        self.find_with_options(tag, options)?
            .ok_or(TreeError::TagNotFound { tag })
    }

    /// Reads the payload of `tag` as an unsigned number of at most 32 bits.
    pub fn get_number(&self, tag: u32, options: Options) -> Result<u32, TreeError> {
        let value = self.get_big_number(tag, options)?;
        u32::try_from(value).map_err(|_| TreeError::NumberOverflow { tag, value })
    }

    /// Reads the payload of `tag` as an unsigned number of 1, 2, 4 or 8
    /// bytes in the byte order of `options`.
    pub fn get_big_number(&self, tag: u32, options: Options) -> Result<u64, TreeError> {
        let node = self.find_required(tag, options)?;
        read_number(node, options)
    }

    /// Reads the payload of `tag` as a NUL-terminated UTF-8 string.
    pub fn get_string(&self, tag: u32, options: Options) -> Result<&str, TreeError> {
        let node = self.find_required(tag, options)?;
        read_string(node)
    }
}

/// Decodes a node's payload as an unsigned number.
pub fn read_number(node: &Node<'_>, options: Options) -> Result<u64, TreeError> {
    let data = node.data();
    let width = Width::from_bytes(data.len()).ok_or(TreeError::UnsupportedNumericWidth {
        tag: node.tag(),
        width: data.len(),
    })?;
    Ok(read_unsigned(data, width, options.endian())?)
}

/// Decodes a node's payload as a NUL-terminated UTF-8 string.
pub fn read_string<'n>(node: &'n Node<'_>) -> Result<&'n str, TreeError> {
    let data = node.data();
    if data.is_empty() {
        return Err(TreeError::EmptyPayload { tag: node.tag() });
    }
    let end = data
        .iter()
        .position(|&b| b == 0)
        .ok_or(TreeError::MalformedString { tag: node.tag() })?;
    std::str::from_utf8(&data[..end]).map_err(|_| TreeError::MalformedString { tag: node.tag() })
}
