//! Builder API for ergonomic tree construction.
//!
//! Provides a fluent interface for building chains of nodes with nested
//! containers.
//!
//! # Example
//!
//! ```rust
//! use tld::model::builder::ChainBuilder;
//! use tld::Options;
//!
//! let reply = ChainBuilder::new(Options::COPYDATA)
//!     .number(0x01, 0)
//!     .container(0x10, |b| b
//!         .string(0x11, "enclosure 0")
//!         .number(0x12, 15)
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(reply.len(), 2);
//! ```

use crate::error::EncodeError;
use crate::model::{Chain, Node};
use crate::options::Options;

/// Builder for constructing a chain of peers.
///
/// Numeric leaves use the byte order of the builder's options; containers
/// have their lengths computed when they are closed.
#[derive(Debug, Clone)]
pub struct ChainBuilder<'a> {
    options: Options,
    nodes: Vec<Node<'a>>,
    error: Option<EncodeError>,
}

impl<'a> ChainBuilder<'a> {
    /// Creates a new builder using `options` for every node it creates.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            error: None,
        }
    }

    /// Adds a numeric leaf in its minimal width.
    pub fn number(self, tag: u32, value: u32) -> Self {
        self.big_number(tag, value.into())
    }

    /// Adds a 64-bit numeric leaf in its minimal width.
    pub fn big_number(mut self, tag: u32, value: u64) -> Self {
        self.nodes.push(Node::number(tag, value, self.options));
        self
    }

    /// Adds a NUL-terminated string leaf.
    pub fn string(mut self, tag: u32, value: &str) -> Self {
        self.nodes.push(Node::string(tag, value));
        self
    }

    /// Adds an opaque leaf, copied or borrowed per `COPYDATA`.
    pub fn bytes(mut self, tag: u32, data: &'a [u8]) -> Self {
        self.nodes.push(Node::with_options(tag, data, self.options));
        self
    }

    /// Adds a prebuilt node.
    pub fn node(mut self, node: Node<'a>) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds a container whose children are built by `f`.
    pub fn container<F>(mut self, tag: u32, f: F) -> Self
    where
        F: FnOnce(ChainBuilder<'a>) -> ChainBuilder<'a>,
    {
        let inner = f(ChainBuilder::new(self.options));
        if let Some(err) = inner.error {
            self.error.get_or_insert(err);
            return self;
        }
        match Node::parent(tag, Chain::from(inner.nodes), self.options) {
            Ok(node) => self.nodes.push(node),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Finishes the chain, reporting the first container that failed to
    /// encode.
    pub fn build(self) -> Result<Chain<'a>, EncodeError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Chain::from(self.nodes)),
        }
    }
}
