//! Peer chains: ordered siblings at one nesting level.

use crate::error::TreeError;
use crate::model::Node;

/// An ordered list of peer nodes.
///
/// A decoded stream is a chain, and so is every node's embedded content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> Chain<'a> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<'a>> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node<'a>> {
        self.nodes.iter_mut()
    }

    /// Head of the chain.
    pub fn first(&self) -> Option<&Node<'a>> {
        self.nodes.first()
    }

    /// Appends `node` at the end of the chain.
    pub fn add_peer(&mut self, node: Node<'a>) {
        self.nodes.push(node);
    }

    /// Returns the peer at `index`.
    pub fn peer_at(&self, index: usize) -> Result<&Node<'a>, TreeError> {
        self.nodes.get(index).ok_or(TreeError::IndexOutOfBounds {
            chain: "peer",
            index,
            size: self.nodes.len(),
        })
    }

    /// Returns the peer at `index` mutably.
    pub fn peer_at_mut(&mut self, index: usize) -> Result<&mut Node<'a>, TreeError> {
        let size = self.nodes.len();
        self.nodes.get_mut(index).ok_or(TreeError::IndexOutOfBounds {
            chain: "peer",
            index,
            size,
        })
    }

    /// Detaches every peer after `index` and returns them as a chain, or
    /// `None` if `index` is the last node.
    pub fn remove_peer(&mut self, index: usize) -> Result<Option<Chain<'a>>, TreeError> {
        if index >= self.nodes.len() {
            return Err(TreeError::IndexOutOfBounds {
                chain: "peer",
                index,
                size: self.nodes.len(),
            });
        }
        let rest = self.nodes.split_off(index + 1);
        Ok((!rest.is_empty()).then_some(Chain { nodes: rest }))
    }

    /// Detaches the chain from any borrowed buffer.
    pub fn into_owned(self) -> Chain<'static> {
        Chain {
            nodes: self.nodes.into_iter().map(Node::into_owned).collect(),
        }
    }

    /// Total number of nodes in the chain and all expanded embedded chains.
    pub fn node_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| 1 + node.embedded().map(Chain::node_count).unwrap_or(0))
            .sum()
    }
}

impl<'a> From<Node<'a>> for Chain<'a> {
    fn from(node: Node<'a>) -> Self {
        Chain { nodes: vec![node] }
    }
}

impl<'a> From<Vec<Node<'a>>> for Chain<'a> {
    fn from(nodes: Vec<Node<'a>>) -> Self {
        Chain { nodes }
    }
}

impl<'a> FromIterator<Node<'a>> for Chain<'a> {
    fn from_iter<I: IntoIterator<Item = Node<'a>>>(iter: I) -> Self {
        Chain {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for Chain<'a> {
    type Item = Node<'a>;
    type IntoIter = std::vec::IntoIter<Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'c, 'a> IntoIterator for &'c Chain<'a> {
    type Item = &'c Node<'a>;
    type IntoIter = std::slice::Iter<'c, Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
