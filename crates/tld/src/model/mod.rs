//! In-memory TLD trees.
//!
//! - Payloads (borrowed, inline or heap storage)
//! - Nodes (one record plus its embedded chain)
//! - Chains (ordered peers)
//! - Builders (ergonomic construction)

pub mod builder;
pub mod chain;
pub mod node;
pub mod payload;

pub use builder::ChainBuilder;
pub use chain::Chain;
pub use node::Node;
pub use payload::Payload;
