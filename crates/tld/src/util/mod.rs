//! Utility modules for TLD trees.

pub mod dump;

pub use dump::{dump, DEFAULT_INDENT, DEFAULT_MAX_DEPTH, DEFAULT_MAX_WIDTH};
