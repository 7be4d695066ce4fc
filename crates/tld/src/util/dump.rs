//! Human-readable rendering of a tree for diagnostics.
//!
//! One line per node, children indented under their parent:
//!
//! ```text
//! tag=0x10 len=9 {2 embedded}
//!   tag=0x1 len=1 [aa]
//!   tag=0x2 len=2 [bb cc]
//! tag=0x11 len=4 "abc"
//! ```

use std::fmt::{self, Write};

use crate::model::{Chain, Node};

/// Peers shown per level by `Display`.
pub const DEFAULT_MAX_WIDTH: usize = 64;
/// Embedded levels shown by `Display`.
pub const DEFAULT_MAX_DEPTH: usize = 16;
/// Spaces per nesting level used by `Display`.
pub const DEFAULT_INDENT: usize = 2;

const PREVIEW_BYTES: usize = 16;

#[derive(Debug, Clone, Copy)]
struct Limits {
    max_width: usize,
    max_depth: usize,
    indent: usize,
}

/// Renders `chain` showing at most `max_width` peers per level and
/// `max_depth` levels of embedding below the top, indenting each level by
/// `indent` spaces.
pub fn dump(chain: &Chain<'_>, max_width: usize, max_depth: usize, indent: usize) -> String {
    let mut out = String::new();
    let limits = Limits {
        max_width,
        max_depth,
        indent,
    };
    // writing to a String cannot fail
    let _ = write_chain(&mut out, chain, 0, limits);
    out
}

fn write_chain<W: Write>(out: &mut W, chain: &Chain<'_>, depth: usize, limits: Limits) -> fmt::Result {
    let pad = depth * limits.indent;
    for node in chain.iter().take(limits.max_width) {
        write_node(out, node, depth, limits)?;
    }
    if chain.len() > limits.max_width {
        writeln!(out, "{:pad$}... {} more peers", "", chain.len() - limits.max_width)?;
    }
    Ok(())
}

fn write_node<W: Write>(out: &mut W, node: &Node<'_>, depth: usize, limits: Limits) -> fmt::Result {
    let pad = depth * limits.indent;
    write!(out, "{:pad$}tag={:#x} len={}", "", node.tag(), node.length())?;

    if !node.is_embedded() {
        writeln!(out, " {}", Preview(node.data()))?;
        return Ok(());
    }
    match node.embedded() {
        None => writeln!(out, " {{unexpanded}}"),
        Some(children) if depth >= limits.max_depth => {
            writeln!(out, " {{{} embedded}}", children.len())?;
            if !children.is_empty() {
                let child_pad = pad + limits.indent;
                writeln!(out, "{:child_pad$}... {} embedded nodes not shown", "", children.len())?;
            }
            Ok(())
        }
        Some(children) => {
            writeln!(out, " {{{} embedded}}", children.len())?;
            write_chain(out, children, depth + 1, limits)
        }
    }
}

/// Shows a payload as a quoted string when it looks like one, otherwise as
/// a truncated hex listing.
struct Preview<'p>(&'p [u8]);

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = printable_string(self.0) {
            return write!(f, "{text:?}");
        }
        f.write_char('[')?;
        for (i, byte) in self.0.iter().take(PREVIEW_BYTES).enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{byte:02x}")?;
        }
        if self.0.len() > PREVIEW_BYTES {
            write!(f, " .. +{}", self.0.len() - PREVIEW_BYTES)?;
        }
        f.write_char(']')
    }
}

fn printable_string(data: &[u8]) -> Option<&str> {
    let (&last, body) = data.split_last()?;
    if last != 0 || body.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(body).ok()?;
    text.chars().all(|c| !c.is_control()).then_some(text)
}

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limits = Limits {
            max_width: DEFAULT_MAX_WIDTH,
            max_depth: DEFAULT_MAX_DEPTH,
            indent: DEFAULT_INDENT,
        };
        write_chain(f, self, 0, limits)
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limits = Limits {
            max_width: DEFAULT_MAX_WIDTH,
            max_depth: DEFAULT_MAX_DEPTH,
            indent: DEFAULT_INDENT,
        };
        write_node(f, self, 0, limits)
    }
}
