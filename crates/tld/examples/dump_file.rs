//! Simple decoder to inspect TLD files.
//!
//! Usage: `dump_file PATH [--ascii] [--little] [--top-level] [--width N] [--depth N]`

use std::env;
use std::fs;

use tld::{decode_with_options, dump, Chain, Node, Options};

fn count_embedded(chain: &Chain<'_>) -> usize {
    chain
        .iter()
        .filter(|node| node.is_embedded())
        .map(|node| 1 + node.embedded().map(count_embedded).unwrap_or(0))
        .sum()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .init();

    let mut path = None;
    let mut options = Options::empty();
    let mut max_width = 32;
    let mut max_depth = 8;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ascii" => options |= Options::MODE_ASCII,
            "--little" => options |= Options::ENDIAN_LITTLE,
            "--top-level" => options |= Options::DECODE_ONLY_TOP_LEVEL,
            "--width" => {
                max_width = args.next().and_then(|n| n.parse().ok()).expect("--width needs a number");
            }
            "--depth" => {
                max_depth = args.next().and_then(|n| n.parse().ok()).expect("--depth needs a number");
            }
            other => path = Some(other.to_string()),
        }
    }
    let path = path.unwrap_or_else(|| "inventory.tld".to_string());

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let chain = decode_with_options(&data, options).expect("Failed to decode");

    println!("\n=== Tree Info ===");
    println!("Top-level records: {}", chain.len());
    println!("Decoded records: {}", chain.node_count());
    println!("Embedded records: {}", count_embedded(&chain));
    println!(
        "Max depth: {}",
        chain.iter().map(Node::depth).max().unwrap_or(0)
    );

    println!("\n=== Records ===");
    print!("{}", dump(&chain, max_width, max_depth, 2));
}
