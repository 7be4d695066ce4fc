//! Benchmark for TLD encoding using a synthetic storage inventory.
//!
//! Builds a tree of enclosures, each holding drive records, and times
//! encode and decode under several option sets.
//!
//! Usage: `bench-inventory [ENCLOSURES] [--json] [--out PATH]`

use std::env;
use std::fs;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use tld::{Chain, ChainBuilder, Options};

// =============================================================================
// INVENTORY TAGS
// =============================================================================

mod tags {
    pub const ENCLOSURE_COUNT: u32 = 0x01;
    pub const ENCLOSURE: u32 = 0x10;
    pub const ENCLOSURE_NAME: u32 = 0x11;
    pub const ENCLOSURE_SLOTS: u32 = 0x12;
    pub const DRIVE: u32 = 0x20;
    pub const DRIVE_SERIAL: u32 = 0x21;
    pub const DRIVE_CAPACITY: u32 = 0x22;
    pub const DRIVE_FIRMWARE: u32 = 0x23;
    pub const DRIVE_STATE: u32 = 0x0124;
}

const DEFAULT_ENCLOSURES: u32 = 2_000;
const DRIVES_PER_ENCLOSURE: u32 = 24;
const WARMUP_ITERS: u32 = 3;
const DECODE_ITERS: u32 = 10;

// =============================================================================
// TREE CONSTRUCTION
// =============================================================================

fn build_inventory(enclosures: u32, options: Options) -> Chain<'static> {
    let mut builder = ChainBuilder::new(options).number(tags::ENCLOSURE_COUNT, enclosures);

    for e in 0..enclosures {
        let name = format!("enclosure {e}");
        builder = builder.container(tags::ENCLOSURE, |b| {
            let mut b = b
                .string(tags::ENCLOSURE_NAME, &name)
                .number(tags::ENCLOSURE_SLOTS, DRIVES_PER_ENCLOSURE);
            for d in 0..DRIVES_PER_ENCLOSURE {
                let serial = format!("SN{e:06}{d:02}");
                b = b.container(tags::DRIVE, |b| {
                    b.string(tags::DRIVE_SERIAL, &serial)
                        .big_number(tags::DRIVE_CAPACITY, 4_000_787_030_016 + u64::from(d))
                        .string(tags::DRIVE_FIRMWARE, "FW1.2.7")
                        .number(tags::DRIVE_STATE, d % 3)
                });
            }
            b
        });
    }

    builder.build().expect("inventory tree should encode")
}

// =============================================================================
// MEASUREMENT
// =============================================================================

#[derive(Debug, Serialize)]
struct Run {
    label: &'static str,
    bytes: usize,
    encode_us: u128,
    decode_us: u128,
    encode_mb_s: f64,
    decode_mb_s: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    enclosures: u32,
    nodes: usize,
    build_us: u128,
    runs: Vec<Run>,
}

fn throughput(bytes: usize, elapsed: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64().max(f64::EPSILON)
}

fn measure(label: &'static str, tree: &Chain<'_>, options: Options) -> (Run, Vec<u8>) {
    let encode_start = Instant::now();
    let encoded = tld::encode_with_options(tree, options).expect("Failed to encode");
    let encode_time = encode_start.elapsed();

    for _ in 0..WARMUP_ITERS {
        let _ = tld::decode_with_options(&encoded, options).expect("Failed to decode");
    }

    let decode_start = Instant::now();
    for _ in 0..DECODE_ITERS {
        let decoded = tld::decode_with_options(&encoded, options).expect("Failed to decode");
        assert_eq!(decoded.len(), tree.len());
    }
    let decode_time = decode_start.elapsed() / DECODE_ITERS;

    info!(label, bytes = encoded.len(), "measured option set");
    let run = Run {
        label,
        bytes: encoded.len(),
        encode_us: encode_time.as_micros(),
        decode_us: decode_time.as_micros(),
        encode_mb_s: throughput(encoded.len(), encode_time),
        decode_mb_s: throughput(encoded.len(), decode_time),
    };
    (run, encoded)
}

fn print_run(run: &Run) {
    println!("\n{}: {} bytes", run.label, run.bytes);
    println!("  Encode: {} us ({:.2} MB/s)", run.encode_us, run.encode_mb_s);
    println!(
        "  Decode: {} us ({:.2} MB/s, avg of {} iterations)",
        run.decode_us, run.decode_mb_s, DECODE_ITERS
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .init();

    let mut enclosures = DEFAULT_ENCLOSURES;
    let mut json = false;
    let mut out = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--out" => out = args.next(),
            n => enclosures = n.parse().expect("ENCLOSURES must be a number"),
        }
    }

    let build_start = Instant::now();
    let tree = build_inventory(enclosures, Options::empty());
    let build_time = build_start.elapsed();

    let option_sets: [(&'static str, Options); 5] = [
        ("binary big-endian (borrowed)", Options::empty()),
        ("binary little-endian (borrowed)", Options::ENDIAN_LITTLE),
        ("binary big-endian (copied)", Options::COPYDATA),
        ("binary top level only", Options::DECODE_ONLY_TOP_LEVEL),
        ("ascii", Options::MODE_ASCII),
    ];

    // byte order changes numeric payloads, so each set gets its own tree
    let mut runs = Vec::with_capacity(option_sets.len());
    let mut reference = None;
    for (label, options) in option_sets {
        let tree = if options.contains(Options::ENDIAN_LITTLE) {
            build_inventory(enclosures, options)
        } else {
            tree.clone()
        };
        let (run, encoded) = measure(label, &tree, options);
        reference.get_or_insert(encoded);
        runs.push(run);
    }

    let report = Report {
        enclosures,
        nodes: tree.node_count(),
        build_us: build_time.as_micros(),
        runs,
    };

    if let (Some(path), Some(bytes)) = (&out, &reference) {
        fs::write(path, bytes).expect("Failed to write output file");
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("Failed to serialize report")
        );
        return;
    }

    println!(
        "Built {} enclosures ({} nodes) in {} us",
        report.enclosures, report.nodes, report.build_us
    );
    for run in &report.runs {
        print_run(run);
    }
    if let Some(path) = &out {
        println!("\n=== Output File ===");
        println!("Binary big-endian: {path}");
    }
}
