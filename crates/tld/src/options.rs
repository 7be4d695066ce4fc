//! Option flags and the process-wide default option set.
//!
//! Every operation that takes options has a `*_with_options` form that uses
//! exactly the options it is given. The short forms read [`global`] once per
//! call.

use std::fmt::Display;
use std::sync::RwLock;

use lazy_static::lazy_static;

bitflags::bitflags! {
    /// Option bitmask recognised by the codec and the tree operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Options: u32 {
        /// Absence of a searched tag is an error rather than a non-match.
        const REQUIRED_TAG = 1 << 0;
        /// Constructed and decoded nodes own a private copy of their payload.
        const COPYDATA = 1 << 1;
        /// `OrThrow::or_throw` panics on error instead of passing it through.
        const THROW = 1 << 2;
        /// Wire integers are little-endian.
        const ENDIAN_LITTLE = 1 << 3;
        /// Accepted for compatibility; payloads always come from the heap.
        const USE_SHARED_MEMORY = 1 << 4;
        /// Do not expand embedded payloads while decoding.
        const DECODE_ONLY_TOP_LEVEL = 1 << 5;
        /// Tag and length fields use the ASCII hex variant.
        const MODE_ASCII = 1 << 6;
        /// Searches return the first of several matches instead of failing.
        const ALLOW_MULTIPLE_TAGS = 1 << 7;
        /// Searches only visit the starting node and its peers.
        const SEARCH_PEERS_ONLY = 1 << 8;
        /// Searches only visit descendants of the starting node.
        const SEARCH_EMBEDDED_ONLY = 1 << 9;
        /// Pinned tag/length widths take precedence over minimal widths.
        const OVERRIDE = 1 << 10;
    }
}

/// Byte order of multi-byte wire integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// Byte order of the machine this crate was compiled for.
    pub const HOST: Endian = if cfg!(target_endian = "little") {
        Endian::Little
    } else {
        Endian::Big
    };

    pub fn is_little(self) -> bool {
        self == Endian::Little
    }
}

/// Record encoding mode, stored in the control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Binary,
    Ascii,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Binary => "binary",
            Mode::Ascii => "ascii",
        }
    }
}

/// Mode and byte order: the option bits that shape a record's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireFormat {
    pub mode: Mode,
    pub endian: Endian,
}

impl WireFormat {
    pub fn of(options: Options) -> Self {
        Self {
            mode: options.mode(),
            endian: options.endian(),
        }
    }

    /// `options` with mode and byte order replaced by this format.
    pub fn apply(self, options: Options) -> Options {
        let mut options = options.with_endian(self.endian);
        options.set(Options::MODE_ASCII, self.mode == Mode::Ascii);
        options
    }
}

impl Options {
    /// Wire byte order selected by these options.
    pub fn endian(self) -> Endian {
        if self.contains(Options::ENDIAN_LITTLE) {
            Endian::Little
        } else {
            Endian::Big
        }
    }

    /// Sets the wire byte order.
    pub fn with_endian(self, endian: Endian) -> Self {
        match endian {
            Endian::Little => self | Options::ENDIAN_LITTLE,
            Endian::Big => self - Options::ENDIAN_LITTLE,
        }
    }

    /// Sets the wire byte order to the host's.
    pub fn host_endian(self) -> Self {
        self.with_endian(Endian::HOST)
    }

    /// Record mode selected by these options.
    pub fn mode(self) -> Mode {
        if self.contains(Options::MODE_ASCII) {
            Mode::Ascii
        } else {
            Mode::Binary
        }
    }

    pub fn copies_data(self) -> bool {
        self.contains(Options::COPYDATA)
    }
}

lazy_static! {
    static ref GLOBAL_OPTIONS: RwLock<Options> = RwLock::new(Options::COPYDATA);
}

/// Returns the process-wide default options.
pub fn global() -> Options {
    *GLOBAL_OPTIONS.read().unwrap_or_else(|e| e.into_inner())
}

/// Replaces the process-wide default options, returning the previous value.
pub fn set_global(options: Options) -> Options {
    let mut guard = GLOBAL_OPTIONS.write().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut *guard, options)
}

/// Panic-on-error convenience layered over `Result`.
///
/// The codec itself never branches on [`Options::THROW`]; callers that want
/// exception-like behaviour route results through this.
pub trait OrThrow: Sized {
    /// Panics with the error message if `options` contains `THROW`,
    /// otherwise returns `self` unchanged.
    fn or_throw(self, options: Options) -> Self;
}

impl<T, E: Display> OrThrow for Result<T, E> {
    fn or_throw(self, options: Options) -> Self {
        match self {
            Err(e) if options.contains(Options::THROW) => panic!("tld: {e}"),
            other => other,
        }
    }
}
