//! Global Configuration Constants
//!
//! Defaults used throughout Aegis. Anything a caller may want to tune at run
//! time (memory budget, minimum progress display) has a constant here and an
//! override on the type that consumes it.
//!
//! ## Legacy Format
//!
//! The on-disk format is raw AES-128-ECB ciphertext with PKCS#7 padding and a
//! key taken from an unsalted SHA-1 of the password. There is no header, so
//! nothing in a file says it was produced by Aegis. These parameters are kept
//! byte-for-byte so previously encrypted files stay readable. A stronger
//! scheme would need its own explicit format version; it must not replace this
//! one silently.

use std::time::Duration;

/// Application name used in the user interface.
pub const APP_NAME: &str = "Aegis";

/// Suffix appended to a file name to form its temporary sibling.
///
/// The working set refuses files carrying this suffix, so a temporary
/// artifact can never be mistaken for a managed input.
pub const TEMP_SUFFIX: &str = ".aegis";

/// Length of the derived AES-128 key in bytes.
pub const KEY_SIZE: usize = 16;

/// Length of a SHA-1 digest in bytes. The key is its first [`KEY_SIZE`] bytes.
pub const DIGEST_SIZE: usize = 20;

/// AES block size in bytes, also the PKCS#7 padding unit.
pub const BLOCK_SIZE: usize = 16;

/// Memory the transformer assumes it may use when no budget is given.
pub const DEFAULT_MEMORY_BUDGET: u64 = 2 * 1024 * 1024 * 1024;

/// Headroom kept back from the budget for the rest of the process.
///
/// A file is buffered whole, and the cipher output is a second buffer of the
/// same size, so the headroom has to cover the UI and runtime on top of that.
pub const RESERVED_HEADROOM: u64 = 100 * 1024 * 1024;

/// Chunk size for the secure erase overwrite passes.
pub const ERASE_CHUNK_SIZE: usize = 64 * 1024;

/// Shortest time a batch run is allowed to take, so a progress display does
/// not flash and vanish on small batches.
pub const MIN_DISPLAY_DURATION: Duration = Duration::from_millis(500);

/// Name patterns rejected by the default import policy.
///
/// Hidden and `~` prefixed names are rejected separately; these globs cover
/// temporaries, files already carrying the reserved suffix and shortcuts.
pub const EXCLUDED_PATTERNS: &[&str] = &[
    "*.tmp",   // Editor and installer temporaries
    "*.aegis", // Temporary artifacts from an interrupted run
    "*.lnk",   // Windows shortcuts
];
