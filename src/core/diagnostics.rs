//! Process-wide internal diagnostics
//!
//! The engine cannot report its own problems through itself, so they go to
//! stderr with a bracketed tag. Keyed warnings are printed at most once per
//! process: the key set is created on first use, only grows, and lives until
//! the process exits.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::OnceLock;

static WARNED: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

fn warned() -> &'static Mutex<HashSet<String>> {
    WARNED.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Print a warning unconditionally
pub fn warn(msg: &str) {
    eprintln!("[LOGGER WARNING] {}", msg);
}

/// Print an error unconditionally
pub fn error(msg: &str) {
    eprintln!("[LOGGER ERROR] {}", msg);
}

/// Print a warning the first time `key` is seen; returns whether it printed
pub fn warn_once(key: &str, msg: &str) -> bool {
    let first = warned().lock().insert(key.to_string());
    if first {
        warn(msg);
    }
    first
}

/// Whether a warning has already been printed for `key`
pub fn has_warned(key: &str) -> bool {
    warned().lock().contains(key)
}
