//! Filename order keys
//!
//! Capture tools embed timestamps in filenames (`IMG_20240102_030405.jpg`,
//! `photo_1705329000000.jpg`). The first digit run of length 8, 6, 10 or 13
//! found scanning left to right is used as a sort hint. At any position the
//! lengths are tried in that order, so a 13-digit millisecond stamp yields
//! its first 8 digits. Keys are neither unique nor monotonic.

use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

static ORDER_KEY_PATTERN: OnceLock<Regex> = OnceLock::new();

fn order_key_pattern() -> &'static Regex {
    ORDER_KEY_PATTERN.get_or_init(|| {
        // ASCII digits only; `\d` would also match other Unicode digits
        Regex::new(r"([0-9]{8}|[0-9]{6}|[0-9]{10}|[0-9]{13})").expect("valid order key pattern")
    })
}

/// Extract the order key from a filename, `0` when there is none
pub fn extract_order_key(filename: &str) -> u64 {
    let Some(found) = order_key_pattern().find(filename) else {
        return 0;
    };

    let key = found.as_str().parse().unwrap_or(0);
    trace!(filename, key, "Extracted order key");
    key
}
