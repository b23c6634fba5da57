//! Plain key lists, one hex key per line, as used by dictionary attack tools.

use crate::sector::{Dump, KEY_LEN};
use std::collections::BTreeSet;
use tracing::{debug, trace_span};

/// Every distinct key in the dump.
pub fn collect(dump: &Dump) -> BTreeSet<[u8; KEY_LEN]> {
    dump.iter()
        .flat_map(|sector| {
            let (key_a, key_b) = sector.keys();
            key_a.into_iter().chain(key_b)
        })
        .collect()
}

/// Writes every distinct key, sorted. Nothing is filled in, so keys that
/// aren't known are simply left out.
pub fn write(dump: &Dump) -> String {
    let span = trace_span!("write_keys");
    let _enter = span.enter();

    let keys = collect(dump);
    debug!(count = keys.len(), "Collected keys");
    keys.iter()
        .map(hex::encode_upper)
        .collect::<Vec<_>>()
        .join("\n")
}
