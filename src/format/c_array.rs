//! C source arrays, for embedding a dump in firmware (eg. an Arduino sketch
//! that emulates or rewrites the card).

use crate::sector::{Dump, Sector, BLOCK_LEN, DUMP_SIZE};
use crate::{fill, Result};
use tracing::trace_span;

/// Writes the dump as `byte data[64][16]`, one block per row. Missing parts
/// are filled in (or rejected, if `strict`).
pub fn write(dump: &Dump, strict: bool) -> Result<String> {
    let span = trace_span!("write_c_array", strict);
    let _enter = span.enter();

    let raw: Vec<u8> = fill(dump, strict)?
        .iter()
        .flat_map(Sector::to_bytes)
        .collect();
    let rows = raw
        .chunks_exact(BLOCK_LEN)
        .map(|block| {
            let bytes: Vec<_> = block.iter().map(|b| format!("0x{:02X}", b)).collect();
            format!("  {{{}}}", bytes.join(", "))
        })
        .collect::<Vec<_>>();
    Ok(format!(
        "byte data[{}][{}] = {{\n{}\n}};\n",
        DUMP_SIZE / BLOCK_LEN,
        BLOCK_LEN,
        rows.join(",\n")
    ))
}
