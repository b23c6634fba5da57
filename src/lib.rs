//! Conversions between MIFARE Classic 1K dump formats.
//!
//! Every format is read into a [`Dump`] of 16 [`Sector`]s, optionally
//! reconciled with [`fill()`], then written back out in the target format.

pub mod convert;
pub mod fill;
pub mod format;
pub mod sector;

pub use convert::{convert, convert_bytes, InputFormat, Options, OutputFormat};
pub use fill::fill;
pub use sector::{Dump, KeyType, Sector, DUMP_SIZE, SECTORS};

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid file size ({size}): {}", size_requirement(.fuzzy))]
    Size { size: usize, fuzzy: bool },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("sector {0} not found")]
    MissingSector(usize),

    #[error("key {1} of sector {0} not found")]
    MissingKey(usize, KeyType),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn size_requirement(fuzzy: &bool) -> &'static str {
    if *fuzzy {
        "at least 1024 bytes required"
    } else {
        "only 1024 bytes allowed"
    }
}

/// Malformed input, or a sector built from bad parts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid {field} length: expected {expected} bytes, got {actual}")]
    Length {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("data and access conditions must be given together")]
    Unpaired,

    #[error("not a MIFARE Classic Tool dump")]
    NotAscii,

    #[error("line {line}: wrong dump density, probably a 4K dump; only 1K dumps are allowed")]
    Density { line: usize },

    #[error("line {line}: invalid sector header {header:?}")]
    Header { line: usize, header: String },

    #[error("line {line}: dump ends in the middle of the sector")]
    Truncated { line: usize },

    #[error("line {line}: invalid hex {text:?}")]
    Hex { line: usize, text: String },
}
