//! The sector record shared by every dump format.
//!
//! A MIFARE Classic 1K card has 16 sectors of 4 blocks each. The first three
//! blocks hold data; the fourth (the sector trailer) holds key A, the access
//! conditions and key B. Any of those may be unknown, eg. when a dump was made
//! without knowing every key.

use crate::{Error, FormatError, Result};
use std::fmt;

/// Number of sectors on a 1K card.
pub const SECTORS: usize = 16;
/// Bytes in a block.
pub const BLOCK_LEN: usize = 16;
/// Data bytes in a sector (3 blocks).
pub const DATA_LEN: usize = 48;
pub const KEY_LEN: usize = 6;
pub const AC_LEN: usize = 4;
/// Bytes in a complete sector, trailer included.
pub const SECTOR_LEN: usize = DATA_LEN + KEY_LEN + AC_LEN + KEY_LEN;
/// Bytes in a complete 1K dump.
pub const DUMP_SIZE: usize = SECTORS * SECTOR_LEN;

/// All sectors of a card, indexed by sector number.
pub type Dump = [Sector; SECTORS];

/// Which of a sector's two keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    A,
    B,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sector {
    pub(crate) data: Option<[u8; DATA_LEN]>,
    pub(crate) key_a: Option<[u8; KEY_LEN]>,
    pub(crate) access_conditions: Option<[u8; AC_LEN]>,
    pub(crate) key_b: Option<[u8; KEY_LEN]>,
}

impl Sector {
    /// Builds a sector from raw parts, checking each present part's length.
    ///
    /// Data and access conditions must be given together; keys may be left out
    /// independently of each other.
    pub fn new(
        data: Option<&[u8]>,
        key_a: Option<&[u8]>,
        access_conditions: Option<&[u8]>,
        key_b: Option<&[u8]>,
    ) -> Result<Self> {
        if data.is_some() != access_conditions.is_some() {
            return Err(FormatError::Unpaired.into());
        }
        Ok(Self {
            data: part("data", data)?,
            key_a: part("key A", key_a)?,
            access_conditions: part("access conditions", access_conditions)?,
            key_b: part("key B", key_b)?,
        })
    }

    /// A sector nothing is known about.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the sector was actually read, ie. has data and access conditions.
    pub fn is_present(&self) -> bool {
        self.data.is_some() && self.access_conditions.is_some()
    }

    /// Raw bytes in card order. Absent parts are skipped, so this is only
    /// [`SECTOR_LEN`] bytes long for a complete (eg. filled) sector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SECTOR_LEN);
        for part in [
            self.data.as_ref().map(|v| &v[..]),
            self.key_a.as_ref().map(|v| &v[..]),
            self.access_conditions.as_ref().map(|v| &v[..]),
            self.key_b.as_ref().map(|v| &v[..]),
        ]
        .into_iter()
        .flatten()
        {
            buf.extend_from_slice(part);
        }
        buf
    }

    pub fn keys(&self) -> (Option<[u8; KEY_LEN]>, Option<[u8; KEY_LEN]>) {
        (self.key_a, self.key_b)
    }

    pub fn key(&self, typ: KeyType) -> Option<&[u8; KEY_LEN]> {
        match typ {
            KeyType::A => self.key_a.as_ref(),
            KeyType::B => self.key_b.as_ref(),
        }
    }

    pub fn key_a(&self) -> Option<&[u8; KEY_LEN]> {
        self.key_a.as_ref()
    }

    pub fn key_b(&self) -> Option<&[u8; KEY_LEN]> {
        self.key_b.as_ref()
    }

    pub fn data(&self) -> Option<&[u8; DATA_LEN]> {
        self.data.as_ref()
    }

    pub fn access_conditions(&self) -> Option<&[u8; AC_LEN]> {
        self.access_conditions.as_ref()
    }

    /// The data blocks, if the sector has data.
    pub fn blocks(&self) -> impl Iterator<Item = &[u8]> {
        self.data.iter().flat_map(|data| data.chunks_exact(BLOCK_LEN))
    }
}

fn part<const N: usize>(field: &'static str, raw: Option<&[u8]>) -> Result<Option<[u8; N]>> {
    raw.map(|raw| {
        <[u8; N]>::try_from(raw).map_err(|_| {
            Error::from(FormatError::Length {
                field,
                expected: N,
                actual: raw.len(),
            })
        })
    })
    .transpose()
}
