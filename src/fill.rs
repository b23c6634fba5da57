//! Reconciles a partial dump into a complete one.
//!
//! Formats with a fixed layout (MFD, C arrays) can't represent unknown data,
//! so anything missing is either zero-filled with a warning, or, in strict
//! mode, treated as a hard error.

use crate::sector::{Dump, KeyType, Sector, AC_LEN, DATA_LEN, KEY_LEN};
use crate::{Error, Result};
use tracing::{debug, trace_span, warn};

/// Returns a copy of `dump` where every sector has all four parts.
pub fn fill(dump: &Dump, strict: bool) -> Result<Dump> {
    let span = trace_span!("fill", strict);
    let _enter = span.enter();

    let mut filled = Dump::default();
    for (index, (sector, out)) in dump.iter().zip(filled.iter_mut()).enumerate() {
        *out = fill_sector(index, sector, strict)?;
    }
    debug!(
        present = dump.iter().filter(|s| s.is_present()).count(),
        "Filled dump"
    );
    Ok(filled)
}

fn fill_sector(index: usize, sector: &Sector, strict: bool) -> Result<Sector> {
    let data = match sector.data {
        Some(data) => data,
        None => {
            not_found(strict, Error::MissingSector(index))?;
            [0; DATA_LEN]
        }
    };

    // A missing sector has already been reported, don't nag about its keys too.
    let key = |typ: KeyType| -> Result<[u8; KEY_LEN]> {
        match sector.key(typ) {
            Some(key) => Ok(*key),
            None => {
                if sector.data.is_some() {
                    not_found(strict, Error::MissingKey(index, typ))?;
                }
                Ok([0; KEY_LEN])
            }
        }
    };

    Ok(Sector {
        data: Some(data),
        key_a: Some(key(KeyType::A)?),
        access_conditions: Some(sector.access_conditions.unwrap_or([0; AC_LEN])),
        key_b: Some(key(KeyType::B)?),
    })
}

/// Strict mode turns a missing part into an error; otherwise it's just logged.
fn not_found(strict: bool, err: Error) -> Result<()> {
    if strict {
        return Err(err);
    }
    warn!("{}", err);
    Ok(())
}
