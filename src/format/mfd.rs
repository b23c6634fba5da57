//! MFD: a raw binary image of the card, as produced by eg. `nfc-mfclassic`.
//!
//! The file is just the 16 sectors back to back, each laid out exactly as on
//! the card: 48 bytes of data, key A, access conditions, key B.

use crate::sector::{Dump, Sector, AC_LEN, DATA_LEN, DUMP_SIZE, KEY_LEN, SECTORS};
use crate::{fill, Error, Result};
use nom::bytes::complete::take;
use nom::multi::count;
use nom::sequence::tuple;
use tracing::{debug, trace_span};

type IResult<'a, T> = nom::IResult<&'a [u8], T>;

fn parse_sector(data: &[u8]) -> IResult<'_, (&[u8], &[u8], &[u8], &[u8])> {
    tuple((take(DATA_LEN), take(KEY_LEN), take(AC_LEN), take(KEY_LEN)))(data)
}

/// Parses an MFD image. Must be exactly [`DUMP_SIZE`] bytes long, or at least
/// that long if `fuzzy` is set, in which case anything past it is ignored.
pub fn read(raw: &[u8], fuzzy: bool) -> Result<Dump> {
    let span = trace_span!("read_mfd", len = raw.len(), fuzzy);
    let _enter = span.enter();

    let size = raw.len();
    if size < DUMP_SIZE || (size > DUMP_SIZE && !fuzzy) {
        return Err(Error::Size { size, fuzzy });
    }
    if size > DUMP_SIZE {
        debug!(trailing = size - DUMP_SIZE, "Ignoring trailing bytes");
    }

    let (_, records) = count(parse_sector, SECTORS)(&raw[..DUMP_SIZE])
        .map_err(|_| Error::Size { size, fuzzy })?;
    let mut dump = Dump::default();
    for (out, (data, key_a, ac, key_b)) in dump.iter_mut().zip(records) {
        *out = Sector::new(Some(data), Some(key_a), Some(ac), Some(key_b))?;
    }
    Ok(dump)
}

/// Writes a dump as an MFD image. Missing parts are filled in (or rejected,
/// if `strict`), so the output is always [`DUMP_SIZE`] bytes.
pub fn write(dump: &Dump, strict: bool) -> Result<Vec<u8>> {
    let span = trace_span!("write_mfd", strict);
    let _enter = span.enter();

    Ok(fill(dump, strict)?.iter().flat_map(Sector::to_bytes).collect())
}
