//! MCT: the text format used by the MIFARE Classic Tool Android app.
//!
//! Each sector that could be read is written as a `+Sector: N` header, followed
//! by one line of hex per block. The last block is the sector trailer, where a
//! key that isn't known is written as a row of dashes:
//!
//! ```text
//! +Sector: 0
//! 00000000000000000000000000000000
//! 00000000000000000000000000000000
//! 00000000000000000000000000000000
//! FFFFFFFFFFFFFF078069------------
//! ```

use crate::sector::{Dump, Sector, AC_LEN, BLOCK_LEN, DATA_LEN, KEY_LEN, SECTORS};
use crate::{FormatError, Result};
use nom::branch::alt;
use nom::bytes::complete::{tag, take};
use nom::character::complete::{digit1, one_of};
use nom::combinator::{all_consuming, map, map_res, opt, value};
use nom::sequence::{pair, tuple};
use tracing::{debug, trace_span, warn};

pub const HEADER: &str = "+Sector: ";

/// Placeholder for a key that couldn't be recovered.
pub const UNKNOWN_KEY: &str = "------------";

/// Size of a complete 16-sector dump with CRLF line endings and no trailing
/// newline, which is how the app writes it.
pub const MCT_DUMP_SIZE: usize = 2372;

type IResult<'a, T> = nom::IResult<&'a str, T>;

type Trailer = (Option<[u8; KEY_LEN]>, [u8; AC_LEN], Option<[u8; KEY_LEN]>);

fn decode<const N: usize>(s: &str) -> Result<[u8; N], hex::FromHexError> {
    let mut buf = [0; N];
    hex::decode_to_slice(s, &mut buf)?;
    Ok(buf)
}

fn parse_key(input: &str) -> IResult<'_, Option<[u8; KEY_LEN]>> {
    alt((
        value(None, tag(UNKNOWN_KEY)),
        map(map_res(take(KEY_LEN * 2), decode::<KEY_LEN>), Some),
    ))(input)
}

/// A sector number. Anything that can't be a sector on a 1K card (negative,
/// or too large to represent) is `None` rather than an error.
fn parse_index(input: &str) -> IResult<'_, Option<usize>> {
    all_consuming(map(
        pair(opt(one_of("+-")), digit1),
        |(sign, digits): (Option<char>, &str)| {
            let index = digits.parse::<usize>().ok()?;
            match sign {
                Some('-') if index != 0 => None,
                _ => Some(index),
            }
        },
    ))(input)
}

fn parse_trailer(input: &str) -> IResult<'_, Trailer> {
    all_consuming(tuple((
        parse_key,
        map_res(take(AC_LEN * 2), decode::<AC_LEN>),
        parse_key,
    )))(input)
}

/// Parses an MCT dump. Sectors missing from the file are left empty.
///
/// Sector numbers outside 0-15 are skipped, and a sector that appears twice
/// replaces the earlier one. At most 16 sector blocks are accepted, though:
/// a 17th block is taken to mean a 4K dump and fails with
/// [`FormatError::Density`], even if it only repeats an earlier sector.
pub fn read(raw: &[u8]) -> Result<Dump> {
    let span = trace_span!("read_mct", len = raw.len());
    let _enter = span.enter();

    if !raw.is_ascii() {
        return Err(FormatError::NotAscii.into());
    }
    let text = std::str::from_utf8(raw).map_err(|_| FormatError::NotAscii)?;

    // Line numbers are 1-indexed, blank lines are only there for readability.
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end()))
        .filter(|(_, line)| !line.is_empty());

    let mut dump = Dump::default();
    let mut seen = [false; SECTORS];
    let mut blocks = 0;
    while let Some((header_line, header)) = lines.next() {
        // A 4K dump has more sectors, and its later sectors have more blocks.
        let Some(index) = header.strip_prefix(HEADER) else {
            return Err(FormatError::Density { line: header_line }.into());
        };
        if blocks == SECTORS {
            return Err(FormatError::Density { line: header_line }.into());
        }
        blocks += 1;

        let (_, index) = parse_index(index.trim()).map_err(|_| FormatError::Header {
            line: header_line,
            header: header.into(),
        })?;

        let mut data = [0; DATA_LEN];
        for block in data.chunks_exact_mut(BLOCK_LEN) {
            let (lineno, line) = lines
                .next()
                .ok_or(FormatError::Truncated { line: header_line })?;
            hex::decode_to_slice(line, block).map_err(|_| FormatError::Hex {
                line: lineno,
                text: line.into(),
            })?;
        }

        let (lineno, line) = lines
            .next()
            .ok_or(FormatError::Truncated { line: header_line })?;
        let (_, (key_a, ac, key_b)) = parse_trailer(line).map_err(|_| FormatError::Hex {
            line: lineno,
            text: line.into(),
        })?;

        let Some(index) = index.filter(|&i| i < SECTORS) else {
            warn!(header, "Ignoring out-of-range sector");
            continue;
        };
        if seen[index] {
            warn!(index, "Duplicate sector, replacing the earlier one");
        }
        seen[index] = true;
        dump[index] = Sector::new(
            Some(&data[..]),
            key_a.as_ref().map(|k| &k[..]),
            Some(&ac[..]),
            key_b.as_ref().map(|k| &k[..]),
        )?;
    }

    debug!(
        present = seen.iter().filter(|&&v| v).count(),
        "Read MCT dump"
    );
    Ok(dump)
}

fn key_repr(key: Option<&[u8; KEY_LEN]>) -> String {
    key.map(hex::encode_upper)
        .unwrap_or_else(|| UNKNOWN_KEY.into())
}

/// Writes the sectors that are present as MCT text. Nothing is filled in;
/// unknown keys are written as dashes, and sectors that weren't read are left out.
pub fn write(dump: &Dump) -> String {
    let span = trace_span!("write_mct");
    let _enter = span.enter();

    dump.iter()
        .enumerate()
        .filter_map(|(index, sector)| {
            let ac = sector.access_conditions().filter(|_| sector.is_present())?;
            let mut lines = vec![format!("{}{}", HEADER, index)];
            lines.extend(sector.blocks().map(hex::encode_upper));
            lines.push(format!(
                "{}{}{}",
                key_repr(sector.key_a()),
                hex::encode_upper(ac),
                key_repr(sector.key_b())
            ));
            Some(lines.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sector::KeyType;
    use crate::Error;

    const SECTOR_0: &str = "+Sector: 0
01020304050607080910111213141516
00000000000000000000000000000000
FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF
A0A1A2A3A4A5FF078069B0B1B2B3B4B5";

    fn complete() -> String {
        (0..SECTORS)
            .map(|i| {
                format!(
                    "+Sector: {i}\n{b}\n{b}\n{b}\nA0A1A2A3A4{i:02X}FF078069B0B1B2B3B4{i:02X}",
                    b = format!("{:02X}", i).repeat(16),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_read_sector() {
        let dump = read(SECTOR_0.as_bytes()).expect("couldn't read dump");
        let sector = &dump[0];
        assert!(sector.is_present());
        assert_eq!(&sector.data().unwrap()[..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&sector.data().unwrap()[32..], &[0xFF; 16]);
        assert_eq!(
            sector.key(KeyType::A),
            Some(&[0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5])
        );
        assert_eq!(sector.access_conditions(), Some(&[0xFF, 0x07, 0x80, 0x69]));
        assert_eq!(
            sector.key(KeyType::B),
            Some(&[0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5])
        );
        assert!(dump[1..].iter().all(|s| *s == Sector::empty()));
    }

    #[test]
    fn test_read_unknown_keys() {
        let text = "+Sector: 2
00000000000000000000000000000000
00000000000000000000000000000000
00000000000000000000000000000000
------------FF078069------------";
        let dump = read(text.as_bytes()).expect("couldn't read dump");
        assert!(dump[2].is_present());
        assert_eq!(dump[2].keys(), (None, None));
    }

    #[test]
    fn test_read_out_of_order() {
        let text = "+Sector: 5
55555555555555555555555555555555
55555555555555555555555555555555
55555555555555555555555555555555
FFFFFFFFFFFFFF078069FFFFFFFFFFFF

+Sector: 1
11111111111111111111111111111111
11111111111111111111111111111111
11111111111111111111111111111111
ffffffffffffff078069ffffffffffff
";
        let dump = read(text.as_bytes()).expect("couldn't read dump");
        assert_eq!(dump[1].data(), Some(&[0x11; DATA_LEN]));
        assert_eq!(dump[5].data(), Some(&[0x55; DATA_LEN]));
        assert_eq!(
            dump.iter().filter(|s| s.is_present()).count(),
            2,
            "only sectors 1 and 5 should be present"
        );
    }

    #[test]
    fn test_read_crlf() {
        let text = complete().replace('\n', "\r\n");
        assert_eq!(text.len(), MCT_DUMP_SIZE);
        let dump = read(text.as_bytes()).expect("couldn't read dump");
        assert!(dump.iter().all(Sector::is_present));
    }

    #[test]
    fn test_read_duplicate_last_wins() {
        let text = format!("{}\n{}", SECTOR_0, SECTOR_0.replace("0102", "AABB"));
        let dump = read(text.as_bytes()).expect("couldn't read dump");
        assert_eq!(&dump[0].data().unwrap()[..2], &[0xAA, 0xBB]);
    }

    #[test]
    fn test_read_out_of_range_ignored() {
        let text = SECTOR_0.replace("+Sector: 0", "+Sector: 20");
        let dump = read(text.as_bytes()).expect("couldn't read dump");
        assert!(dump.iter().all(|s| *s == Sector::empty()));
    }

    #[test]
    fn test_read_negative_index_ignored() {
        let other = &SECTOR_0[11..];
        for header in ["+Sector: -1", "+Sector: 99999999999999999999999"] {
            let text = format!("{}\n{}\n{}", SECTOR_0, header, other);
            let dump = read(text.as_bytes()).expect("couldn't read dump");
            assert_eq!(&dump[0].data().unwrap()[..2], &[0x01, 0x02]);
            assert!(dump[1..].iter().all(|s| *s == Sector::empty()));
        }

        // Signs are allowed, as long as the number ends up in range.
        let text = SECTOR_0.replace("+Sector: 0", "+Sector: +3");
        assert!(read(text.as_bytes()).unwrap()[3].is_present());
        let text = SECTOR_0.replace("+Sector: 0", "+Sector: -0");
        assert!(read(text.as_bytes()).unwrap()[0].is_present());
    }

    #[test]
    fn test_read_density() {
        let text = format!("Sector 0\n{}", &SECTOR_0[11..]);
        match read(text.as_bytes()) {
            Err(Error::Format(FormatError::Density { line: 1 })) => {}
            v => panic!("wrong result: {:?}", v),
        }

        // A 4K dump has more than 16 sectors.
        let text = format!("{}\n{}", complete(), SECTOR_0.replace(": 0", ": 16"));
        match read(text.as_bytes()) {
            Err(Error::Format(FormatError::Density { line: 81 })) => {}
            v => panic!("wrong result: {:?}", v),
        }
    }

    #[test]
    fn test_read_bad_header() {
        let text = SECTOR_0.replace(": 0", ": zero");
        match read(text.as_bytes()) {
            Err(Error::Format(FormatError::Header { line: 1, .. })) => {}
            v => panic!("wrong result: {:?}", v),
        }
    }

    #[test]
    fn test_read_truncated() {
        let text = SECTOR_0.rsplit_once('\n').unwrap().0;
        match read(text.as_bytes()) {
            Err(Error::Format(FormatError::Truncated { line: 1 })) => {}
            v => panic!("wrong result: {:?}", v),
        }
    }

    #[test]
    fn test_read_bad_hex() {
        let text = SECTOR_0.replace("0102", "XY02");
        match read(text.as_bytes()) {
            Err(Error::Format(FormatError::Hex { line: 2, .. })) => {}
            v => panic!("wrong result: {:?}", v),
        }

        // Half a key is neither a key nor an unknown key.
        let text = SECTOR_0.replace("A0A1A2", "------");
        match read(text.as_bytes()) {
            Err(Error::Format(FormatError::Hex { line: 5, .. })) => {}
            v => panic!("wrong result: {:?}", v),
        }

        // Trailer is too long.
        let text = format!("{}00", SECTOR_0);
        match read(text.as_bytes()) {
            Err(Error::Format(FormatError::Hex { line: 5, .. })) => {}
            v => panic!("wrong result: {:?}", v),
        }
    }

    #[test]
    fn test_read_not_ascii() {
        match read("+Sector: 0\n€".as_bytes()) {
            Err(Error::Format(FormatError::NotAscii)) => {}
            v => panic!("wrong result: {:?}", v),
        }
    }

    #[test]
    fn test_read_empty() {
        let dump = read(b"").expect("couldn't read dump");
        assert!(dump.iter().all(|s| *s == Sector::empty()));
    }

    #[test]
    fn test_roundtrip() {
        let text = complete();
        let dump = read(text.as_bytes()).expect("couldn't read dump");
        assert_eq!(write(&dump), text);
    }

    #[test]
    fn test_write_unknown_keys() {
        let text = SECTOR_0
            .replace("A0A1A2A3A4A5", UNKNOWN_KEY)
            .replace("+Sector: 0", "+Sector: 9");
        let dump = read(text.as_bytes()).expect("couldn't read dump");
        assert_eq!(write(&dump), text);
    }

    #[test]
    fn test_write_skips_absent() {
        let mut dump = read(complete().as_bytes()).unwrap();
        for i in 1..SECTORS {
            dump[i] = Sector::empty();
        }
        assert_eq!(
            write(&dump),
            "+Sector: 0
00000000000000000000000000000000
00000000000000000000000000000000
00000000000000000000000000000000
A0A1A2A3A400FF078069B0B1B2B3B400"
        );
        assert_eq!(write(&Dump::default()), "");
    }
}
