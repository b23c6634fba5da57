use mfc::format::{keys, mct};
use mfc::sector::{Dump, KeyType, BLOCK_LEN, KEY_LEN, SECTOR_LEN};
use owo_colors::{colors, Color, OwoColorize};
use pad::{Alignment, PadStr};
use tap::TapOptional;

type ColorData = colors::Default;
type ColorKeyA = colors::Green;
type ColorAC = colors::Yellow;
type ColorKeyB = colors::Cyan;
type ColorUnknown = colors::Red;

/// Blocks per sector, trailer included.
const BLOCKS: usize = SECTOR_LEN / BLOCK_LEN;

/// Prints a dump one block per line, with the trailer colourised.
pub fn show(dump: &Dump) {
    for (index, sector) in dump.iter().enumerate() {
        let label = format!("Sector {}", index).pad_to_width(10);
        let Some(ac) = sector.access_conditions().filter(|_| sector.is_present()) else {
            // Keys can still be known for a sector whose data couldn't be read.
            print!("{}{}", label.bold(), "not read".fg::<ColorUnknown>());
            sector
                .key_a()
                .tap_some(|key| print!(" key A {}", hex::encode_upper(key).fg::<ColorKeyA>()));
            sector
                .key_b()
                .tap_some(|key| print!(" key B {}", hex::encode_upper(key).fg::<ColorKeyB>()));
            println!();
            continue;
        };

        println!("{}", label.bold());
        for (i, block) in sector.blocks().enumerate() {
            println!(
                " {} │ {}",
                block_number(index, i).dimmed(),
                hex::encode_upper(block).fg::<ColorData>()
            );
        }
        println!(
            " {} │ {}{}{}",
            block_number(index, BLOCKS - 1).dimmed(),
            key_repr::<ColorKeyA>(sector.key(KeyType::A)),
            hex::encode_upper(ac).fg::<ColorAC>(),
            key_repr::<ColorKeyB>(sector.key(KeyType::B)),
        );
        println!();
    }

    println!(
        "{} of {} sectors read, {} distinct keys, {} unknown keys",
        dump.iter().filter(|s| s.is_present()).count(),
        dump.len(),
        keys::collect(dump).len(),
        unknown_keys(dump).fg::<ColorUnknown>(),
    );
}

/// Keys missing from sectors that were read.
fn unknown_keys(dump: &Dump) -> usize {
    let mut count = 0;
    for sector in dump.iter().filter(|s| s.is_present()) {
        for typ in [KeyType::A, KeyType::B] {
            if sector.key(typ).is_none() {
                count += 1;
            }
        }
    }
    count
}

fn block_number(sector: usize, block: usize) -> String {
    (sector * BLOCKS + block)
        .to_string()
        .pad_to_width_with_alignment(3, Alignment::Right)
}

fn key_repr<C: Color>(key: Option<&[u8; KEY_LEN]>) -> String {
    match key {
        Some(key) => hex::encode_upper(key).fg::<C>().to_string(),
        None => mct::UNKNOWN_KEY.fg::<ColorUnknown>().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfc::Sector;

    #[test]
    fn test_unknown_keys() {
        let mut dump = Dump::default();
        assert_eq!(unknown_keys(&dump), 0);

        dump[0] = Sector::new(Some(&[0; 48][..]), None, Some(&[0; 4][..]), Some(&[0xBB; 6][..]))
            .unwrap();
        dump[1] = Sector::new(Some(&[0; 48][..]), None, Some(&[0; 4][..]), None).unwrap();
        // Keys of a sector that wasn't read aren't counted either way.
        dump[2] = Sector::new(None, Some(&[0xAA; 6][..]), None, None).unwrap();
        assert_eq!(unknown_keys(&dump), 3);
    }

    #[test]
    fn test_block_number() {
        assert_eq!(block_number(0, 0), "  0");
        assert_eq!(block_number(15, BLOCKS - 1), " 63");
    }
}
