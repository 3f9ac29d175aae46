//! NES Game Genie
//!
//! Six letters encode a 15-bit address (always mapped into $8000-$FFFF) and a
//! replacement byte. Eight letters add a compare byte. Each letter stands for
//! a nibble; the nibbles are shuffled bit by bit across address, data and
//! compare. Bit 3 of the third letter flags an eight letter code.

use super::{malformed, EncodeError, FormatDescriptor, FormatId, ParseError, PatchTuple};

const ALPHABET: &[u8; 16] = b"APZLGITYEOXUKSVN";

pub(super) const GAME_GENIE: FormatDescriptor = FormatDescriptor {
    id: FormatId::NesGameGenie,
    recognize,
    decode,
    encode,
};

fn recognize(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphabetic())
}

fn decode(token: &str) -> Result<Vec<PatchTuple>, ParseError> {
    if token.len() != 6 && token.len() != 8 {
        return Err(malformed(token, FormatId::NesGameGenie));
    }

    let n = token
        .bytes()
        .map(|b| ALPHABET.iter().position(|&c| c == b).map(|i| i as u32))
        .collect::<Option<Vec<u32>>>()
        .ok_or_else(|| malformed(token, FormatId::NesGameGenie))?;

    let address = 0x8000
        | ((n[3] & 7) << 12)
        | ((n[5] & 7) << 8)
        | ((n[4] & 8) << 8)
        | ((n[2] & 7) << 4)
        | ((n[1] & 8) << 4)
        | (n[4] & 7)
        | (n[3] & 8);

    let data_high = ((n[1] & 7) << 4) | ((n[0] & 8) << 4) | (n[0] & 7);
    let patch = if n.len() == 8 {
        let value = data_high | (n[7] & 8);
        let compare = ((n[7] & 7) << 4) | ((n[6] & 8) << 4) | (n[6] & 7) | (n[5] & 8);
        PatchTuple::with_compare(address, value as u8, compare as u8)
    } else {
        PatchTuple::new(address, (data_high | (n[5] & 8)) as u8)
    };

    Ok(vec![patch])
}

fn encode(patch: &PatchTuple) -> Result<String, EncodeError> {
    if !(0x8000..=0xFFFF).contains(&patch.address) {
        return Err(EncodeError::Unencodable {
            patch: *patch,
            format: FormatId::NesGameGenie,
            reason: "address must lie in $8000-$FFFF",
        });
    }

    let a = patch.address & 0x7FFF;
    let d = u32::from(patch.value);
    let mut n = vec![
        ((d >> 4) & 8) | (d & 7),
        ((a >> 4) & 8) | ((d >> 4) & 7),
        (a >> 4) & 7,
        (a & 8) | ((a >> 12) & 7),
        ((a >> 8) & 8) | (a & 7),
    ];
    match patch.compare {
        Some(compare) => {
            let c = u32::from(compare);
            n[2] |= 8;
            n.push((c & 8) | ((a >> 8) & 7));
            n.push(((c >> 4) & 8) | (c & 7));
            n.push((d & 8) | ((c >> 4) & 7));
        }
        None => n.push((d & 8) | ((a >> 8) & 7)),
    }

    Ok(n.into_iter().map(|nibble| ALPHABET[nibble as usize] as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_codes() {
        let tests = [
            ("GOSSIP", 0xD1DD, 0x14, None),
            ("ZEXPYGLA", 0x94A7, 0x02, Some(0x03)),
            ("NTEINNYK", 0xDF07, 0xEF, Some(0x4F)),
            ("GXVUZGVG", 0xB4EA, 0x24, Some(0xC6)),
            ("GZNVILST", 0xE37D, 0x24, Some(0xE5)),
        ];

        for (code, address, value, compare) in tests {
            assert_eq!(
                decode(code).unwrap(),
                vec![PatchTuple {
                    address,
                    value,
                    compare
                }]
            );
        }
    }

    #[test]
    fn test_invalid_codes() {
        for code in ["GOSSI", "GOSSIPP", "BBBBBB", "CCCCCCCC"] {
            assert!(decode(code).is_err(), "{} should not decode", code);
        }
    }

    #[test]
    fn test_canonical_encoding() {
        // Eight letter codes already carry the length flag
        assert_eq!(encode(&PatchTuple::with_compare(0x94A7, 0x02, 0x03)).unwrap(), "ZEXPYGLA");
        // Six letter codes get it cleared
        assert_eq!(encode(&PatchTuple::new(0xD1DD, 0x14)).unwrap(), "GOISIP");
        assert_eq!(encode(&PatchTuple::new(0x8123, 0x09)).unwrap(), "PAZALO");
    }

    #[test]
    fn test_low_address_unencodable() {
        assert!(matches!(
            encode(&PatchTuple::new(0x00FF, 0x09)),
            Err(EncodeError::Unencodable { .. })
        ));
    }
}
