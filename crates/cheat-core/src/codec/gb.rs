//! Game Boy Game Genie and GameShark

use super::{malformed, parse_hex, EncodeError, FormatDescriptor, FormatId, ParseError, PatchTuple};

pub(super) const GAME_GENIE: FormatDescriptor = FormatDescriptor {
    id: FormatId::GbGameGenie,
    recognize: recognize_game_genie,
    decode: decode_game_genie,
    encode: encode_game_genie,
};

pub(super) const GAME_SHARK: FormatDescriptor = FormatDescriptor {
    id: FormatId::GbGameShark,
    recognize: recognize_game_shark,
    decode: decode_game_shark,
    encode: encode_game_shark,
};

fn recognize_game_genie(token: &str) -> bool {
    token.contains('-') && token.bytes().all(|b| b == b'-' || b.is_ascii_hexdigit())
}

fn decode_game_genie(token: &str) -> Result<Vec<PatchTuple>, ParseError> {
    // "ABC-DEF" or "ABC-DEF-GHI"
    // AB: new data
    // FCDE: address, XORed with $F000
    // GI: old data, XORed with $BA and rotated left by two
    // H: not used
    let bytes = token.as_bytes();
    let dashes_ok = match bytes.len() {
        7 => bytes[3] == b'-',
        11 => bytes[3] == b'-' && bytes[7] == b'-',
        _ => false,
    };
    let digits = token.replace('-', "");
    if !dashes_ok || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed(token, FormatId::GbGameGenie));
    }

    let hex = |range: std::ops::Range<usize>| {
        parse_hex(&digits[range], 4).ok_or_else(|| malformed(token, FormatId::GbGameGenie))
    };

    let value = hex(0..2)? as u8;
    let cdef = hex(2..6)? as u16;
    let address = u32::from(cdef.rotate_right(4) ^ 0xF000);

    if digits.len() == 9 {
        let gh = hex(6..8)? as u8;
        let i = hex(8..9)? as u8;
        let gi = (gh & 0xF0) | i;
        let compare = gi.rotate_right(2) ^ 0xBA;
        Ok(vec![PatchTuple::with_compare(address, value, compare)])
    } else {
        Ok(vec![PatchTuple::new(address, value)])
    }
}

fn encode_game_genie(patch: &PatchTuple) -> Result<String, EncodeError> {
    if patch.address > 0xFFFF {
        return Err(EncodeError::Unencodable {
            patch: *patch,
            format: FormatId::GbGameGenie,
            reason: "address wider than 16 bits",
        });
    }

    let cdef = (patch.address as u16 ^ 0xF000).rotate_left(4);
    let abc = (u16::from(patch.value) << 4) | (cdef >> 12);
    let def = cdef & 0x0FFF;
    let mut code = format!("{:03X}-{:03X}", abc, def);

    if let Some(compare) = patch.compare {
        let gi = (compare ^ 0xBA).rotate_left(2);
        let ghi = (u16::from(gi & 0xF0) << 4) | u16::from(gi & 0x0F);
        code.push_str(&format!("-{:03X}", ghi));
    }
    Ok(code)
}

fn recognize_game_shark(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_game_shark(token: &str) -> Result<Vec<PatchTuple>, ParseError> {
    // TTVVLLHH: type (ignored), value, address low, address high
    if token.len() != 8 {
        return Err(malformed(token, FormatId::GbGameShark));
    }
    let raw = parse_hex(token, 8).ok_or_else(|| malformed(token, FormatId::GbGameShark))?;
    let value = (raw >> 16) as u8;
    let address = ((raw & 0xFF) << 8) | ((raw >> 8) & 0xFF);
    Ok(vec![PatchTuple::new(address, value)])
}

fn encode_game_shark(patch: &PatchTuple) -> Result<String, EncodeError> {
    let reason = if patch.compare.is_some() {
        "format has no compare byte"
    } else if patch.address > 0xFFFF {
        "address wider than 16 bits"
    } else {
        return Ok(format!(
            "01{:02X}{:02X}{:02X}",
            patch.value,
            patch.address & 0xFF,
            patch.address >> 8
        ));
    };
    Err(EncodeError::Unencodable {
        patch: *patch,
        format: FormatId::GbGameShark,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_genie_decode() {
        assert_eq!(
            decode_game_genie("00A-17B-C49").unwrap(),
            vec![PatchTuple::with_compare(0x4A17, 0x00, 0xC8)]
        );
        assert_eq!(
            decode_game_genie("3E8-21F").unwrap(),
            vec![PatchTuple::new(0x0821, 0x3E)]
        );
    }

    #[test]
    fn test_game_genie_encode_drops_unused_digit() {
        assert_eq!(
            encode_game_genie(&PatchTuple::with_compare(0x4A17, 0x00, 0xC8)).unwrap(),
            "00A-17B-C09"
        );
        assert_eq!(encode_game_genie(&PatchTuple::new(0x4000, 0x3C)).unwrap(), "3C0-00B");
    }

    #[test]
    fn test_game_genie_layout() {
        for token in ["00A17B-C49", "00A-17BC49", "00A-17B-C4", "0-0"] {
            assert!(decode_game_genie(token).is_err(), "{} should not decode", token);
        }
    }

    #[test]
    fn test_game_shark() {
        assert_eq!(
            decode_game_shark("01FF10C1").unwrap(),
            vec![PatchTuple::new(0xC110, 0xFF)]
        );
        assert_eq!(
            encode_game_shark(&PatchTuple::new(0xC110, 0xFF)).unwrap(),
            "01FF10C1"
        );
        assert!(encode_game_shark(&PatchTuple::with_compare(0xC110, 0xFF, 0)).is_err());
    }
}
