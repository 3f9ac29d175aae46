//! SNES Game Genie and Pro Action Replay
//!
//! Game Genie codes are `VVAA-AAAA` written in a substituted hex alphabet; the
//! 24-bit address half is additionally bit-scrambled. Pro Action Replay codes
//! are plain `AAAAAAVV` hex.

use super::{malformed, parse_hex, EncodeError, FormatDescriptor, FormatId, ParseError, PatchTuple};

/// Symbol for each nibble value, in order
const ALPHABET: &[u8; 16] = b"DF4709156BC8A23E";

pub(super) const GAME_GENIE: FormatDescriptor = FormatDescriptor {
    id: FormatId::SnesGameGenie,
    recognize: recognize_game_genie,
    decode: decode_game_genie,
    encode: encode_game_genie,
};

pub(super) const PRO_ACTION_REPLAY: FormatDescriptor = FormatDescriptor {
    id: FormatId::SnesProActionReplay,
    recognize: recognize_pro_action_replay,
    decode: decode_pro_action_replay,
    encode: encode_pro_action_replay,
};

fn recognize_game_genie(token: &str) -> bool {
    token.len() == 9 && token.as_bytes()[4] == b'-'
}

fn decode_game_genie(token: &str) -> Result<Vec<PatchTuple>, ParseError> {
    let mut raw = 0u32;
    for (i, b) in token.bytes().enumerate() {
        if i == 4 {
            continue;
        }
        let nibble = ALPHABET
            .iter()
            .position(|&c| c == b)
            .ok_or_else(|| malformed(token, FormatId::SnesGameGenie))?;
        raw = (raw << 4) | nibble as u32;
    }

    let value = (raw >> 24) as u8;
    Ok(vec![PatchTuple::new(unscramble(raw & 0xFF_FFFF), value)])
}

fn encode_game_genie(patch: &PatchTuple) -> Result<String, EncodeError> {
    check_snes_patch(patch, FormatId::SnesGameGenie)?;

    let raw = (u32::from(patch.value) << 24) | scramble(patch.address);
    let mut code = String::with_capacity(9);
    for i in 0..8 {
        if i == 4 {
            code.push('-');
        }
        let nibble = (raw >> (28 - 4 * i)) & 0xF;
        code.push(ALPHABET[nibble as usize] as char);
    }
    Ok(code)
}

/// Code bit layout to CPU address
fn unscramble(raw: u32) -> u32 {
    ((raw & 0x00_3C00) << 10)
        | ((raw & 0x00_003C) << 14)
        | ((raw & 0xF0_0000) >> 8)
        | ((raw & 0x00_0003) << 10)
        | ((raw & 0x00_C000) >> 6)
        | ((raw & 0x0F_0000) >> 12)
        | ((raw & 0x00_03C0) >> 6)
}

/// CPU address to code bit layout
fn scramble(address: u32) -> u32 {
    ((address & 0xF0_0000) >> 10)
        | ((address & 0x0F_0000) >> 14)
        | ((address & 0x00_F000) << 8)
        | ((address & 0x00_0C00) >> 10)
        | ((address & 0x00_0300) << 6)
        | ((address & 0x00_00F0) << 12)
        | ((address & 0x00_000F) << 6)
}

fn recognize_pro_action_replay(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_pro_action_replay(token: &str) -> Result<Vec<PatchTuple>, ParseError> {
    if token.len() != 8 {
        return Err(malformed(token, FormatId::SnesProActionReplay));
    }
    let raw = parse_hex(token, 8).ok_or_else(|| malformed(token, FormatId::SnesProActionReplay))?;
    Ok(vec![PatchTuple::new(raw >> 8, raw as u8)])
}

fn encode_pro_action_replay(patch: &PatchTuple) -> Result<String, EncodeError> {
    check_snes_patch(patch, FormatId::SnesProActionReplay)?;
    Ok(format!("{:06X}{:02X}", patch.address, patch.value))
}

fn check_snes_patch(patch: &PatchTuple, format: FormatId) -> Result<(), EncodeError> {
    let reason = if patch.compare.is_some() {
        "format has no compare byte"
    } else if patch.address > 0xFF_FFFF {
        "address wider than 24 bits"
    } else {
        return Ok(());
    };
    Err(EncodeError::Unencodable {
        patch: *patch,
        format,
        reason,
    })
}
