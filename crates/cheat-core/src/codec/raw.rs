//! Raw `ADDR:VV[:CC]` codes, accepted on every platform

use super::{malformed, parse_hex, EncodeError, FormatDescriptor, FormatId, ParseError, PatchTuple};

pub(super) const RAW: FormatDescriptor = FormatDescriptor {
    id: FormatId::Raw,
    recognize,
    decode,
    encode,
};

fn recognize(token: &str) -> bool {
    token.contains(':')
}

fn decode(token: &str) -> Result<Vec<PatchTuple>, ParseError> {
    let parts: Vec<&str> = token.split(':').collect();
    let (address, value, compare) = match parts.as_slice() {
        [address, value] => (address, value, None),
        [address, value, compare] => (address, value, Some(compare)),
        _ => return Err(malformed(token, FormatId::Raw)),
    };

    // Wider than any platform on purpose: the range check reports oversized addresses
    let address = parse_hex(address, 8).ok_or_else(|| malformed(token, FormatId::Raw))?;
    let value = parse_hex(value, 2).ok_or_else(|| malformed(token, FormatId::Raw))? as u8;
    let compare = match compare {
        Some(compare) => {
            Some(parse_hex(compare, 2).ok_or_else(|| malformed(token, FormatId::Raw))? as u8)
        }
        None => None,
    };

    Ok(vec![PatchTuple {
        address,
        value,
        compare,
    }])
}

fn encode(patch: &PatchTuple) -> Result<String, EncodeError> {
    let width = match patch.address {
        0..=0xFFFF => 4,
        0x1_0000..=0xFF_FFFF => 6,
        _ => 8,
    };
    let mut code = format!("{:0width$X}:{:02X}", patch.address, patch.value, width = width);
    if let Some(compare) = patch.compare {
        code.push_str(&format!(":{:02X}", compare));
    }
    Ok(code)
}
