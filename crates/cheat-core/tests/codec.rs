//! Format codec tests

use cheat_core::codec::{decode, decode_token, encode, EncodeError, FormatId, ParseError, PatchTuple};
use cheat_core::platform::Platform;

/// A platform accepting the format
fn home(format: FormatId) -> Platform {
    Platform::ALL
        .into_iter()
        .find(|p| p.supports(format))
        .unwrap()
}

/// Representative patches each format can express
fn samples(format: FormatId) -> Vec<PatchTuple> {
    match format {
        FormatId::Raw => vec![
            PatchTuple::new(0x0000, 0x00),
            PatchTuple::new(0x00FF, 0x09),
            PatchTuple::with_compare(0xFFFF, 0xFF, 0x00),
        ],
        FormatId::NesGameGenie => vec![
            PatchTuple::new(0x8000, 0x00),
            PatchTuple::new(0xD1DD, 0x14),
            PatchTuple::with_compare(0xFFFF, 0xFF, 0xFF),
            PatchTuple::with_compare(0x94A7, 0x02, 0x03),
        ],
        FormatId::SnesGameGenie | FormatId::SnesProActionReplay => vec![
            PatchTuple::new(0x00_0000, 0x00),
            PatchTuple::new(0x7E_0DBF, 0x09),
            PatchTuple::new(0xFF_FFFF, 0xFF),
            PatchTuple::new(0xC0_FFEE, 0x5A),
        ],
        FormatId::GbGameGenie => vec![
            PatchTuple::new(0x0000, 0x00),
            PatchTuple::new(0x4A17, 0x3E),
            PatchTuple::with_compare(0xFFFF, 0xFF, 0xC8),
            PatchTuple::with_compare(0x0150, 0x00, 0x00),
        ],
        FormatId::GbGameShark => vec![
            PatchTuple::new(0xC110, 0xFF),
            PatchTuple::new(0xDFFF, 0x00),
        ],
    }
}

#[test]
fn test_round_trip_every_format() {
    for format in FormatId::all() {
        let platform = home(format);
        for patch in samples(format) {
            let text = encode(&[patch], format).unwrap();
            let decoded = decode_token(&text, platform).unwrap();
            assert_eq!(decoded.format, format, "{} claimed by wrong format", text);
            assert_eq!(decoded.patches, vec![patch], "{} did not round trip", text);
        }
    }
}

#[test]
fn test_canonical_text_is_stable() {
    for format in FormatId::all() {
        let platform = home(format);
        for patch in samples(format) {
            let text = encode(&[patch], format).unwrap();
            let again = encode(&decode(&text, platform).unwrap(), format).unwrap();
            assert_eq!(text, again);
            assert_eq!(text, text.to_ascii_uppercase());
        }
    }
}

#[test]
fn test_known_codes() {
    assert_eq!(
        decode("SXIOPO", Platform::Nes).unwrap()[0].address & 0x8000,
        0x8000
    );
    assert_eq!(
        decode("ZEXPYGLA", Platform::Nes).unwrap(),
        vec![PatchTuple::with_compare(0x94A7, 0x02, 0x03)]
    );
    assert_eq!(
        decode("7E0DBF63", Platform::Snes).unwrap(),
        vec![PatchTuple::new(0x7E0DBF, 0x63)]
    );
    assert_eq!(
        decode("01FF10C1", Platform::GameBoy).unwrap(),
        vec![PatchTuple::new(0xC110, 0xFF)]
    );
    assert_eq!(
        decode("00a-17b-c49", Platform::GameBoy).unwrap(),
        vec![PatchTuple::with_compare(0x4A17, 0x00, 0xC8)]
    );
}

#[test]
fn test_not_a_code() {
    for platform in Platform::ALL {
        assert!(matches!(
            decode("not-a-valid-code", platform),
            Err(ParseError::NoMatchingFormat { .. })
        ));
    }
}

#[test]
fn test_claimed_token_does_not_fall_through() {
    // Nine hex digits look like Pro Action Replay but have the wrong length
    assert!(matches!(
        decode("7E0DBF630", Platform::Snes),
        Err(ParseError::MalformedToken {
            format: FormatId::SnesProActionReplay,
            ..
        })
    ));
    // Game Boy Game Genie with a misplaced dash
    assert!(matches!(
        decode("00A1-7BC49", Platform::GameBoy),
        Err(ParseError::MalformedToken {
            format: FormatId::GbGameGenie,
            ..
        })
    ));
}

#[test]
fn test_address_window_per_platform() {
    assert_eq!(
        decode("200000:01", Platform::PcEngine),
        Err(ParseError::AddressOutOfRange {
            address: 0x20_0000,
            platform: Platform::PcEngine
        })
    );
    assert!(decode("1FFFFF:01", Platform::PcEngine).is_ok());
    assert!(decode("10000:01", Platform::Nes).is_err());
}

#[test]
fn test_unencodable_patches() {
    assert!(matches!(
        encode(&[PatchTuple::with_compare(0x7E0000, 1, 2)], FormatId::SnesProActionReplay),
        Err(EncodeError::Unencodable { .. })
    ));
    assert!(matches!(
        encode(&[PatchTuple::new(0x1_0000, 1)], FormatId::GbGameShark),
        Err(EncodeError::Unencodable { .. })
    ));
}
