//! Cheat code text formats
//!
//! Every supported encoding is described by a static [`FormatDescriptor`]: a
//! recognizer over the token shape plus decode/encode functions. Descriptors
//! are tried in the fixed order of [`DESCRIPTORS`], skipping formats the
//! platform does not accept. The first descriptor that recognizes a token owns
//! it; a decode failure in that descriptor is reported as-is and never falls
//! through to a later format.
//!
//! Priority order (most distinguishing token shape first):
//! 1. Raw                  - contains `:`
//! 2. SNES Game Genie      - `XXXX-XXXX`
//! 3. Game Boy Game Genie  - `ABC-DEF[-GHI]`
//! 4. NES Game Genie       - letters only
//! 5. SNES Pro Action Replay / Game Boy GameShark - 8 plain hex digits
//!
//! The two plain-hex formats never share a platform, so no accepted token
//! matches more than one descriptor on any single platform.

mod gb;
mod nes;
mod raw;
mod snes;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::platform::Platform;

/// A single address/value(/compare) unit applied by a cheat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchTuple {
    /// Target address in the platform address space
    pub address: u32,
    /// Byte returned for reads of `address`
    pub value: u8,
    /// Only patch while the underlying byte equals this value
    pub compare: Option<u8>,
}

impl PatchTuple {
    /// Unconditional patch
    pub fn new(address: u32, value: u8) -> Self {
        Self {
            address,
            value,
            compare: None,
        }
    }

    /// Conditional patch, active only while memory holds `compare`
    pub fn with_compare(address: u32, value: u8, compare: u8) -> Self {
        Self {
            address,
            value,
            compare: Some(compare),
        }
    }
}

impl fmt::Display for PatchTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:04X}={:02X}", self.address, self.value)?;
        if let Some(compare) = self.compare {
            write!(f, " if {:02X}", compare)?;
        }
        Ok(())
    }
}

/// Identifier of a cheat code text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    /// `ADDR:VV[:CC]` hexadecimal
    Raw,
    /// 6 or 8 letter NES Game Genie
    NesGameGenie,
    /// `XXXX-XXXX` SNES Game Genie
    SnesGameGenie,
    /// `AAAAAAVV` SNES Pro Action Replay
    SnesProActionReplay,
    /// `ABC-DEF[-GHI]` Game Boy Game Genie
    GbGameGenie,
    /// `TTVVLLHH` Game Boy GameShark
    GbGameShark,
}

impl FormatId {
    /// All formats in priority order
    pub fn all() -> impl Iterator<Item = FormatId> {
        DESCRIPTORS.iter().map(|d| d.id)
    }

    /// Static descriptor for this format
    pub fn descriptor(self) -> &'static FormatDescriptor {
        match self {
            FormatId::Raw => &raw::RAW,
            FormatId::NesGameGenie => &nes::GAME_GENIE,
            FormatId::SnesGameGenie => &snes::GAME_GENIE,
            FormatId::SnesProActionReplay => &snes::PRO_ACTION_REPLAY,
            FormatId::GbGameGenie => &gb::GAME_GENIE,
            FormatId::GbGameShark => &gb::GAME_SHARK,
        }
    }

    /// Short name used in listings and on the command line
    pub fn name(self) -> &'static str {
        match self {
            FormatId::Raw => "raw",
            FormatId::NesGameGenie => "nes-gg",
            FormatId::SnesGameGenie => "snes-gg",
            FormatId::SnesProActionReplay => "snes-par",
            FormatId::GbGameGenie => "gb-gg",
            FormatId::GbGameShark => "gb-gs",
        }
    }

    /// Whether the format can carry a compare byte
    pub fn supports_compare(self) -> bool {
        matches!(
            self,
            FormatId::Raw | FormatId::NesGameGenie | FormatId::GbGameGenie
        )
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown cheat format name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cheat format `{0}` (expected raw, nes-gg, snes-gg, snes-par, gb-gg or gb-gs)")]
pub struct UnknownFormat(pub String);

impl FromStr for FormatId {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FormatId::all()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Errors when decoding cheat code text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Token was claimed by a format but has the wrong length or characters
    #[error("malformed {format} code `{token}`")]
    MalformedToken { token: String, format: FormatId },
    /// No format available on the platform recognizes the token
    #[error("no cheat format matches `{token}`")]
    NoMatchingFormat { token: String },
    /// Decoded address lies outside the platform window
    #[error("address ${address:X} is outside the {platform} address space")]
    AddressOutOfRange { address: u32, platform: Platform },
}

/// Errors when encoding patch tuples back to text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The patch cannot be expressed in the requested format
    #[error("{patch} cannot be encoded as {format}: {reason}")]
    Unencodable {
        patch: PatchTuple,
        format: FormatId,
        reason: &'static str,
    },
    /// Nothing to encode
    #[error("no patches to encode")]
    NoPatches,
}

/// Recognizer and codec for one cheat code encoding
pub struct FormatDescriptor {
    /// Format tag
    pub id: FormatId,
    recognize: fn(&str) -> bool,
    decode: fn(&str) -> Result<Vec<PatchTuple>, ParseError>,
    encode: fn(&PatchTuple) -> Result<String, EncodeError>,
}

impl FormatDescriptor {
    /// Structural match on an already normalized token
    pub fn recognizes(&self, token: &str) -> bool {
        (self.recognize)(token)
    }
}

impl fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("id", &self.id)
            .finish()
    }
}

/// All descriptors, in the order they are tried
pub static DESCRIPTORS: [FormatDescriptor; 6] = [
    raw::RAW,
    snes::GAME_GENIE,
    gb::GAME_GENIE,
    nes::GAME_GENIE,
    snes::PRO_ACTION_REPLAY,
    gb::GAME_SHARK,
];

/// One decoded token together with the format that claimed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Format the token was written in
    pub format: FormatId,
    /// Patches encoded by the token
    pub patches: Vec<PatchTuple>,
}

/// Decode a single token into its patch tuples
pub fn decode(token: &str, platform: Platform) -> Result<Vec<PatchTuple>, ParseError> {
    decode_token(token, platform).map(|decoded| decoded.patches)
}

/// Decode a single token, keeping track of the format that matched
pub fn decode_token(token: &str, platform: Platform) -> Result<DecodedToken, ParseError> {
    let token = token.trim().to_ascii_uppercase();

    let descriptor = DESCRIPTORS
        .iter()
        .filter(|d| platform.supports(d.id))
        .find(|d| d.recognizes(&token))
        .ok_or_else(|| ParseError::NoMatchingFormat {
            token: token.clone(),
        })?;

    let patches = (descriptor.decode)(&token)?;
    if let Some(patch) = patches.iter().find(|p| !platform.contains(p.address)) {
        return Err(ParseError::AddressOutOfRange {
            address: patch.address,
            platform,
        });
    }

    Ok(DecodedToken {
        format: descriptor.id,
        patches,
    })
}

/// Decode a full cheat code text: tokens separated by `+`, spaces or newlines.
/// Either every token decodes or the whole text is rejected.
pub fn decode_text(text: &str, platform: Platform) -> Result<Vec<DecodedToken>, ParseError> {
    let tokens: Vec<&str> = split_tokens(text).collect();
    if tokens.is_empty() {
        return Err(ParseError::NoMatchingFormat {
            token: text.trim().to_string(),
        });
    }
    tokens
        .into_iter()
        .map(|token| decode_token(token, platform))
        .collect()
}

/// Encode patches in the given format; multiple tokens are joined with `+`
pub fn encode(patches: &[PatchTuple], format: FormatId) -> Result<String, EncodeError> {
    if patches.is_empty() {
        return Err(EncodeError::NoPatches);
    }
    let descriptor = format.descriptor();
    let tokens = patches
        .iter()
        .map(|patch| (descriptor.encode)(patch))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tokens.join("+"))
}

/// Split cheat text into individual code tokens
pub fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == '+' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Parse up to `max_digits` hexadecimal digits
pub(crate) fn parse_hex(digits: &str, max_digits: usize) -> Option<u32> {
    if digits.is_empty()
        || digits.len() > max_digits
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Shared helper for per-format decode failures
pub(crate) fn malformed(token: &str, format: FormatId) -> ParseError {
    ParseError::MalformedToken {
        token: token.to_string(),
        format,
    }
}
