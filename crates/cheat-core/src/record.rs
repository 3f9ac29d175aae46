//! Cheat records
//!
//! A record is the format-independent form of one user cheat: the decoded
//! patch tuples of every token, the format each token was written in, plus
//! description and enabled flag.

use std::fmt;

use crate::codec::{self, EncodeError, FormatId, ParseError, PatchTuple};
use crate::platform::Platform;

/// Shown in listings when a cheat has no description
pub const EMPTY_DESCRIPTION: &str = "[n/a]";

/// Stable identifier of a record inside a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheatId(pub u64);

impl fmt::Display for CheatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Patches decoded from one token, with the format to re-encode them in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    pub format: FormatId,
    pub patches: Vec<PatchTuple>,
}

/// One decoded cheat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheatRecord {
    id: CheatId,
    description: String,
    raw_code: String,
    lines: Vec<CodeLine>,
    enabled: bool,
}

impl CheatRecord {
    /// Decode `text` into a new record. Nothing is built unless every token decodes.
    pub fn from_text(
        id: CheatId,
        text: &str,
        description: &str,
        platform: Platform,
    ) -> Result<Self, ParseError> {
        let lines = decode_lines(text, platform)?;
        Ok(Self {
            id,
            description: description.to_string(),
            raw_code: text.trim().to_string(),
            lines,
            enabled: true,
        })
    }

    /// Replace the code text, keeping id, description and enabled flag
    pub(crate) fn replace_code(&mut self, text: &str, platform: Platform) -> Result<(), ParseError> {
        self.lines = decode_lines(text, platform)?;
        self.raw_code = text.trim().to_string();
        Ok(())
    }

    pub fn id(&self) -> CheatId {
        self.id
    }

    /// Description as entered, possibly empty
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Description for listings, falling back to [`EMPTY_DESCRIPTION`]
    pub fn display_description(&self) -> &str {
        if self.description.trim().is_empty() {
            EMPTY_DESCRIPTION
        } else {
            &self.description
        }
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    /// Code text as it was entered or loaded
    pub fn raw_code(&self) -> &str {
        &self.raw_code
    }

    /// Decoded tokens in entry order
    pub fn lines(&self) -> &[CodeLine] {
        &self.lines
    }

    /// All patch tuples in entry order
    pub fn patches(&self) -> impl Iterator<Item = &PatchTuple> {
        self.lines.iter().flat_map(|line| line.patches.iter())
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Re-encode every token in its original format
    pub fn canonical_code(&self) -> Result<String, EncodeError> {
        let tokens = self
            .lines
            .iter()
            .map(|line| codec::encode(&line.patches, line.format))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tokens.join("+"))
    }
}

fn decode_lines(text: &str, platform: Platform) -> Result<Vec<CodeLine>, ParseError> {
    Ok(codec::decode_text(text, platform)?
        .into_iter()
        .map(|decoded| CodeLine {
            format: decoded.format,
            patches: decoded.patches,
        })
        .collect())
}
