//! Cheat store
//!
//! Ordered collection of [`CheatRecord`]s plus the store-level "disable all"
//! switch. Records only change through the store; a code that fails to decode
//! never enters it. Duplicate codes are allowed to coexist.

use thiserror::Error;

use crate::codec::{EncodeError, ParseError};
use crate::persist::{PersistedCheat, PersistedCheatList};
use crate::platform::Platform;
use crate::record::{CheatId, CheatRecord};

/// Errors from bulk store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Code text did not decode
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// No record with this id
    #[error("no cheat with id {0}")]
    UnknownCheat(CheatId),
    /// A persisted entry no longer decodes for the platform
    #[error("saved cheat {index} is invalid: {source}")]
    InvalidEntry { index: usize, source: ParseError },
    /// A batch import line did not decode
    #[error("line {line}: {source}")]
    ImportLine { line: usize, source: ParseError },
    /// A record could not be re-encoded
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Ordered cheat collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheatStore {
    records: Vec<CheatRecord>,
    next_id: u64,
    disable_all: bool,
}

impl CheatStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a persisted list. Fails on the first entry that no
    /// longer decodes; nothing is kept in that case.
    pub fn load(list: &PersistedCheatList, platform: Platform) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for (index, cheat) in list.cheats.iter().enumerate() {
            let id = store.allocate_id();
            let mut record = CheatRecord::from_text(id, &cheat.code, &cheat.description, platform)
                .map_err(|source| StoreError::InvalidEntry { index, source })?;
            record.set_enabled(cheat.enabled);
            store.records.push(record);
        }
        store.disable_all = list.disable_all_cheats;
        Ok(store)
    }

    /// Serialize the whole store, re-encoding every code canonically
    pub fn save(&self) -> Result<PersistedCheatList, EncodeError> {
        let cheats = self
            .records
            .iter()
            .map(|record| {
                Ok(PersistedCheat {
                    code: record.canonical_code()?,
                    description: record.description().to_string(),
                    enabled: record.enabled(),
                })
            })
            .collect::<Result<Vec<_>, EncodeError>>()?;
        Ok(PersistedCheatList {
            cheats,
            disable_all_cheats: self.disable_all,
        })
    }

    /// Decode `text` and append it as a new enabled record
    pub fn add_from_text(
        &mut self,
        text: &str,
        description: &str,
        platform: Platform,
    ) -> Result<&CheatRecord, ParseError> {
        let record = CheatRecord::from_text(CheatId(self.next_id), text, description, platform)?;
        self.next_id += 1;
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Import one cheat per line: code text, then an optional description
    /// after whitespace. Blank lines and `#` comments are skipped. Either every
    /// line is added or none is.
    pub fn import(&mut self, text: &str, platform: Platform) -> Result<Vec<CheatId>, StoreError> {
        let mut imported = Vec::new();
        let mut next_id = self.next_id;
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (code, description) = match line.split_once(char::is_whitespace) {
                Some((code, description)) => (code, description.trim_start()),
                None => (line, ""),
            };
            let record = CheatRecord::from_text(CheatId(next_id), code, description, platform)
                .map_err(|source| StoreError::ImportLine {
                    line: index + 1,
                    source,
                })?;
            next_id += 1;
            imported.push(record);
        }

        self.next_id = next_id;
        let ids = imported.iter().map(CheatRecord::id).collect();
        self.records.extend(imported);
        Ok(ids)
    }

    /// Remove a record; absent ids are ignored
    pub fn remove(&mut self, id: CheatId) -> Option<CheatRecord> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(index))
    }

    /// Toggle a record. Returns false when the id is unknown.
    pub fn set_enabled(&mut self, id: CheatId, enabled: bool) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Replace the code text of an existing record
    pub fn update_code(&mut self, id: CheatId, text: &str, platform: Platform) -> Result<(), StoreError> {
        let record = self.get_mut(id).ok_or(StoreError::UnknownCheat(id))?;
        record.replace_code(text, platform)?;
        Ok(())
    }

    /// Change the description of an existing record
    pub fn set_description(&mut self, id: CheatId, description: &str) -> Result<(), StoreError> {
        let record = self.get_mut(id).ok_or(StoreError::UnknownCheat(id))?;
        record.set_description(description);
        Ok(())
    }

    /// Store-level switch overriding every record's flag
    pub fn disable_all(&self) -> bool {
        self.disable_all
    }

    pub fn set_disable_all(&mut self, disable_all: bool) {
        self.disable_all = disable_all;
    }

    pub fn get(&self, id: CheatId) -> Option<&CheatRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    fn get_mut(&mut self, id: CheatId) -> Option<&mut CheatRecord> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &CheatRecord> {
        self.records.iter()
    }

    /// Records whose own flag is set, ignoring the store-level switch
    pub fn enabled_records(&self) -> impl Iterator<Item = &CheatRecord> {
        self.records.iter().filter(|r| r.enabled())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn allocate_id(&mut self) -> CheatId {
        let id = CheatId(self.next_id);
        self.next_id += 1;
        id
    }
}
