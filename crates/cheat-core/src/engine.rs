//! Cheat engine
//!
//! Ties the store, the persistence collaborator and the patch applicator
//! together and reacts to the emulation lifecycle.
//!
//! Two stores are kept: the persisted one, mirroring what was last loaded or
//! committed, and an optional working copy while cheats are being edited.
//! Every edit reinstalls overrides from the working copy immediately; commit
//! saves the working copy and makes it the persisted store, cancel drops it and
//! reinstalls the persisted set.
//!
//! Overrides belong to the loaded game. Once emulation stops, nothing is
//! installed again until the next game is loaded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::applicator::{OverrideReader, PatchApplicator, SkippedRecord};
use crate::codec::{EncodeError, ParseError};
use crate::persist::{CheatPersistence, PersistenceError};
use crate::platform::Platform;
use crate::record::CheatId;
use crate::store::{CheatStore, StoreError};

/// Engine error types
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Handle for the emulation lifecycle collaborator. Safe to use from any thread.
#[derive(Debug, Clone)]
pub struct LifecycleHandle {
    applicator: Arc<PatchApplicator>,
    session_active: Arc<AtomicBool>,
}

impl LifecycleHandle {
    /// End the session and retract every override before the emulated game goes away
    pub fn emulation_stopping(&self) {
        info!("emulation stopping, retracting cheats");
        self.session_active.store(false, Ordering::Release);
        self.applicator.retract_all();
    }
}

/// Cheat engine facade
#[derive(Debug)]
pub struct CheatEngine {
    platform: Platform,
    persisted: CheatStore,
    working: Option<CheatStore>,
    applicator: Arc<PatchApplicator>,
    /// Set while a game is loaded, cleared by the stop signal
    session_active: Arc<AtomicBool>,
    /// Records left out by the latest reinstall
    skipped: Vec<SkippedRecord>,
}

impl CheatEngine {
    /// Create an engine with an empty cheat list
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            persisted: CheatStore::new(),
            working: None,
            applicator: Arc::new(PatchApplicator::new(platform)),
            session_active: Arc::new(AtomicBool::new(false)),
            skipped: Vec::new(),
        }
    }

    /// Reader for the memory read path
    pub fn reader(&self) -> OverrideReader {
        self.applicator.reader()
    }

    /// Handle for lifecycle notifications arriving from other threads
    pub fn lifecycle(&self) -> LifecycleHandle {
        LifecycleHandle {
            applicator: Arc::clone(&self.applicator),
            session_active: Arc::clone(&self.session_active),
        }
    }

    /// Get the applicator
    pub fn applicator(&self) -> &PatchApplicator {
        &self.applicator
    }

    /// Get the current platform
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// A game was loaded: drop any edit session and install the saved cheats.
    /// If the saved list does not decode for `platform`, nothing is installed.
    pub fn on_game_loaded(
        &mut self,
        platform: Platform,
        persistence: &dyn CheatPersistence,
    ) -> Result<&[SkippedRecord], EngineError> {
        self.platform = platform;
        self.working = None;
        self.persisted = CheatStore::new();
        self.skipped.clear();
        self.applicator.set_platform(platform);
        self.session_active.store(true, Ordering::Release);

        let list = persistence.load()?;
        self.persisted = CheatStore::load(&list, platform)?;
        info!(
            "game loaded on {}: {} cheats, {} enabled",
            platform,
            self.persisted.len(),
            self.persisted.enabled_records().count()
        );
        self.apply_current();
        Ok(self.skipped.as_slice())
    }

    /// Emulation is stopping: end the edit session and retract everything
    pub fn on_emulation_stopping(&mut self) {
        self.working = None;
        self.skipped.clear();
        self.lifecycle().emulation_stopping();
    }

    /// Start editing a working copy of the persisted cheats
    pub fn begin_edit(&mut self) -> &CheatStore {
        self.working_mut()
    }

    /// Whether an edit session is open
    pub fn is_editing(&self) -> bool {
        self.working.is_some()
    }

    /// Cheats currently in effect: the working copy while editing
    pub fn cheats(&self) -> &CheatStore {
        self.working.as_ref().unwrap_or(&self.persisted)
    }

    /// Cheats as last loaded or committed
    pub fn persisted(&self) -> &CheatStore {
        &self.persisted
    }

    /// Whether a game is loaded and emulation has not stopped
    pub fn is_session_active(&self) -> bool {
        self.session_active.load(Ordering::Acquire)
    }

    /// Add a cheat to the working copy and apply it
    pub fn add_cheat(&mut self, text: &str, description: &str) -> Result<CheatId, ParseError> {
        let platform = self.platform;
        let id = self.edit(|store| store.add_from_text(text, description, platform).map(|r| r.id()))?;
        self.apply_current();
        Ok(id)
    }

    /// Import a batch of cheats into the working copy and apply them
    pub fn import(&mut self, text: &str) -> Result<Vec<CheatId>, StoreError> {
        let platform = self.platform;
        let ids = self.edit(|store| store.import(text, platform))?;
        self.apply_current();
        Ok(ids)
    }

    /// Edit an existing cheat's code and description
    pub fn update_cheat(&mut self, id: CheatId, text: &str, description: &str) -> Result<(), StoreError> {
        let platform = self.platform;
        self.edit(|store| {
            store.update_code(id, text, platform)?;
            store.set_description(id, description)
        })?;
        self.apply_current();
        Ok(())
    }

    /// Remove a cheat. Returns false if it did not exist.
    pub fn remove_cheat(&mut self, id: CheatId) -> bool {
        if self.cheats().get(id).is_none() {
            return false;
        }
        self.working_mut().remove(id);
        self.apply_current();
        true
    }

    /// Toggle a cheat. Returns false if it does not exist.
    pub fn set_enabled(&mut self, id: CheatId, enabled: bool) -> bool {
        if self.cheats().get(id).is_none() {
            return false;
        }
        self.working_mut().set_enabled(id, enabled);
        self.apply_current();
        true
    }

    /// Toggle the store-level "disable all cheats" switch
    pub fn set_disable_all(&mut self, disable_all: bool) {
        self.working_mut().set_disable_all(disable_all);
        self.apply_current();
    }

    /// Save the working copy and make it the persisted store.
    /// On a save failure the edit session stays open.
    pub fn commit(&mut self, persistence: &dyn CheatPersistence) -> Result<&[SkippedRecord], EngineError> {
        if let Some(working) = self.working.as_ref() {
            let list = working.save()?;
            persistence.save(&list)?;
            info!("committed {} cheats", list.cheats.len());
        }
        if let Some(working) = self.working.take() {
            self.persisted = working;
        }
        self.apply_current();
        Ok(self.skipped.as_slice())
    }

    /// Drop the working copy and go back to the persisted cheats
    pub fn cancel(&mut self) -> &[SkippedRecord] {
        if self.working.take().is_some() {
            info!("cheat edits discarded");
        }
        self.apply_current();
        &self.skipped
    }

    fn working_mut(&mut self) -> &mut CheatStore {
        self.working.get_or_insert_with(|| self.persisted.clone())
    }

    /// Run a fallible edit on a copy of the current cheats. The edit session
    /// only opens (or changes) when the edit succeeds.
    fn edit<T, E>(&mut self, f: impl FnOnce(&mut CheatStore) -> Result<T, E>) -> Result<T, E> {
        let mut candidate = self.cheats().clone();
        let value = f(&mut candidate)?;
        self.working = Some(candidate);
        Ok(value)
    }

    fn apply_current(&mut self) {
        if !self.is_session_active() {
            self.skipped.clear();
            self.applicator.retract_all();
            return;
        }

        let store = self.working.as_ref().unwrap_or(&self.persisted);
        self.skipped = if store.disable_all() {
            self.applicator.retract_all();
            Vec::new()
        } else {
            self.applicator.reinstall_enabled(store.iter())
        };

        // A stop delivered from another thread while reinstalling
        if !self.is_session_active() {
            self.applicator.retract_all();
        }
    }
}
