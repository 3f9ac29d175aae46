//! Patch applicator
//!
//! Installed patches never touch emulated memory. They are published as an
//! immutable [`OverrideSet`] snapshot which the memory read path consults
//! through an [`OverrideReader`]. A new snapshot is built and swapped in only
//! when the installed set changes (install, retract, reinstall), never per
//! read. Readers notice a swap by comparing generation numbers, so the steady
//! state read path takes no lock.
//!
//! Overlapping patches on one address are resolved by installation order: the
//! first installed patch whose condition holds wins.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use log::{debug, warn};
use thiserror::Error;

use crate::codec::PatchTuple;
use crate::platform::Platform;
use crate::record::{CheatId, CheatRecord};

/// Errors when installing patches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// Patch address is outside the current platform window
    #[error("cannot patch ${address:X}: outside the {platform} address space")]
    AddressOutOfRange { address: u32, platform: Platform },
}

/// Handle to one installation, used to retract it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatchHandle(u64);

/// Record left out of a reinstall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub id: CheatId,
    pub error: ApplyError,
}

/// Immutable lookup table consulted on every memory read
#[derive(Debug, Default)]
pub struct OverrideSet {
    generation: u64,
    by_address: HashMap<u32, Vec<PatchTuple>>,
}

impl OverrideSet {
    fn build<'a>(generation: u64, patches: impl Iterator<Item = &'a PatchTuple>) -> Self {
        let mut by_address: HashMap<u32, Vec<PatchTuple>> = HashMap::new();
        for patch in patches {
            by_address.entry(patch.address).or_default().push(*patch);
        }
        Self {
            generation,
            by_address,
        }
    }

    /// Byte a read of `address` should see, given what memory actually holds.
    /// Compare bytes are checked against `underlying` on every call.
    pub fn apply(&self, address: u32, underlying: u8) -> u8 {
        if let Some(patches) = self.by_address.get(&address) {
            for patch in patches {
                match patch.compare {
                    None => return patch.value,
                    Some(compare) if compare == underlying => return patch.value,
                    Some(_) => {}
                }
            }
        }
        underlying
    }

    /// Whether any patch targets `address`
    pub fn covers(&self, address: u32) -> bool {
        self.by_address.contains_key(&address)
    }

    /// Number of patched addresses
    pub fn address_count(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Published {
    generation: AtomicU64,
    current: RwLock<Arc<OverrideSet>>,
}

/// Read side of the applicator, shared with the memory read path
#[derive(Clone)]
pub struct OverrideReader {
    published: Arc<Published>,
}

impl OverrideReader {
    /// Generation of the latest published snapshot
    pub fn generation(&self) -> u64 {
        self.published.generation.load(Ordering::Acquire)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<OverrideSet> {
        match self.published.current.read() {
            Ok(current) => Arc::clone(&current),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Resolve a single read against the latest snapshot
    pub fn read(&self, address: u32, underlying: u8) -> u8 {
        self.snapshot().apply(address, underlying)
    }
}

impl std::fmt::Debug for OverrideReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideReader")
            .field("generation", &self.generation())
            .finish()
    }
}

struct InstallState {
    platform: Platform,
    installed: BTreeMap<PatchHandle, Vec<PatchTuple>>,
    next_handle: u64,
}

/// Turns patch tuples into live read overrides and retracts them again
pub struct PatchApplicator {
    state: Mutex<InstallState>,
    published: Arc<Published>,
}

impl PatchApplicator {
    /// Create an applicator with nothing installed
    pub fn new(platform: Platform) -> Self {
        Self {
            state: Mutex::new(InstallState {
                platform,
                installed: BTreeMap::new(),
                next_handle: 0,
            }),
            published: Arc::new(Published {
                generation: AtomicU64::new(0),
                current: RwLock::new(Arc::new(OverrideSet::default())),
            }),
        }
    }

    /// Reader to hand to the memory read path
    pub fn reader(&self) -> OverrideReader {
        OverrideReader {
            published: Arc::clone(&self.published),
        }
    }

    /// Platform used to validate addresses
    pub fn platform(&self) -> Platform {
        self.lock().platform
    }

    /// Switch platform. Everything installed for the old one is retracted.
    pub fn set_platform(&self, platform: Platform) {
        let mut state = self.lock();
        state.platform = platform;
        state.installed.clear();
        self.publish(&state);
    }

    /// Install a group of patches. Nothing is installed unless every address
    /// fits the platform window.
    pub fn install(&self, patches: &[PatchTuple]) -> Result<PatchHandle, ApplyError> {
        let mut state = self.lock();
        let handle = Self::insert(&mut state, patches)?;
        self.publish(&state);
        Ok(handle)
    }

    /// Retract one installation. Returns false if it was not installed.
    pub fn retract(&self, handle: PatchHandle) -> bool {
        let mut state = self.lock();
        let removed = state.installed.remove(&handle).is_some();
        if removed {
            self.publish(&state);
        }
        removed
    }

    /// Drop every engine-owned override. Memory itself is left alone.
    pub fn retract_all(&self) {
        let mut state = self.lock();
        state.installed.clear();
        self.publish(&state);
    }

    /// Replace everything installed with the enabled records, in order.
    /// Records with out-of-range patches are skipped whole and reported.
    pub fn reinstall_enabled<'a>(
        &self,
        records: impl IntoIterator<Item = &'a CheatRecord>,
    ) -> Vec<SkippedRecord> {
        let mut state = self.lock();
        state.installed.clear();

        let mut skipped = Vec::new();
        for record in records.into_iter().filter(|r| r.enabled()) {
            let patches: Vec<PatchTuple> = record.patches().copied().collect();
            if let Err(error) = Self::insert(&mut state, &patches) {
                warn!("skipping cheat {}: {}", record.id(), error);
                skipped.push(SkippedRecord {
                    id: record.id(),
                    error,
                });
            }
        }

        self.publish(&state);
        skipped
    }

    /// Number of live installations
    pub fn installed_count(&self) -> usize {
        self.lock().installed.len()
    }

    /// Generation of the latest published snapshot
    pub fn generation(&self) -> u64 {
        self.published.generation.load(Ordering::Acquire)
    }

    fn insert(state: &mut InstallState, patches: &[PatchTuple]) -> Result<PatchHandle, ApplyError> {
        if let Some(patch) = patches.iter().find(|p| !state.platform.contains(p.address)) {
            return Err(ApplyError::AddressOutOfRange {
                address: patch.address,
                platform: state.platform,
            });
        }
        let handle = PatchHandle(state.next_handle);
        state.next_handle += 1;
        state.installed.insert(handle, patches.to_vec());
        Ok(handle)
    }

    /// Build a snapshot from the installed set and swap it in.
    /// Called with the state lock held so publishes are serialized.
    fn publish(&self, state: &MutexGuard<'_, InstallState>) {
        let generation = self.published.generation.load(Ordering::Relaxed) + 1;
        let set = OverrideSet::build(generation, state.installed.values().flatten());
        debug!(
            "publishing overrides generation {}: {} installs, {} addresses",
            generation,
            state.installed.len(),
            set.address_count()
        );

        let set = Arc::new(set);
        match self.published.current.write() {
            Ok(mut current) => *current = set,
            Err(poisoned) => *poisoned.into_inner() = set,
        }
        self.published.generation.store(generation, Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, InstallState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for PatchApplicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchApplicator")
            .field("platform", &self.platform())
            .field("installed", &self.installed_count())
            .field("generation", &self.generation())
            .finish()
    }
}
