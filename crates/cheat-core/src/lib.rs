//! Cheat Core - cheat code engine for emulator front-ends
//!
//! This crate parses cheat codes written in the classic console encodings
//! (Game Genie, Pro Action Replay, GameShark and raw address codes), keeps
//! them in an ordered store, and applies them to a running game as read
//! overrides on the memory bus, without touching emulated memory.

#![forbid(unsafe_code)]

/// Platform profiles: address windows and accepted formats
pub mod platform;
/// Cheat code text formats
pub mod codec;
/// Normalized cheat records
pub mod record;
/// Ordered cheat collection
pub mod store;
/// Persisted cheat lists
pub mod persist;
/// Live memory read overrides
pub mod applicator;
/// Memory bus with cheat overrides
pub mod bus;
/// Engine facade and lifecycle handling
pub mod engine;

pub use applicator::{ApplyError, OverrideReader, PatchApplicator, PatchHandle};
pub use bus::{Bus, CheatBus, RamBus};
pub use codec::{EncodeError, FormatId, ParseError, PatchTuple, UnknownFormat};
pub use engine::{CheatEngine, EngineError, LifecycleHandle};
pub use persist::{CheatPersistence, JsonFilePersistence, PersistedCheat, PersistedCheatList};
pub use platform::Platform;
pub use record::{CheatId, CheatRecord};
pub use store::{CheatStore, StoreError};
