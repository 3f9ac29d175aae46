//! Memory bus and cheat overrides
//!
//! The engine never touches emulated memory directly. An emulator core
//! exposes its memory through [`Bus`]; wrapping that bus in a [`CheatBus`]
//! routes every read through the currently published override snapshot.
//! Writes always reach the underlying memory unchanged, so the game's own
//! state keeps evolving underneath conditional patches.

use std::sync::Arc;

use crate::applicator::{OverrideReader, OverrideSet};
use crate::platform::Platform;

/// Bus trait for memory access
pub trait Bus {
    /// Read a byte from the given address
    fn read(&mut self, address: u32) -> u8;
    /// Write a byte to the given address
    fn write(&mut self, address: u32, value: u8);
}

/// Flat RAM covering a whole address window
#[derive(Debug, Clone)]
pub struct RamBus {
    ram: Vec<u8>,
}

impl RamBus {
    /// Create zero-filled RAM of the given size
    pub fn new(size: usize) -> Self {
        Self { ram: vec![0; size] }
    }

    /// Create RAM spanning the platform's address space
    pub fn for_platform(platform: Platform) -> Self {
        Self::new(platform.address_space_size())
    }

    /// Create RAM from an existing image
    pub fn from_image(image: Vec<u8>) -> Self {
        Self { ram: image }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.ram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ram.is_empty()
    }

    /// Raw contents, bypassing any overrides
    pub fn as_slice(&self) -> &[u8] {
        &self.ram
    }
}

impl Bus for RamBus {
    /// Read a byte; addresses past the end read as open bus ($FF)
    fn read(&mut self, address: u32) -> u8 {
        self.ram.get(address as usize).copied().unwrap_or(0xFF)
    }

    /// Write a byte; addresses past the end are ignored
    fn write(&mut self, address: u32, value: u8) {
        if let Some(byte) = self.ram.get_mut(address as usize) {
            *byte = value;
        }
    }
}

/// Bus wrapper applying cheat overrides on the read path
#[derive(Debug)]
pub struct CheatBus<B: Bus> {
    inner: B,
    reader: OverrideReader,
    /// Snapshot in use until the applicator publishes a newer generation
    cached: Arc<OverrideSet>,
}

impl<B: Bus> CheatBus<B> {
    /// Wrap a bus
    pub fn new(inner: B, reader: OverrideReader) -> Self {
        let cached = reader.snapshot();
        Self {
            inner,
            reader,
            cached,
        }
    }

    /// Get a reference to the wrapped bus
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Get a mutable reference to the wrapped bus
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    /// Unwrap, dropping the override hook
    pub fn into_inner(self) -> B {
        self.inner
    }

    fn refresh(&mut self) {
        if self.reader.generation() != self.cached.generation() {
            self.cached = self.reader.snapshot();
        }
    }
}

impl<B: Bus> Bus for CheatBus<B> {
    fn read(&mut self, address: u32) -> u8 {
        self.refresh();
        let underlying = self.inner.read(address);
        self.cached.apply(address, underlying)
    }

    fn write(&mut self, address: u32, value: u8) {
        self.inner.write(address, value);
    }
}
