//! Platform profiles
//!
//! Each emulated console family exposes a different addressable window and
//! accepts a different subset of cheat code formats:
//! NES       $0000-$FFFF      Raw, Game Genie
//! SNES      $000000-$FFFFFF  Raw, Game Genie, Pro Action Replay
//! Game Boy  $0000-$FFFF      Raw, Game Genie, GameShark
//! PC Engine $000000-$1FFFFF  Raw

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::codec::FormatId;

/// Console family a cheat list is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Nintendo Entertainment System
    Nes,
    /// Super Nintendo
    Snes,
    /// Game Boy / Game Boy Color
    GameBoy,
    /// PC Engine / TurboGrafx-16
    PcEngine,
}

impl Platform {
    /// All known platforms
    pub const ALL: [Platform; 4] = [
        Platform::Nes,
        Platform::Snes,
        Platform::GameBoy,
        Platform::PcEngine,
    ];

    /// Highest valid address on this platform
    pub fn max_address(self) -> u32 {
        match self {
            Platform::Nes | Platform::GameBoy => 0xFFFF,
            Platform::Snes => 0xFF_FFFF,
            Platform::PcEngine => 0x1F_FFFF,
        }
    }

    /// Size of the addressable window in bytes
    pub fn address_space_size(self) -> usize {
        self.max_address() as usize + 1
    }

    /// Check an address against the addressable window
    pub fn contains(self, address: u32) -> bool {
        address <= self.max_address()
    }

    /// Check whether codes of the given format are accepted on this platform
    pub fn supports(self, format: FormatId) -> bool {
        match format {
            FormatId::Raw => true,
            FormatId::NesGameGenie => self == Platform::Nes,
            FormatId::SnesGameGenie | FormatId::SnesProActionReplay => self == Platform::Snes,
            FormatId::GbGameGenie | FormatId::GbGameShark => self == Platform::GameBoy,
        }
    }

    /// Short name used in settings and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Platform::Nes => "nes",
            Platform::Snes => "snes",
            Platform::GameBoy => "gb",
            Platform::PcEngine => "pce",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown platform name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform `{0}` (expected nes, snes, gb or pce)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nes" | "famicom" => Ok(Platform::Nes),
            "snes" | "sfc" => Ok(Platform::Snes),
            "gb" | "gbc" | "gameboy" => Ok(Platform::GameBoy),
            "pce" | "pcengine" | "tg16" => Ok(Platform::PcEngine),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}
