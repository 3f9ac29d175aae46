//! Cheat CLI - command line interface for the cheat engine

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::warn;

use cheat_core::bus::{Bus, CheatBus, RamBus};
use cheat_core::codec::{self, FormatId, PatchTuple};
use cheat_core::engine::CheatEngine;
use cheat_core::persist::{CheatPersistence, JsonFilePersistence};
use cheat_core::platform::Platform;
use cheat_core::store::CheatStore;

/// Cheat code CLI
#[derive(Parser, Debug)]
#[command(name = "cheat-cli")]
#[command(about = "Decode, encode and apply emulator cheat codes", long_about = None)]
struct Args {
    /// Target platform: nes, snes, gb or pce
    #[arg(short, long, default_value = "nes", value_parser = parse_platform)]
    platform: Platform,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode cheat codes and print their patches
    Decode {
        /// Codes to decode; `+` joins several tokens into one cheat
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Encode a single patch
    Encode {
        /// Output format: raw, nes-gg, snes-gg, snes-par, gb-gg, gb-gs
        #[arg(short, long, value_parser = parse_format)]
        format: FormatId,
        /// Address, hex with `0x` or `$` prefix, or decimal
        #[arg(value_parser = parse_number)]
        address: u32,
        /// Replacement byte
        #[arg(value_parser = parse_byte)]
        value: u8,
        /// Compare byte, for formats that have one
        #[arg(short, long, value_parser = parse_byte)]
        compare: Option<u8>,
    },
    /// Validate a saved cheat list and print it
    Check {
        /// Cheat list (JSON)
        list: PathBuf,
    },
    /// Import a text file with one cheat per line into a saved list
    Import {
        /// Text file: code, then an optional description
        input: PathBuf,
        /// Cheat list (JSON), created if missing
        list: PathBuf,
    },
    /// Apply a saved cheat list to a RAM image and read addresses through it
    Run {
        /// Cheat list (JSON)
        list: PathBuf,
        /// Raw memory image; zero-filled memory when omitted
        #[arg(short, long)]
        ram: Option<PathBuf>,
        /// Addresses to read
        #[arg(required = true, value_parser = parse_number)]
        addresses: Vec<u32>,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let platform = args.platform;
    match args.command {
        Command::Decode { codes } => decode_codes(&codes, platform),
        Command::Encode {
            format,
            address,
            value,
            compare,
        } => {
            let patch = PatchTuple {
                address,
                value,
                compare,
            };
            println!("{}", codec::encode(&[patch], format)?);
            Ok(())
        }
        Command::Check { list } => check_list(list, platform),
        Command::Import { input, list } => import_list(input, list, platform),
        Command::Run {
            list,
            ram,
            addresses,
        } => run_list(list, ram, &addresses, platform),
    }
}

fn decode_codes(codes: &[String], platform: Platform) -> Result<(), Box<dyn Error>> {
    for code in codes {
        let decoded = codec::decode_text(code, platform)?;
        println!("{}:", code);
        for token in decoded {
            for patch in token.patches {
                println!("  {:<8} {}", token.format, patch);
            }
        }
    }
    Ok(())
}

fn check_list(list: PathBuf, platform: Platform) -> Result<(), Box<dyn Error>> {
    let persistence = JsonFilePersistence::new(list);
    let store = CheatStore::load(&persistence.load()?, platform)?;

    println!("{} cheats for {}:", store.len(), platform);
    if store.disable_all() {
        println!("  (all cheats disabled)");
    }
    for record in store.iter() {
        println!(
            "  [{}] {:<24} {}",
            if record.enabled() { 'x' } else { ' ' },
            record.display_description(),
            record.canonical_code()?
        );
    }
    Ok(())
}

fn import_list(input: PathBuf, list: PathBuf, platform: Platform) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(&input)?;
    let persistence = JsonFilePersistence::new(list);

    let mut engine = CheatEngine::new(platform);
    engine.on_game_loaded(platform, &persistence)?;
    let ids = engine.import(&text)?;
    engine.commit(&persistence)?;

    println!(
        "Imported {} cheats into {} ({} total)",
        ids.len(),
        persistence.path().display(),
        engine.cheats().len()
    );
    Ok(())
}

fn run_list(
    list: PathBuf,
    ram: Option<PathBuf>,
    addresses: &[u32],
    platform: Platform,
) -> Result<(), Box<dyn Error>> {
    let persistence = JsonFilePersistence::new(list);
    let memory = match ram {
        Some(path) => RamBus::from_image(fs::read(path)?),
        None => RamBus::for_platform(platform),
    };

    let mut engine = CheatEngine::new(platform);
    let mut bus = CheatBus::new(memory, engine.reader());
    for skipped in engine.on_game_loaded(platform, &persistence)? {
        warn!("cheat {} not applied: {}", skipped.id, skipped.error);
    }

    for &address in addresses {
        let raw = bus.inner_mut().read(address);
        let patched = bus.read(address);
        println!("  ${:04X}: {:02X} -> {:02X}", address, raw, patched);
    }

    engine.on_emulation_stopping();
    Ok(())
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse::<Platform>().map_err(|e| e.to_string())
}

fn parse_format(s: &str) -> Result<FormatId, String> {
    s.parse::<FormatId>().map_err(|e| e.to_string())
}

fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix('$')) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse::<u32>()
    };
    parsed.map_err(|e| format!("invalid number `{}`: {}", s, e))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let value = parse_number(s)?;
    u8::try_from(value).map_err(|_| format!("`{}` does not fit in a byte", s))
}
