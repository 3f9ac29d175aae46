//! Integration tests for the cheat engine

use std::thread;

use cheat_core::bus::{Bus, CheatBus, RamBus};
use cheat_core::engine::CheatEngine;
use cheat_core::persist::{CheatPersistence, JsonFilePersistence, PersistedCheat, PersistedCheatList};
use cheat_core::platform::Platform;
use cheat_core::ParseError;

/// RAM where the game keeps its own values at $00FF and $0100
fn game_ram() -> RamBus {
    let mut ram = RamBus::for_platform(Platform::Nes);
    ram.write(0x00FF, 0x03);
    ram.write(0x0100, 0x07);
    ram
}

fn example_list() -> PersistedCheatList {
    PersistedCheatList {
        cheats: vec![
            PersistedCheat {
                code: "00FF:09".into(),
                description: "Lives".into(),
                enabled: true,
            },
            PersistedCheat {
                code: "0100:01".into(),
                description: String::new(),
                enabled: false,
            },
        ],
        disable_all_cheats: false,
    }
}

#[test]
fn test_enabled_and_disabled_patches() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = JsonFilePersistence::new(dir.path().join("cheats.json"));
    persistence.save(&example_list()).unwrap();

    let mut engine = CheatEngine::new(Platform::Nes);
    let mut bus = CheatBus::new(game_ram(), engine.reader());
    engine.on_game_loaded(Platform::Nes, &persistence).unwrap();

    assert_eq!(bus.read(0x00FF), 0x09);
    assert_eq!(bus.read(0x0100), 0x07);
}

#[test]
fn test_global_disable_restores_prior_set() {
    let mut list = example_list();
    list.disable_all_cheats = true;
    let dir = tempfile::tempdir().unwrap();
    let persistence = JsonFilePersistence::new(dir.path().join("cheats.json"));
    persistence.save(&list).unwrap();

    let mut engine = CheatEngine::new(Platform::Nes);
    let mut bus = CheatBus::new(game_ram(), engine.reader());
    engine.on_game_loaded(Platform::Nes, &persistence).unwrap();
    assert_eq!(bus.read(0x00FF), 0x03);
    assert_eq!(bus.read(0x0100), 0x07);

    engine.set_disable_all(false);
    assert_eq!(bus.read(0x00FF), 0x09);
    assert_eq!(bus.read(0x0100), 0x07);

    engine.set_disable_all(true);
    assert_eq!(bus.read(0x00FF), 0x03);
}

#[test]
fn test_edit_session_commit_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = JsonFilePersistence::new(dir.path().join("cheats.json"));

    let mut engine = CheatEngine::new(Platform::Nes);
    let mut bus = CheatBus::new(game_ram(), engine.reader());
    engine.on_game_loaded(Platform::Nes, &persistence).unwrap();
    assert!(engine.cheats().is_empty());

    let lives = engine.add_cheat("ff:9", "Lives").unwrap();
    let imported = engine
        .import("# level select\n0100:01 World 2\n")
        .unwrap();
    assert_eq!(bus.read(0x0100), 0x01);

    engine.set_enabled(imported[0], false);
    assert_eq!(bus.read(0x0100), 0x07);

    let before = engine.cheats().len();
    assert_eq!(
        engine.add_cheat("not-a-valid-code", "").unwrap_err(),
        ParseError::NoMatchingFormat {
            token: "NOT-A-VALID-CODE".into()
        }
    );
    assert_eq!(engine.cheats().len(), before);

    engine.commit(&persistence).unwrap();
    let saved = persistence.load().unwrap();
    assert_eq!(saved.cheats.len(), 2);
    assert_eq!(saved.cheats[0].code, "00FF:09");
    assert!(!saved.cheats[1].enabled);

    // Saving an unmodified list again produces identical text
    let first = std::fs::read_to_string(persistence.path()).unwrap();
    engine.begin_edit();
    engine.commit(&persistence).unwrap();
    let second = std::fs::read_to_string(persistence.path()).unwrap();
    assert_eq!(first, second);

    // A fresh session sees the committed list
    let mut reloaded = CheatEngine::new(Platform::Nes);
    reloaded.on_game_loaded(Platform::Nes, &persistence).unwrap();
    assert_eq!(reloaded.cheats().len(), 2);
    assert!(engine.cheats().get(lives).is_some());
}

#[test]
fn test_cancel_keeps_saved_list() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = JsonFilePersistence::new(dir.path().join("cheats.json"));
    persistence.save(&example_list()).unwrap();

    let mut engine = CheatEngine::new(Platform::Nes);
    let mut bus = CheatBus::new(game_ram(), engine.reader());
    engine.on_game_loaded(Platform::Nes, &persistence).unwrap();

    let first = engine.cheats().iter().next().unwrap().id();
    engine.remove_cheat(first);
    assert_eq!(bus.read(0x00FF), 0x03);

    engine.cancel();
    assert_eq!(bus.read(0x00FF), 0x09);
    assert_eq!(persistence.load().unwrap(), example_list());
}

#[test]
fn test_stop_signal_from_another_thread() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = JsonFilePersistence::new(dir.path().join("cheats.json"));
    persistence.save(&example_list()).unwrap();

    let mut engine = CheatEngine::new(Platform::Nes);
    let mut bus = CheatBus::new(game_ram(), engine.reader());
    engine.on_game_loaded(Platform::Nes, &persistence).unwrap();
    assert_eq!(bus.read(0x00FF), 0x09);

    let lifecycle = engine.lifecycle();
    thread::spawn(move || lifecycle.emulation_stopping())
        .join()
        .unwrap();

    assert_eq!(bus.read(0x00FF), 0x03);
    assert_eq!(engine.applicator().installed_count(), 0);

    // Edits after the stop do not bring the overrides back
    let second = engine.cheats().iter().nth(1).unwrap().id();
    engine.set_enabled(second, true);
    engine.cancel();
    assert!(!engine.is_session_active());
    assert_eq!(bus.read(0x00FF), 0x03);
    assert_eq!(bus.read(0x0100), 0x07);
}

#[test]
fn test_game_genie_on_rom_reads() {
    let persistence = cheat_core::persist::MemoryPersistence::default();
    let mut engine = CheatEngine::new(Platform::Nes);
    engine.on_game_loaded(Platform::Nes, &persistence).unwrap();

    let mut rom = RamBus::for_platform(Platform::Nes);
    rom.write(0x94A7, 0x03);
    let mut bus = CheatBus::new(rom, engine.reader());

    engine.add_cheat("ZEXPYGLA", "").unwrap();
    assert_eq!(bus.read(0x94A7), 0x02);

    // Bank switch puts a different byte at the address
    bus.inner_mut().write(0x94A7, 0x10);
    assert_eq!(bus.read(0x94A7), 0x10);
}
