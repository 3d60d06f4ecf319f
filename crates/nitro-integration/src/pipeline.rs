//! The four-stage initialization sequence
//!
//! assets -> ROM -> save -> hardware state, short-circuiting on the
//! first failure. Each failure maps to exactly one of the three
//! reportable conditions; nothing is retried and nothing survives a
//! failed attempt.

use nitro_core::{Console, InitError, Result, RomError, Settings};
use nitro_loader::{assets, save, RomImage};
use nitro_machine::Machine;
use std::path::Path;
use tracing::{info, warn};

/// Run the initialization pipeline for one ROM
///
/// Synchronous and single-threaded; the caller is expected to invoke
/// this off its UI thread if responsiveness matters. Re-invocation
/// after a failure is a fresh attempt with no residual state.
pub fn initialize<P: AsRef<Path>>(path: P, settings: &Settings) -> Result<Machine> {
    let path = path.as_ref();
    info!("initializing ROM at {:?}", path);

    // The console class decides which boot assets stage 1 demands; it
    // comes from the extension since the frontend only forwards
    // .nds/.gba selections.
    let console = Console::from_path(path).ok_or_else(|| {
        warn!("unrecognized ROM extension on {:?}", path);
        InitError::UnreadableRom(RomError::UnknownExtension(path.to_path_buf()))
    })?;

    // Stage 1: every required BIOS/firmware image must resolve
    let resolved = assets::resolve(settings, console).map_err(|e| {
        warn!("asset validation failed: {}", e);
        InitError::MissingAssets(e)
    })?;

    // Stage 2: structural ROM validation
    let rom = RomImage::load(path).map_err(|e| {
        warn!("ROM load failed: {}", e);
        InitError::UnreadableRom(e)
    })?;

    // Stage 3: save detection; an absent save is a hard stop because
    // guessing a size is unrecoverable once the game starts writing
    let save_path = rom.save_path();
    let descriptor = save::detect(&rom, &save_path);
    if descriptor.is_absent() {
        warn!("no save file at {:?}", save_path);
        return Err(InitError::MissingSave(save_path));
    }

    // Stage 4: hardware state construction, infallible by now
    Ok(Machine::new(resolved, rom, descriptor, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_is_unreadable() {
        let err = initialize("/sdcard/game.iso", &Settings::default()).unwrap_err();
        assert!(matches!(
            err,
            InitError::UnreadableRom(RomError::UnknownExtension(_))
        ));
        assert_eq!(err.status_code(), 2);
    }

    #[test]
    fn test_assets_checked_before_rom() {
        // The ROM path does not exist either, but stage 1 must win
        let err = initialize("/sdcard/game.nds", &Settings::default()).unwrap_err();
        assert!(matches!(err, InitError::MissingAssets(_)));
        assert_eq!(err.status_code(), 1);
    }
}
