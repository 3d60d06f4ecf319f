//! C ABI boundary for embedding frontends
//!
//! Mirrors the legacy two-function contract: `nitrous_load_settings`
//! once at startup, then `nitrous_load_rom` per selection, returning the
//! status code the frontend's dialog logic keys on. The integer mapping
//! is part of the contract and must stay stable:
//! 0 ready, 1 missing BIOS/firmware, 2 unreadable ROM, 3 missing save.
//!
//! The core crates take the settings store by reference; this crate owns
//! the documented process-wide state, so no hidden globals leak into the
//! library layers.

use nitro_core::Settings;
use nitro_machine::Machine;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::ffi::{c_char, c_int, CStr};
use std::path::PathBuf;
use tracing::warn;

pub const STATUS_READY: c_int = 0;
pub const STATUS_MISSING_ASSETS: c_int = 1;
pub const STATUS_UNREADABLE_ROM: c_int = 2;
pub const STATUS_MISSING_SAVE: c_int = 3;

/// Process-wide settings store
///
/// Populated once by `nitrous_load_settings`; a later call replaces the
/// store wholesale. Read-only between calls.
static SETTINGS: Lazy<Mutex<Option<Settings>>> = Lazy::new(|| Mutex::new(None));

/// Machine from the most recent successful load, parked for the runtime
static MACHINE: Lazy<Mutex<Option<Machine>>> = Lazy::new(|| Mutex::new(None));

/// Decode a borrowed C path; `None` for null or non-UTF-8 input
fn path_from_ptr(ptr: *const c_char) -> Option<PathBuf> {
    if ptr.is_null() {
        return None;
    }
    // Safety: the caller guarantees `ptr` is a valid NUL-terminated
    // string for the duration of the call.
    let cstr = unsafe { CStr::from_ptr(ptr) };
    cstr.to_str().ok().map(PathBuf::from)
}

/// Initialize the settings store from a settings root directory
///
/// A null root selects the platform default location. Parse failures
/// fall back to defaults; asset validation happens at load time, not
/// here.
#[no_mangle]
pub extern "C" fn nitrous_load_settings(root_path: *const c_char) {
    let root = path_from_ptr(root_path).unwrap_or_else(Settings::default_root);

    let settings = match Settings::load(&root) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("failed to load settings from {:?}: {}", root, e);
            Settings::default()
        }
    };

    *SETTINGS.lock() = Some(settings);
}

/// Run the initialization pipeline for a ROM path
///
/// Returns the legacy status code. On success the ready machine is
/// parked for the runtime to claim via [`take_machine`]; on failure no
/// state survives the attempt.
#[no_mangle]
pub extern "C" fn nitrous_load_rom(path: *const c_char) -> c_int {
    let Some(path) = path_from_ptr(path) else {
        return STATUS_UNREADABLE_ROM;
    };

    // Snapshot the store so the pipeline never observes a concurrent
    // settings reload
    let settings = SETTINGS.lock().clone().unwrap_or_default();

    match nitro_integration::initialize(&path, &settings) {
        Ok(machine) => {
            *MACHINE.lock() = Some(machine);
            STATUS_READY
        }
        Err(e) => {
            *MACHINE.lock() = None;
            e.status_code()
        }
    }
}

/// Claim the machine produced by the last successful load
pub fn take_machine() -> Option<Machine> {
    MACHINE.lock().take()
}
