//! Core types for the nitrous NDS/GBA emulator
//!
//! This crate provides the foundational types, error handling and
//! settings infrastructure shared by the loader and initialization
//! pipeline.

pub mod console;
pub mod error;
pub mod settings;

pub use console::Console;
pub use error::{AssetError, InitError, Result, RomError};
pub use settings::{AssetKind, Settings};
