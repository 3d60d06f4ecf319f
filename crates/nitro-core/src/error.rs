//! Error types for the nitrous emulator core

use crate::settings::AssetKind;
use std::path::PathBuf;
use thiserror::Error;

/// BIOS/firmware asset validation errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("no path configured for {0}")]
    NotConfigured(AssetKind),

    #[error("{kind} not found at {path}")]
    NotFound { kind: AssetKind, path: PathBuf },

    #[error("failed to read {kind} at {path}: {source}")]
    Unreadable {
        kind: AssetKind,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{kind} at {path} is {actual} bytes, expected {expected}")]
    WrongSize {
        kind: AssetKind,
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

impl AssetError {
    /// The asset that failed validation
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::NotConfigured(kind) => *kind,
            Self::NotFound { kind, .. } => *kind,
            Self::Unreadable { kind, .. } => *kind,
            Self::WrongSize { kind, .. } => *kind,
        }
    }
}

/// ROM image loading errors
#[derive(Error, Debug)]
pub enum RomError {
    #[error("failed to open ROM at {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unrecognized ROM extension on {0}")]
    UnknownExtension(PathBuf),

    #[error("ROM is {size} bytes, below the minimum header size of {min}")]
    TooSmall { size: u64, min: u64 },

    #[error("ROM is {size} bytes, beyond the {max} byte cartridge limit")]
    TooLarge { size: u64, max: u64 },

    #[error("header checksum mismatch: stored 0x{stored:04x}, computed 0x{computed:04x}")]
    BadChecksum { stored: u16, computed: u16 },

    #[error("header fixed byte is 0x{0:02x}, expected 0x96")]
    BadFixedByte(u8),
}

/// Initialization failure, one variant per legacy dialog
///
/// These are the only errors that cross the pipeline boundary. Lower-level
/// I/O failures are translated into the owning variant at their stage.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("missing BIOS/firmware: {0}")]
    MissingAssets(#[from] AssetError),

    #[error("unreadable ROM: {0}")]
    UnreadableRom(#[from] RomError),

    #[error("no save file at {0}")]
    MissingSave(PathBuf),
}

impl InitError {
    /// Legacy status code consumed by the frontend's dialog selection
    ///
    /// 0 is reserved for success; the mapping must stay stable.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::MissingAssets(_) => 1,
            Self::UnreadableRom(_) => 2,
            Self::MissingSave(_) => 3,
        }
    }
}

/// Result type alias for initialization operations
pub type Result<T> = std::result::Result<T, InitError>;
