//! Save file detection
//!
//! Save type is inferred only from the byte size of an existing save
//! file. Cartridge header hints are deliberately never consulted: they
//! are unreliable in the wild, and guessing a save size risks corrupting
//! every write the game makes afterwards. No save file is a distinct
//! condition the caller must surface, not a default.

use crate::rom::RomImage;
use nitro_core::Console;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Save chip family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SaveKind {
    Eeprom,
    Fram,
    Sram,
    Flash,
    /// Present on disk but its size matches no known chip
    Unknown,
}

impl std::fmt::Display for SaveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Eeprom => "EEPROM",
            Self::Fram => "FRAM",
            Self::Sram => "SRAM",
            Self::Flash => "FLASH",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Known NDS save sizes, each unique within the table
const NDS_SAVE_SIZES: &[(u64, SaveKind)] = &[
    (0x200, SaveKind::Eeprom),
    (0x2000, SaveKind::Eeprom),
    (0x8000, SaveKind::Fram),
    (0x10000, SaveKind::Eeprom),
    (0x20000, SaveKind::Eeprom),
    (0x40000, SaveKind::Flash),
    (0x80000, SaveKind::Flash),
    (0x100000, SaveKind::Flash),
    (0x800000, SaveKind::Flash),
];

/// Known GBA save sizes, each unique within the table
const GBA_SAVE_SIZES: &[(u64, SaveKind)] = &[
    (0x200, SaveKind::Eeprom),
    (0x2000, SaveKind::Eeprom),
    (0x8000, SaveKind::Sram),
    (0x10000, SaveKind::Flash),
    (0x20000, SaveKind::Flash),
];

/// Known save sizes for a console class
pub fn known_sizes(console: Console) -> &'static [(u64, SaveKind)] {
    match console {
        Console::Nds => NDS_SAVE_SIZES,
        Console::Gba => GBA_SAVE_SIZES,
    }
}

/// Outcome of save detection; never mutated after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDescriptor {
    /// No save file exists at the derived path
    Absent,
    /// A save file exists; size is authoritative, kind may be `Unknown`
    Detected { kind: SaveKind, size: u64 },
}

impl SaveDescriptor {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Inspect the save file belonging to a ROM
///
/// A size matching a known-size table entry fixes the chip kind; any
/// other size is passed through as unknown-but-present.
pub fn detect(rom: &RomImage, save_path: &Path) -> SaveDescriptor {
    let metadata = match std::fs::metadata(save_path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => {
            debug!("no save file at {:?}", save_path);
            return SaveDescriptor::Absent;
        }
    };

    let size = metadata.len();
    let kind = known_sizes(rom.console())
        .iter()
        .find(|(known, _)| *known == size)
        .map(|(_, kind)| *kind)
        .unwrap_or(SaveKind::Unknown);

    info!("detected {} save ({} bytes) at {:?}", kind, size, save_path);
    SaveDescriptor::Detected { kind, size }
}
