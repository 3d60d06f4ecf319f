//! ROM image loading and header validation
//!
//! This module reads a cartridge image into an owned buffer and checks
//! its structural header before anything else touches it. Unknown
//! cartridge configurations are accepted and passed through; only files
//! that cannot possibly be a cartridge are rejected.

use nitro_core::{Console, RomError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Minimum NDS header size, up to and including the header checksum
pub const NDS_HEADER_SIZE: u64 = 0x160;

/// Minimum GBA header size
pub const GBA_HEADER_SIZE: u64 = 0xC0;

/// Largest cartridge the NDS bus can address (512 MiB)
pub const NDS_MAX_ROM_SIZE: u64 = 0x2000_0000;

/// Largest cartridge the GBA bus can address (32 MiB)
pub const GBA_MAX_ROM_SIZE: u64 = 0x0200_0000;

/// GBA header fixed byte value at offset 0xB2
const GBA_FIXED_BYTE: u8 = 0x96;

/// Program segment descriptor from the NDS cartridge header
///
/// Describes where a CPU's boot program sits in the ROM and where the
/// firmware (or direct boot) copies it before jumping to the entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Segment {
    /// Offset of the program within the ROM
    pub rom_offset: u32,
    /// Entry point address
    pub entry: u32,
    /// RAM address the program is copied to
    pub load_addr: u32,
    /// Program size in bytes
    pub size: u32,
}

/// Parsed cartridge header fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomHeader {
    /// Game title, NUL padding stripped
    pub title: String,
    /// Four-character game code
    pub game_code: String,
    /// Two-character maker code
    pub maker_code: String,
    /// Unit code; unknown values are passed through for the runtime
    pub unit_code: u8,
    /// ARM9 boot program descriptor (NDS only)
    pub arm9: Option<Segment>,
    /// ARM7 boot program descriptor (NDS only)
    pub arm7: Option<Segment>,
}

/// ROM metadata summary for frontends
#[derive(Debug, Clone, Serialize)]
pub struct RomInfo {
    pub console: &'static str,
    pub title: String,
    pub game_code: String,
    pub maker_code: String,
    pub unit_code: u8,
    pub size: u64,
}

/// A validated cartridge image
///
/// Owns the ROM bytes for the duration of one load attempt; dropped if
/// any later initialization stage fails.
#[derive(Debug)]
pub struct RomImage {
    console: Console,
    path: PathBuf,
    data: Vec<u8>,
    header: RomHeader,
}

impl RomImage {
    /// Load and validate a cartridge image from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let path = path.as_ref();

        let console = Console::from_path(path)
            .ok_or_else(|| RomError::UnknownExtension(path.to_path_buf()))?;

        let data = std::fs::read(path).map_err(|e| RomError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (min, max) = match console {
            Console::Nds => (NDS_HEADER_SIZE, NDS_MAX_ROM_SIZE),
            Console::Gba => (GBA_HEADER_SIZE, GBA_MAX_ROM_SIZE),
        };

        let size = data.len() as u64;
        if size < min {
            return Err(RomError::TooSmall { size, min });
        }
        if size > max {
            return Err(RomError::TooLarge { size, max });
        }

        let header = match console {
            Console::Nds => parse_nds_header(&data)?,
            Console::Gba => parse_gba_header(&data)?,
        };

        info!(
            "loaded {} ROM: \"{}\" [{}] {} bytes",
            console, header.title, header.game_code, size
        );

        Ok(Self {
            console,
            path: path.to_path_buf(),
            data,
            header,
        })
    }

    /// Console family this image targets
    pub fn console(&self) -> Console {
        self.console
    }

    /// Path the image was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total image size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Parsed header fields
    pub fn header(&self) -> &RomHeader {
        &self.header
    }

    /// Raw image bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Save file path derived from the ROM path (same base name, `.sav`)
    pub fn save_path(&self) -> PathBuf {
        self.path.with_extension("sav")
    }

    /// Metadata summary for display or serialization
    pub fn info(&self) -> RomInfo {
        RomInfo {
            console: self.console.name(),
            title: self.header.title.clone(),
            game_code: self.header.game_code.clone(),
            maker_code: self.header.maker_code.clone(),
            unit_code: self.header.unit_code,
            size: self.size(),
        }
    }
}

/// CRC-16 used by the NDS cartridge header (poly 0xA001, init 0xFFFF)
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Decode a fixed-width header text field, stripping NUL padding
fn header_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_segment(data: &[u8], offset: usize) -> Segment {
    Segment {
        rom_offset: read_u32_le(data, offset),
        entry: read_u32_le(data, offset + 4),
        load_addr: read_u32_le(data, offset + 8),
        size: read_u32_le(data, offset + 12),
    }
}

/// Parse and verify an NDS cartridge header
///
/// The stored CRC-16 at 0x15E covers bytes 0x000..0x15E.
fn parse_nds_header(data: &[u8]) -> Result<RomHeader, RomError> {
    let stored = u16::from_le_bytes([data[0x15E], data[0x15F]]);
    let computed = crc16(&data[..0x15E]);
    if stored != computed {
        return Err(RomError::BadChecksum { stored, computed });
    }

    let arm9 = read_segment(data, 0x20);
    let arm7 = read_segment(data, 0x30);

    debug!(
        "NDS header: unit_code=0x{:02x}, arm9 entry=0x{:08x}, arm7 entry=0x{:08x}",
        data[0x12], arm9.entry, arm7.entry
    );

    Ok(RomHeader {
        title: header_text(&data[0x00..0x0C]),
        game_code: header_text(&data[0x0C..0x10]),
        maker_code: header_text(&data[0x10..0x12]),
        unit_code: data[0x12],
        arm9: Some(arm9),
        arm7: Some(arm7),
    })
}

/// Parse and verify a GBA cartridge header
///
/// The complement check byte at 0xBD must satisfy
/// `chk = -(0x19 + sum(bytes 0xA0..=0xBC)) & 0xFF`, and the fixed byte
/// at 0xB2 must be 0x96.
fn parse_gba_header(data: &[u8]) -> Result<RomHeader, RomError> {
    if data[0xB2] != GBA_FIXED_BYTE {
        return Err(RomError::BadFixedByte(data[0xB2]));
    }

    let sum = data[0xA0..=0xBC]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    let computed = 0u8.wrapping_sub(0x19).wrapping_sub(sum);
    let stored = data[0xBD];
    if stored != computed {
        return Err(RomError::BadChecksum {
            stored: stored as u16,
            computed: computed as u16,
        });
    }

    Ok(RomHeader {
        title: header_text(&data[0xA0..0xAC]),
        game_code: header_text(&data[0xAC..0xB0]),
        maker_code: header_text(&data[0xB0..0xB2]),
        unit_code: data[0xB3],
        arm9: None,
        arm7: None,
    })
}
