//! The fully initialized hardware context
//!
//! A `Machine` is the product of a successful initialization attempt:
//! RAM banks, both register files, the resolved boot images and the save
//! backend, ready for the runtime to start executing.

use crate::cpu::{CpuId, RegisterFile};
use crate::memory::MemoryBanks;
use nitro_core::{AssetKind, Console, Settings};
use nitro_loader::rom::Segment;
use nitro_loader::{ResolvedAssets, RomImage, SaveDescriptor, SaveKind};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persistent save storage backing one emulation session
#[derive(Debug)]
pub struct SaveBackend {
    path: PathBuf,
    kind: SaveKind,
    data: Vec<u8>,
}

impl SaveBackend {
    /// Load the save file the detector described
    ///
    /// The descriptor's size is authoritative: whatever the file cannot
    /// provide (racing truncation, transient read failure) is
    /// zero-filled, keeping machine construction infallible.
    fn open(path: PathBuf, kind: SaveKind, size: u64) -> Self {
        let mut data = std::fs::read(&path).unwrap_or_default();
        data.resize(size as usize, 0);
        Self { path, kind, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> SaveKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Flush the in-memory save buffer back to disk
    pub fn write_back(&self) -> io::Result<()> {
        std::fs::write(&self.path, &self.data)
    }
}

/// The fully initialized hardware context
///
/// Exclusively owned by the caller after a successful initialization;
/// its lifetime spans one emulation session.
#[derive(Debug)]
pub struct Machine {
    console: Console,
    banks: MemoryBanks,
    arm9: RegisterFile,
    arm7: RegisterFile,
    assets: ResolvedAssets,
    rom: RomImage,
    save: SaveBackend,
}

impl Machine {
    /// Construct the initial hardware state
    ///
    /// Infallible: the pipeline has already validated the assets, the
    /// ROM header and the save descriptor, and rejects an `Absent`
    /// descriptor before reaching this point.
    pub fn new(
        assets: ResolvedAssets,
        rom: RomImage,
        save: SaveDescriptor,
        settings: &Settings,
    ) -> Self {
        let console = rom.console();
        let mut banks = MemoryBanks::for_console(console);

        let (arm9, arm7) = match console {
            Console::Nds => reset_nds(&mut banks, &rom, settings.direct_boot),
            Console::Gba => (
                RegisterFile::new(),
                RegisterFile::reset_gba(settings.direct_boot),
            ),
        };

        let (kind, size) = match save {
            SaveDescriptor::Detected { kind, size } => (kind, size),
            SaveDescriptor::Absent => (SaveKind::Unknown, 0),
        };
        let save = SaveBackend::open(rom.save_path(), kind, size);

        info!(
            "machine ready: {} \"{}\", {} save ({} bytes), arm9 pc=0x{:08x}, arm7 pc=0x{:08x}",
            console,
            rom.header().title,
            save.kind(),
            save.len(),
            arm9.pc(),
            arm7.pc()
        );

        Self {
            console,
            banks,
            arm9,
            arm7,
            assets,
            rom,
            save,
        }
    }

    pub fn console(&self) -> Console {
        self.console
    }

    pub fn banks(&self) -> &MemoryBanks {
        &self.banks
    }

    pub fn arm9(&self) -> &RegisterFile {
        &self.arm9
    }

    pub fn arm7(&self) -> &RegisterFile {
        &self.arm7
    }

    /// A resolved boot image (BIOS/firmware)
    pub fn boot_image(&self, kind: AssetKind) -> Option<&[u8]> {
        self.assets.image(kind)
    }

    pub fn rom(&self) -> &RomImage {
        &self.rom
    }

    pub fn save(&self) -> &SaveBackend {
        &self.save
    }

    pub fn save_mut(&mut self) -> &mut SaveBackend {
        &mut self.save
    }
}

/// Seed NDS CPU state, copying boot programs for a direct boot
fn reset_nds(
    banks: &mut MemoryBanks,
    rom: &RomImage,
    direct_boot: bool,
) -> (RegisterFile, RegisterFile) {
    if !direct_boot {
        // The emulated firmware performs the cartridge copy itself
        return (
            RegisterFile::reset_firmware(CpuId::Arm9),
            RegisterFile::reset_firmware(CpuId::Arm7),
        );
    }

    let header = rom.header();
    let arm9_entry = header.arm9.map(|seg| copy_boot_program(banks, rom, seg));
    let arm7_entry = header.arm7.map(|seg| copy_boot_program(banks, rom, seg));

    (
        RegisterFile::reset_direct(CpuId::Arm9, arm9_entry.unwrap_or_default()),
        RegisterFile::reset_direct(CpuId::Arm7, arm7_entry.unwrap_or_default()),
    )
}

/// Copy one header-described boot program into RAM, returning its entry
///
/// Ranges are clamped to the ROM and bank bounds; a header that points
/// outside either simply copies less, it never aborts the boot.
fn copy_boot_program(banks: &mut MemoryBanks, rom: &RomImage, segment: Segment) -> u32 {
    let data = rom.data();
    let start = (segment.rom_offset as usize).min(data.len());
    let end = start.saturating_add(segment.size as usize).min(data.len());

    let written = banks.write(segment.load_addr, &data[start..end]);
    debug!(
        "copied boot program: rom 0x{:x}..0x{:x} -> 0x{:08x} ({} bytes)",
        start, end, segment.load_addr, written
    );

    segment.entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use nitro_loader::rom::crc16;
    use std::path::Path;

    /// Minimal NDS image whose ARM9 program is four marker bytes
    fn build_nds_rom() -> Vec<u8> {
        let mut data = vec![0u8; 0x200];
        data[0x00..0x0C].copy_from_slice(b"TESTGAME\0\0\0\0");
        data[0x0C..0x10].copy_from_slice(b"ATST");
        data[0x10..0x12].copy_from_slice(b"01");
        // ARM9: 4 bytes at ROM offset 0x1F0, load to 0x02000000
        data[0x20..0x24].copy_from_slice(&0x0000_01F0u32.to_le_bytes());
        data[0x24..0x28].copy_from_slice(&0x0200_0000u32.to_le_bytes());
        data[0x28..0x2C].copy_from_slice(&0x0200_0000u32.to_le_bytes());
        data[0x2C..0x30].copy_from_slice(&4u32.to_le_bytes());
        // ARM7: 4 bytes at ROM offset 0x1F4, load to ARM7 WRAM
        data[0x30..0x34].copy_from_slice(&0x0000_01F4u32.to_le_bytes());
        data[0x34..0x38].copy_from_slice(&0x0380_0000u32.to_le_bytes());
        data[0x38..0x3C].copy_from_slice(&0x0380_0000u32.to_le_bytes());
        data[0x3C..0x40].copy_from_slice(&4u32.to_le_bytes());
        data[0x1F0..0x1F4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        data[0x1F4..0x1F8].copy_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
        let crc = crc16(&data[..0x15E]);
        data[0x15E..0x160].copy_from_slice(&crc.to_le_bytes());
        data
    }

    fn load_rom(dir: &Path) -> RomImage {
        let path = dir.join("game.nds");
        std::fs::write(&path, build_nds_rom()).unwrap();
        RomImage::load(path).unwrap()
    }

    fn detected_save() -> SaveDescriptor {
        SaveDescriptor::Detected {
            kind: SaveKind::Eeprom,
            size: 0x2000,
        }
    }

    #[test]
    fn test_direct_boot_machine() {
        let dir = tempfile::tempdir().unwrap();
        let rom = load_rom(dir.path());

        let machine = Machine::new(
            ResolvedAssets::default(),
            rom,
            detected_save(),
            &Settings::default(),
        );

        assert_eq!(machine.console(), Console::Nds);
        assert_eq!(machine.arm9().pc(), 0x0200_0000);
        assert_eq!(machine.arm7().pc(), 0x0380_0000);

        // The boot programs landed in their banks
        let main = machine.banks().bank("Main RAM").unwrap();
        assert_eq!(&main.data()[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
        let wram = machine.banks().bank("ARM7 WRAM").unwrap();
        assert_eq!(&wram.data()[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
    }

    #[test]
    fn test_firmware_boot_machine() {
        let dir = tempfile::tempdir().unwrap();
        let rom = load_rom(dir.path());

        let mut settings = Settings::default();
        settings.direct_boot = false;
        let machine = Machine::new(ResolvedAssets::default(), rom, detected_save(), &settings);

        assert_eq!(machine.arm9().pc(), 0xFFFF_0000);
        assert_eq!(machine.arm7().pc(), 0);

        // Nothing was pre-copied
        let main = machine.banks().bank("Main RAM").unwrap();
        assert_eq!(&main.data()[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_save_backend_sized_by_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let rom = load_rom(dir.path());

        // Existing save contents are loaded, padding zero-filled
        std::fs::write(rom.save_path(), [0xAB; 0x100]).unwrap();
        let machine = Machine::new(
            ResolvedAssets::default(),
            rom,
            SaveDescriptor::Detected {
                kind: SaveKind::Eeprom,
                size: 0x200,
            },
            &Settings::default(),
        );

        let save = machine.save();
        assert_eq!(save.kind(), SaveKind::Eeprom);
        assert_eq!(save.len(), 0x200);
        assert_eq!(save.data()[0], 0xAB);
        assert_eq!(save.data()[0x1FF], 0);
    }

    #[test]
    fn test_save_write_back() {
        let dir = tempfile::tempdir().unwrap();
        let rom = load_rom(dir.path());
        let save_path = rom.save_path();
        std::fs::write(&save_path, [0u8; 0x200]).unwrap();

        let mut machine = Machine::new(
            ResolvedAssets::default(),
            rom,
            SaveDescriptor::Detected {
                kind: SaveKind::Eeprom,
                size: 0x200,
            },
            &Settings::default(),
        );

        machine.save_mut().data_mut()[0] = 0x42;
        machine.save().write_back().unwrap();

        assert_eq!(std::fs::read(save_path).unwrap()[0], 0x42);
    }

    #[test]
    fn test_out_of_range_segment_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wild.nds");
        let mut data = build_nds_rom();
        // ARM9 program claims to be far larger than the ROM
        data[0x2C..0x30].copy_from_slice(&0x1000_0000u32.to_le_bytes());
        let crc = crc16(&data[..0x15E]);
        data[0x15E..0x160].copy_from_slice(&crc.to_le_bytes());
        std::fs::write(&path, data).unwrap();
        let rom = RomImage::load(path).unwrap();

        // Must not panic; the copy is clamped to the ROM's actual size
        let machine = Machine::new(
            ResolvedAssets::default(),
            rom,
            detected_save(),
            &Settings::default(),
        );
        assert_eq!(machine.arm9().pc(), 0x0200_0000);
    }
}
