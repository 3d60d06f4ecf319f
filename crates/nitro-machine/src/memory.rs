//! RAM banks for the emulated consoles

use bitflags::bitflags;
use nitro_core::Console;

bitflags! {
    /// Access permissions for a memory bank
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BankFlags: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
        const RW = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// NDS main RAM size (4 MiB)
pub const NDS_MAIN_RAM_SIZE: usize = 0x0040_0000;

/// NDS shared WRAM size (32 KiB)
pub const NDS_SHARED_WRAM_SIZE: usize = 0x8000;

/// NDS ARM7-exclusive WRAM size (64 KiB)
pub const NDS_ARM7_WRAM_SIZE: usize = 0x1_0000;

/// GBA external work RAM size (256 KiB)
pub const GBA_EWRAM_SIZE: usize = 0x4_0000;

/// GBA internal work RAM size (32 KiB)
pub const GBA_IWRAM_SIZE: usize = 0x8000;

/// A single linear RAM bank
#[derive(Debug)]
pub struct MemoryBank {
    name: &'static str,
    base: u32,
    flags: BankFlags,
    data: Vec<u8>,
}

impl MemoryBank {
    fn new(name: &'static str, base: u32, size: usize, flags: BankFlags) -> Self {
        Self {
            name,
            base,
            flags,
            data: vec![0u8; size],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn flags(&self) -> BankFlags {
        self.flags
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether an absolute address falls inside this bank
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.base && (addr - self.base) < self.data.len() as u32
    }

    /// Copy bytes into the bank at an absolute address, clamped to the
    /// bank's bounds; returns the number of bytes actually written
    pub fn write(&mut self, addr: u32, bytes: &[u8]) -> usize {
        if !self.contains(addr) || !self.flags.contains(BankFlags::WRITE) {
            return 0;
        }
        let offset = (addr - self.base) as usize;
        let count = bytes.len().min(self.data.len() - offset);
        self.data[offset..offset + count].copy_from_slice(&bytes[..count]);
        count
    }
}

/// The RAM banks of one console, keyed by address
#[derive(Debug)]
pub struct MemoryBanks {
    banks: Vec<MemoryBank>,
}

impl MemoryBanks {
    /// Build the bank set for a console class, zero-initialized
    pub fn for_console(console: Console) -> Self {
        let banks = match console {
            Console::Nds => vec![
                MemoryBank::new("Main RAM", 0x0200_0000, NDS_MAIN_RAM_SIZE, BankFlags::RW),
                MemoryBank::new("Shared WRAM", 0x0300_0000, NDS_SHARED_WRAM_SIZE, BankFlags::RW),
                MemoryBank::new("ARM7 WRAM", 0x0380_0000, NDS_ARM7_WRAM_SIZE, BankFlags::RW),
            ],
            Console::Gba => vec![
                MemoryBank::new("EWRAM", 0x0200_0000, GBA_EWRAM_SIZE, BankFlags::RW),
                MemoryBank::new("IWRAM", 0x0300_0000, GBA_IWRAM_SIZE, BankFlags::RW),
            ],
        };
        Self { banks }
    }

    /// All banks, in address order
    pub fn iter(&self) -> impl Iterator<Item = &MemoryBank> {
        self.banks.iter()
    }

    /// Look up a bank by name
    pub fn bank(&self, name: &str) -> Option<&MemoryBank> {
        self.banks.iter().find(|bank| bank.name == name)
    }

    /// The bank containing an absolute address, if any
    pub fn bank_containing(&self, addr: u32) -> Option<&MemoryBank> {
        self.banks.iter().find(|bank| bank.contains(addr))
    }

    /// Copy bytes to an absolute address, routed to the containing bank
    ///
    /// Writes that start outside every bank, or run past the end of one,
    /// are clamped; returns the number of bytes actually written.
    pub fn write(&mut self, addr: u32, bytes: &[u8]) -> usize {
        match self.banks.iter_mut().find(|bank| bank.contains(addr)) {
            Some(bank) => bank.write(addr, bytes),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nds_bank_layout() {
        let banks = MemoryBanks::for_console(Console::Nds);
        let main = banks.bank("Main RAM").unwrap();
        assert_eq!(main.base(), 0x0200_0000);
        assert_eq!(main.len(), NDS_MAIN_RAM_SIZE);
        assert_eq!(main.flags(), BankFlags::RW);
        assert!(banks.bank("Shared WRAM").is_some());
        assert!(banks.bank("ARM7 WRAM").is_some());
        assert!(banks.bank("EWRAM").is_none());
    }

    #[test]
    fn test_gba_bank_layout() {
        let banks = MemoryBanks::for_console(Console::Gba);
        assert_eq!(banks.bank("EWRAM").unwrap().len(), GBA_EWRAM_SIZE);
        assert_eq!(banks.bank("IWRAM").unwrap().len(), GBA_IWRAM_SIZE);
        assert_eq!(banks.iter().count(), 2);
    }

    #[test]
    fn test_write_routes_to_containing_bank() {
        let mut banks = MemoryBanks::for_console(Console::Nds);
        let written = banks.write(0x0200_0100, &[1, 2, 3, 4]);
        assert_eq!(written, 4);

        let main = banks.bank("Main RAM").unwrap();
        assert_eq!(&main.data()[0x100..0x104], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_write_outside_banks_is_dropped() {
        let mut banks = MemoryBanks::for_console(Console::Gba);
        assert_eq!(banks.write(0x0800_0000, &[1, 2, 3]), 0);
    }

    #[test]
    fn test_write_clamps_at_bank_end() {
        let mut banks = MemoryBanks::for_console(Console::Gba);
        let end = 0x0300_0000 + GBA_IWRAM_SIZE as u32 - 2;
        assert_eq!(banks.write(end, &[0xAA; 8]), 2);
    }

    #[test]
    fn test_contains_boundaries() {
        let banks = MemoryBanks::for_console(Console::Nds);
        let wram = banks.bank("Shared WRAM").unwrap();
        assert!(wram.contains(0x0300_0000));
        assert!(wram.contains(0x0300_7FFF));
        assert!(!wram.contains(0x0300_8000));
        assert!(!wram.contains(0x02FF_FFFF));
    }
}
