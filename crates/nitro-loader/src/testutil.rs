//! Shared fixtures for loader tests

use crate::rom::crc16;

/// Build a minimal NDS image with a valid header checksum
pub(crate) fn build_nds_rom() -> Vec<u8> {
    let mut data = vec![0u8; 0x200];
    data[0x00..0x0C].copy_from_slice(b"TESTGAME\0\0\0\0");
    data[0x0C..0x10].copy_from_slice(b"ATST");
    data[0x10..0x12].copy_from_slice(b"01");
    data[0x12] = 0x00;
    // ARM9: 0x20 bytes at ROM offset 0x1E0, loaded to main RAM
    data[0x20..0x24].copy_from_slice(&0x0000_01E0u32.to_le_bytes());
    data[0x24..0x28].copy_from_slice(&0x0200_0000u32.to_le_bytes());
    data[0x28..0x2C].copy_from_slice(&0x0200_0000u32.to_le_bytes());
    data[0x2C..0x30].copy_from_slice(&0x20u32.to_le_bytes());
    // ARM7: empty program entering WRAM
    data[0x30..0x34].copy_from_slice(&0x0000_0200u32.to_le_bytes());
    data[0x34..0x38].copy_from_slice(&0x0380_0000u32.to_le_bytes());
    data[0x38..0x3C].copy_from_slice(&0x0380_0000u32.to_le_bytes());
    data[0x3C..0x40].copy_from_slice(&0u32.to_le_bytes());
    seal_nds_header(&mut data);
    data
}

/// Recompute and store the NDS header checksum after edits
pub(crate) fn seal_nds_header(data: &mut [u8]) {
    let crc = crc16(&data[..0x15E]);
    data[0x15E..0x160].copy_from_slice(&crc.to_le_bytes());
}

/// Build a minimal GBA image with a valid complement check
pub(crate) fn build_gba_rom() -> Vec<u8> {
    let mut data = vec![0u8; 0x100];
    data[0xA0..0xAC].copy_from_slice(b"TESTGAME\0\0\0\0");
    data[0xAC..0xB0].copy_from_slice(b"ATSE");
    data[0xB0..0xB2].copy_from_slice(b"01");
    data[0xB2] = 0x96;
    seal_gba_header(&mut data);
    data
}

/// Recompute and store the GBA complement check after edits
pub(crate) fn seal_gba_header(data: &mut [u8]) {
    let sum = data[0xA0..=0xBC]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    data[0xBD] = 0u8.wrapping_sub(0x19).wrapping_sub(sum);
}
