//! Program space reads.
//!
//! Addresses are byte addresses. Anything above the first 64KB goes
//! through RAMPZ and `elpm`; RAMPZ is left at whatever the last far read
//! needed, so callers mixing near and far reads must not assume it is 0.

use crate::config::BANK_SIZE;
use crate::hal::ProgramMemory;

/// Byte in the low 64KB.
#[inline]
pub fn read_byte_near<H: ProgramMemory + ?Sized>(hw: &mut H, address: u16) -> u8 {
    hw.lpm(address)
}

/// Little-endian word in the low 64KB.
#[inline]
pub fn read_word_near<H: ProgramMemory + ?Sized>(hw: &mut H, address: u16) -> u16 {
    let lo = hw.lpm(address);
    let hi = hw.lpm(address.wrapping_add(1));
    u16::from_le_bytes([lo, hi])
}

#[inline]
pub fn read_byte_far<H: ProgramMemory + ?Sized>(hw: &mut H, address: u32) -> u8 {
    hw.set_rampz((address >> 16) as u8);
    hw.elpm(address as u16)
}

/// Little-endian word anywhere in program memory. The high byte is read
/// from the next bank when the low byte ends one.
#[inline]
pub fn read_word_far<H: ProgramMemory + ?Sized>(hw: &mut H, address: u32) -> u16 {
    let lo = read_byte_far(hw, address);
    let hi = read_byte_far(hw, address.wrapping_add(1));
    u16::from_le_bytes([lo, hi])
}

pub fn read_byte<H: ProgramMemory + ?Sized>(hw: &mut H, address: u32) -> u8 {
    if address >= BANK_SIZE {
        read_byte_far(hw, address)
    } else {
        read_byte_near(hw, address as u16)
    }
}

pub fn read_word<H: ProgramMemory + ?Sized>(hw: &mut H, address: u32) -> u16 {
    if address >= BANK_SIZE - 1 {
        read_word_far(hw, address)
    } else {
        read_word_near(hw, address as u16)
    }
}

/// Copy `buf.len()` bytes starting at `address` into `buf`.
pub fn read_into<H: ProgramMemory + ?Sized>(hw: &mut H, address: u32, buf: &mut [u8]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = read_byte(hw, address.wrapping_add(i as u32));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::SimulatedFlash;

    fn marked() -> SimulatedFlash {
        let mut sim = SimulatedFlash::new();
        let flash = sim.flash_mut();
        flash[0x0010] = 0x34;
        flash[0x0011] = 0x12;
        flash[0xFFFF] = 0xCD;
        flash[0x1_0000] = 0xAB;
        flash[0x1_2345] = 0x5A;
        sim
    }

    #[test]
    fn near_reads_leave_rampz_alone() {
        let mut sim = marked();
        sim.set_rampz(1);
        assert_eq!(read_word(&mut sim, 0x0010), 0x1234);
        assert_eq!(read_byte(&mut sim, 0x0010), 0x34);
        assert_eq!(sim.rampz(), 1);
    }

    #[test]
    fn far_reads_select_bank() {
        let mut sim = marked();
        assert_eq!(read_byte(&mut sim, 0x1_2345), 0x5A);
        assert_eq!(sim.rampz(), 1);
    }

    #[test]
    fn word_straddling_banks_carries_into_rampz() {
        let mut sim = marked();
        assert_eq!(read_word(&mut sim, 0xFFFF), 0xABCD);
        assert_eq!(sim.rampz(), 1);
    }

    #[test]
    fn read_into_crosses_bank_boundary() {
        let mut sim = marked();
        let mut buf = [0u8; 2];
        read_into(&mut sim, 0xFFFF, &mut buf);
        assert_eq!(buf, [0xCD, 0xAB]);
    }

    #[test]
    fn reads_at_top_of_address_space_wrap() {
        let mut sim = SimulatedFlash::new();
        sim.flash_mut()[0x1_FFFE] = 0x01;
        sim.flash_mut()[0x1_FFFF] = 0x02;
        sim.flash_mut()[0x0_0000] = 0x03;
        sim.flash_mut()[0x0_0001] = 0x04;

        assert_eq!(read_word(&mut sim, u32::MAX), 0x0302);
        let mut buf = [0u8; 4];
        read_into(&mut sim, u32::MAX - 1, &mut buf);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
    }
}
