//! Page erase/write through the SPM command interface.
//!
//! A page commit is one uninterrupted sequence: select the bank, erase,
//! re-enable the RWW section, stream a full page of words into the
//! temporary buffer, write, re-enable the RWW section again. An interrupt
//! anywhere in between can leave a half programmed page, so the whole
//! sequence runs inside one critical section. Page indices are checked
//! before the critical section is entered; a rejected page never reaches
//! the hardware.

use core::convert::Infallible;

use crate::config::{Geometry, PAGE_SIZE, SECTION_COUNT, SECTION_SIZE};
use crate::critical::{self, CriticalSection};
use crate::drivers::{bank, pgmspace};
use crate::error::{Result, SpmError};
use crate::hal::{Hardware, SpmControl, SpmController};

/// Fill value for bytes past the end of the caller's data
const ERASED_WORD: u16 = 0xFFFF;

pub struct PageProgrammer<H: Hardware> {
    hw: H,
    geometry: Geometry,
}

impl<H: Hardware> PageProgrammer<H> {
    pub fn new(hw: H, geometry: Geometry) -> Self {
        Self { hw, geometry }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn release(self) -> H {
        self.hw
    }

    pub fn check_page(&self, page: u16) -> Result<()> {
        if self.geometry.contains(page) {
            Ok(())
        } else {
            log::warn!(
                "rejecting page {} (device has {})",
                page,
                self.geometry.page_count
            );
            Err(SpmError::PageOutOfRange {
                page,
                page_count: self.geometry.page_count,
            })
        }
    }

    /// Erase `page` and program it with `data`.
    ///
    /// Data longer than a page is cut at the page size; a shorter page is
    /// padded with 0xFF, so the whole page is always rewritten.
    pub fn write_page(&mut self, page: u16, data: &[u8]) -> Result<()> {
        self.check_page(page)?;
        let data = &data[..data.len().min(PAGE_SIZE)];
        let geometry = self.geometry;

        {
            let mut cs = CriticalSection::new(&mut self.hw);
            let address = Self::address_page(&mut *cs, &geometry, page);

            spm(&mut *cs, address, SpmControl::PAGE_ERASE);
            spm(&mut *cs, 0, SpmControl::RWW_ENABLE);

            let mut offset: u16 = 0;
            for pair in data.chunks(2) {
                let word = u16::from_le_bytes([pair[0], pair.get(1).copied().unwrap_or(0xFF)]);
                fill(&mut *cs, offset, word);
                offset += 2;
            }
            while (offset as usize) < PAGE_SIZE {
                fill(&mut *cs, offset, ERASED_WORD);
                offset += 2;
            }

            spm(&mut *cs, address, SpmControl::PAGE_WRITE);
            spm(&mut *cs, 0, SpmControl::RWW_ENABLE);
        }

        log::debug!("programmed page {} ({} bytes)", page, data.len());
        Ok(())
    }

    /// Erase `page` without programming it.
    pub fn erase_page(&mut self, page: u16) -> Result<()> {
        self.check_page(page)?;
        let geometry = self.geometry;

        {
            let mut cs = CriticalSection::new(&mut self.hw);
            let address = Self::address_page(&mut *cs, &geometry, page);
            spm(&mut *cs, address, SpmControl::PAGE_ERASE);
            spm(&mut *cs, 0, SpmControl::RWW_ENABLE);
        }

        log::debug!("erased page {}", page);
        Ok(())
    }

    /// Read one quarter of `page` into `out`. At most `SECTION_SIZE` bytes
    /// are read; a shorter `out` reads only the start of the section.
    ///
    /// Far reads move RAMPZ, so each section is read with interrupts off.
    pub fn read_section(&mut self, page: u16, section: u8, out: &mut [u8]) -> Result<()> {
        self.check_page(page)?;
        if section >= SECTION_COUNT {
            log::warn!("rejecting section {}", section);
            return Err(SpmError::InvalidSection(section));
        }
        let base = self.geometry.page_address(page) + (section as usize * SECTION_SIZE) as u32;
        let len = out.len().min(SECTION_SIZE);

        critical::free(&mut self.hw, |hw| {
            pgmspace::read_into(hw, base, &mut out[..len]);
        });

        log::debug!("loaded page {} section {}", page, section);
        Ok(())
    }

    /// Compare `page` against `data`, padded with 0xFF to a full page.
    pub fn verify_page(&mut self, page: u16, data: &[u8]) -> Result<bool> {
        let data = &data[..data.len().min(PAGE_SIZE)];
        let mut section = [0u8; SECTION_SIZE];

        for s in 0..SECTION_COUNT {
            self.read_section(page, s, &mut section)?;
            let start = s as usize * SECTION_SIZE;
            for (i, &actual) in section.iter().enumerate() {
                let expected = data.get(start + i).copied().unwrap_or(0xFF);
                if actual != expected {
                    log::debug!(
                        "page {} differs at offset {}: {:#04x} != {:#04x}",
                        page,
                        start + i,
                        actual,
                        expected
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn address_page(hw: &mut H, geometry: &Geometry, page: u16) -> u16 {
        bank::select_bank(hw, geometry, page);
        bank::page_offset(geometry, page)
    }
}

fn wait_ready<H: SpmController + ?Sized>(hw: &mut H) {
    nb::block!(hw.poll_ready()).unwrap_or_else(|never: Infallible| match never {})
}

fn spm<H: SpmController + ?Sized>(hw: &mut H, address: u16, control: SpmControl) {
    wait_ready(hw);
    log::trace!("spm {:#06x} {:?}", address, control);
    hw.command(address, control);
}

fn fill<H: SpmController + ?Sized>(hw: &mut H, offset: u16, word: u16) {
    wait_ready(hw);
    hw.fill_word(offset, word);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PAGE_WORDS;
    use crate::hal::{InterruptControl, ProgramMemory, SimulatedFlash};

    fn programmer() -> PageProgrammer<SimulatedFlash> {
        PageProgrammer::new(SimulatedFlash::new(), Geometry::ATMEGA128)
    }

    #[test]
    fn command_sequence_is_erase_rww_write_rww() {
        let mut p = programmer();
        p.write_page(50, &[0u8; PAGE_SIZE]).unwrap();

        let controls: heapless::Vec<SpmControl, 4> =
            p.hw().events().iter().map(|e| e.control).collect();
        assert_eq!(
            controls.as_slice(),
            &[
                SpmControl::PAGE_ERASE,
                SpmControl::RWW_ENABLE,
                SpmControl::PAGE_WRITE,
                SpmControl::RWW_ENABLE,
            ]
        );
        let events = p.hw().events();
        assert_eq!(events[0].z, 50 << 8);
        assert_eq!(events[2].z, 50 << 8);
        assert_eq!(p.hw().fill_count(), PAGE_WORDS);
        assert!(!p.hw().rww_busy());
    }

    #[test]
    fn whole_sequence_runs_with_interrupts_disabled() {
        let mut p = programmer();
        p.write_page(3, &[1, 2, 3, 4]).unwrap();
        assert_eq!(p.hw().unguarded_operations(), 0);
        assert!(p.hw().events().iter().all(|e| !e.interrupts_enabled));
        assert!(p.hw().interrupts_enabled());
    }

    #[test]
    fn waits_for_previous_command() {
        let mut p = programmer();
        p.write_page(3, &[]).unwrap();
        // erase, rww, write each leave the controller busy for the next step
        assert_eq!(p.hw().busy_polls(), 3);
    }

    #[test]
    fn upper_bank_pages_use_rampz() {
        let mut p = programmer();
        p.write_page(300, &[0x11; 4]).unwrap();
        let erase = p.hw().events()[0];
        assert_eq!(erase.rampz, 1);
        assert_eq!(erase.z, 44 << 8);
        assert_eq!(erase.address(), 300 * PAGE_SIZE as u32);
        assert_eq!(&p.hw().page(300)[..6], &[0x11, 0x11, 0x11, 0x11, 0xFF, 0xFF]);
    }

    #[test]
    fn odd_length_pads_last_word() {
        let mut p = programmer();
        p.write_page(7, &[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(&p.hw().page(7)[..4], &[0xAA, 0xBB, 0xCC, 0xFF]);
    }

    #[test]
    fn over_length_data_is_clamped() {
        let mut p = programmer();
        let data = [0x42u8; PAGE_SIZE + 40];
        p.write_page(8, &data).unwrap();
        assert_eq!(p.hw().page(8), &data[..PAGE_SIZE]);
        assert_eq!(p.hw().page(9), &[0xFF; PAGE_SIZE]);
        assert_eq!(p.hw().fill_count(), PAGE_WORDS);
    }

    #[test]
    fn rejected_page_leaves_hardware_untouched() {
        let mut p = programmer();
        p.hw_mut().set_rampz(1);
        let err = p.write_page(480, &[0; PAGE_SIZE]).unwrap_err();
        assert_eq!(err, SpmError::PageOutOfRange { page: 480, page_count: 480 });
        assert_eq!(p.hw().command_count(), 0);
        assert_eq!(p.hw().fill_count(), 0);
        assert_eq!(p.hw().rampz(), 1);
        assert!(p.hw().interrupts_enabled());
        assert_eq!(p.erase_page(u16::MAX), Err(SpmError::PageOutOfRange { page: u16::MAX, page_count: 480 }));
        assert_eq!(p.hw().command_count(), 0);
    }

    #[test]
    fn erase_only_clears_page() {
        let mut p = programmer();
        p.write_page(12, &[0u8; PAGE_SIZE]).unwrap();
        p.hw_mut().clear_events();
        p.erase_page(12).unwrap();
        assert_eq!(p.hw().page(12), &[0xFF; PAGE_SIZE]);
        assert_eq!(p.hw().command_count(), 2);
        assert_eq!(p.hw().fill_count(), 0);
    }

    #[test]
    fn read_section_rejects_bad_section() {
        let mut p = programmer();
        let mut out = [0u8; SECTION_SIZE];
        assert_eq!(p.read_section(1, 4, &mut out), Err(SpmError::InvalidSection(4)));
        assert_eq!(
            p.read_section(480, 0, &mut out),
            Err(SpmError::PageOutOfRange { page: 480, page_count: 480 })
        );
    }

    #[test]
    fn read_section_restores_interrupts() {
        let mut p = programmer();
        let mut out = [0u8; SECTION_SIZE];
        p.read_section(400, 3, &mut out).unwrap();
        assert!(p.hw().interrupts_enabled());
        assert_eq!(p.hw().rampz(), 1);
    }

    #[test]
    fn verify_detects_mismatch() {
        let mut p = programmer();
        let data = [0x5Au8; 10];
        p.write_page(20, &data).unwrap();
        assert_eq!(p.verify_page(20, &data), Ok(true));
        assert_eq!(p.verify_page(20, &[0x5A; 12]), Ok(false));
        p.hw_mut().flash_mut()[20 * PAGE_SIZE + 200] = 0x00;
        assert_eq!(p.verify_page(20, &data), Ok(false));
    }
}
