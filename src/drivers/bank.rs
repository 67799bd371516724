//! RAMPZ bank selection for page addressed commands

use crate::config::{Geometry, PAGE_SIZE};
use crate::hal::ProgramMemory;

/// Bank holding `page`. Always 0 on devices that fit in one bank.
#[inline]
pub fn bank_of(geometry: &Geometry, page: u16) -> u8 {
    if geometry.is_banked() {
        (page / geometry.pages_per_bank) as u8
    } else {
        0
    }
}

/// Z pointer value addressing `page` inside its bank.
#[inline]
pub fn page_offset(geometry: &Geometry, page: u16) -> u16 {
    ((page % geometry.pages_per_bank) as u32 * PAGE_SIZE as u32) as u16
}

/// Point RAMPZ at the bank holding `page` and return the bank.
///
/// Single-bank devices still get RAMPZ cleared so a far read left behind
/// by an earlier call cannot redirect the next command.
pub fn select_bank<H: ProgramMemory + ?Sized>(hw: &mut H, geometry: &Geometry, page: u16) -> u8 {
    let bank = bank_of(geometry, page);
    hw.set_rampz(bank);
    log::trace!("page {} -> bank {}", page, bank);
    bank
}
