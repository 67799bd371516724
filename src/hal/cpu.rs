//! ATmega128 implementation of the flash HAL traits
#![allow(clippy::missing_safety_doc)]

use avr_device::atmega128a::{BOOT_LOAD, CPU};
use core::convert::Infallible;

use super::spm::{SpmControl, SPMCSR_ADDR};
use super::{InterruptControl, ProgramMemory, SpmController};

pub struct Cpu {
    _private: (),
}

impl Cpu {
    /// Only one `Cpu` should exist; it owns SREG, RAMPZ and SPMCSR.
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptControl for Cpu {
    #[inline]
    fn interrupts_enabled(&self) -> bool {
        avr_device::interrupt::is_enabled()
    }

    #[inline]
    fn disable_interrupts(&mut self) {
        avr_device::interrupt::disable();
    }

    #[inline]
    fn enable_interrupts(&mut self) {
        unsafe { avr_device::interrupt::enable() };
    }
}

impl ProgramMemory for Cpu {
    #[inline]
    fn rampz(&self) -> u8 {
        unsafe { (*CPU::ptr()).rampz.read().bits() }
    }

    #[inline]
    fn set_rampz(&mut self, bank: u8) {
        unsafe { (*CPU::ptr()).rampz.write(|w| w.bits(bank)) }
    }

    #[inline]
    fn lpm(&mut self, address: u16) -> u8 {
        let byte: u8;
        unsafe {
            core::arch::asm!(
                "lpm {byte}, Z",
                byte = out(reg) byte,
                in("Z") address,
                options(nostack, readonly, preserves_flags),
            );
        }
        byte
    }

    #[inline]
    fn elpm(&mut self, address: u16) -> u8 {
        let byte: u8;
        unsafe {
            core::arch::asm!(
                "elpm {byte}, Z",
                byte = out(reg) byte,
                in("Z") address,
                options(nostack, readonly, preserves_flags),
            );
        }
        byte
    }
}

impl SpmController for Cpu {
    #[inline]
    fn poll_ready(&mut self) -> nb::Result<(), Infallible> {
        if unsafe { (*BOOT_LOAD::ptr()).spmcsr.read().spmen().bit_is_set() } {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    // spm only executes from the boot section, and the RWW section cannot
    // be read until the operation finishes, so both SPM entry points live
    // in `.bootloader` and spin on SPMEN before returning.

    #[inline(never)]
    #[link_section = ".bootloader"]
    fn fill_word(&mut self, offset: u16, word: u16) {
        // spm must follow the SPMCSR store within four cycles
        unsafe {
            core::arch::asm!(
                "movw r0, {word}",
                "sts {spmcsr}, {ctl}",
                "spm",
                "clr r1",
                "1:",
                "lds {tmp}, {spmcsr}",
                "sbrc {tmp}, 0",
                "rjmp 1b",
                word = in(reg_pair) word,
                ctl = in(reg) SpmControl::BUFFER_FILL.bits(),
                tmp = out(reg) _,
                spmcsr = const SPMCSR_ADDR,
                in("Z") offset,
                options(nostack),
            );
        }
    }

    #[inline(never)]
    #[link_section = ".bootloader"]
    fn command(&mut self, address: u16, control: SpmControl) {
        unsafe {
            core::arch::asm!(
                "sts {spmcsr}, {ctl}",
                "spm",
                "1:",
                "lds {tmp}, {spmcsr}",
                "sbrc {tmp}, 0",
                "rjmp 1b",
                ctl = in(reg) control.bits(),
                tmp = out(reg) _,
                spmcsr = const SPMCSR_ADDR,
                in("Z") address,
                options(nostack, preserves_flags),
            );
        }
    }
}
