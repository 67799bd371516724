//! Register-level access used by the flash drivers.
//!
//! The drivers never touch SREG, RAMPZ or SPMCSR directly; they go through
//! the traits below so the same sequencing code runs against the real CPU
//! (`Cpu`, AVR builds only) and against `sim::SimulatedFlash` (host builds
//! only) in tests.

use core::convert::Infallible;

#[cfg(not(target_arch = "avr"))]
pub mod sim;
pub mod spm;

#[cfg(target_arch = "avr")]
pub mod cpu;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod timer;

#[cfg(not(target_arch = "avr"))]
pub use sim::SimulatedFlash;
pub use spm::SpmControl;

#[cfg(target_arch = "avr")]
pub use cpu::Cpu;
#[cfg(target_arch = "avr")]
pub use gpio::{board, Output, Pin};
#[cfg(target_arch = "avr")]
pub use timer::delay_ms;

/// Global interrupt flag (the I bit of SREG).
pub trait InterruptControl {
    fn interrupts_enabled(&self) -> bool;
    fn disable_interrupts(&mut self);
    fn enable_interrupts(&mut self);
}

/// Program memory reads through `lpm`/`elpm` and the RAMPZ register.
pub trait ProgramMemory {
    fn rampz(&self) -> u8;
    fn set_rampz(&mut self, bank: u8);
    /// Byte at `address` in the low 64KB.
    fn lpm(&mut self, address: u16) -> u8;
    /// Byte at `address` in the bank currently selected by RAMPZ.
    fn elpm(&mut self, address: u16) -> u8;
}

/// Store Program Memory controller.
pub trait SpmController {
    /// `WouldBlock` while a previous SPM operation is still running.
    fn poll_ready(&mut self) -> nb::Result<(), Infallible>;
    /// Load one word into the temporary page buffer at byte `offset`.
    fn fill_word(&mut self, offset: u16, word: u16);
    /// Write `control` to SPMCSR and execute `spm` with Z = `address`.
    fn command(&mut self, address: u16, control: SpmControl);
}

/// Everything the flash drivers need from the CPU.
pub trait Hardware: InterruptControl + ProgramMemory + SpmController {}

impl<T: InterruptControl + ProgramMemory + SpmController> Hardware for T {}
