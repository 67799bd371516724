//! In-memory ATmega128 flash controller.
//!
//! Emulates the parts of the CPU the flash drivers touch: 128KB of program
//! memory, the SPM temporary page buffer, RAMPZ and the global interrupt
//! flag. Every SPM command is recorded together with the RAMPZ value and
//! interrupt state at the time it was issued, so tests can check ordering,
//! addressing and interrupt discipline.
//!
//! Programming follows real flash: a page write can only clear bits, so a
//! write without a preceding erase shows up as corrupted data.

use core::convert::Infallible;

use heapless::Vec;

use super::spm::SpmControl;
use super::{InterruptControl, ProgramMemory, SpmController};
use crate::config::{PAGE_SIZE, PAGE_WORDS};

/// Program memory size of an ATmega128
pub const FLASH_SIZE: usize = 128 * 1024;

/// Byte addresses wrap at the end of program memory, like the 17-bit Z:RAMPZ
/// pointer on silicon.
#[inline]
fn flash_index(rampz: u8, z: u16) -> usize {
    let address = ((rampz as u32) << 16) | z as u32;
    (address % FLASH_SIZE as u32) as usize
}

/// Commands kept in the log before older ones are dropped
pub const LOG_CAPACITY: usize = 64;

/// One executed SPM command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpmEvent {
    /// Z pointer
    pub z: u16,
    /// RAMPZ at the time of the command
    pub rampz: u8,
    pub control: SpmControl,
    pub interrupts_enabled: bool,
}

impl SpmEvent {
    /// Full byte address the command targeted.
    pub fn address(&self) -> u32 {
        ((self.rampz as u32) << 16) | self.z as u32
    }
}

pub struct SimulatedFlash {
    flash: [u8; FLASH_SIZE],
    page_buffer: [u16; PAGE_WORDS],
    rampz: u8,
    interrupts: bool,
    busy: bool,
    rww_busy: bool,
    events: Vec<SpmEvent, LOG_CAPACITY>,
    dropped_events: usize,
    fills: usize,
    unguarded: usize,
    busy_polls: usize,
}

impl SimulatedFlash {
    /// Blank (all 0xFF) flash with interrupts globally enabled.
    pub fn new() -> Self {
        Self {
            flash: [0xFF; FLASH_SIZE],
            page_buffer: [0xFFFF; PAGE_WORDS],
            rampz: 0,
            interrupts: true,
            busy: false,
            rww_busy: false,
            events: Vec::new(),
            dropped_events: 0,
            fills: 0,
            unguarded: 0,
            busy_polls: 0,
        }
    }

    /// Flash pre-loaded with `image` starting at address 0.
    pub fn with_image(image: &[u8]) -> Self {
        let mut sim = Self::new();
        let len = core::cmp::min(image.len(), FLASH_SIZE);
        sim.flash[..len].copy_from_slice(&image[..len]);
        sim
    }

    pub fn flash(&self) -> &[u8] {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut [u8] {
        &mut self.flash
    }

    /// Raw contents of `page`, bypassing `lpm`/`elpm`.
    pub fn page(&self, page: u16) -> &[u8] {
        let base = page as usize * PAGE_SIZE;
        &self.flash[base..base + PAGE_SIZE]
    }

    pub fn events(&self) -> &[SpmEvent] {
        &self.events
    }

    /// Commands issued, including any that no longer fit in the log.
    pub fn command_count(&self) -> usize {
        self.events.len() + self.dropped_events
    }

    pub fn fill_count(&self) -> usize {
        self.fills
    }

    /// Fills and commands executed while interrupts were enabled.
    pub fn unguarded_operations(&self) -> usize {
        self.unguarded
    }

    /// Times the busy flag made a caller wait.
    pub fn busy_polls(&self) -> usize {
        self.busy_polls
    }

    /// True between an erase/write and the next RWW re-enable.
    pub fn rww_busy(&self) -> bool {
        self.rww_busy
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
        self.dropped_events = 0;
        self.fills = 0;
        self.unguarded = 0;
        self.busy_polls = 0;
    }

    fn page_base(&self, z: u16) -> usize {
        flash_index(self.rampz, z) & !(PAGE_SIZE - 1)
    }

    fn record(&mut self, z: u16, control: SpmControl) {
        let event = SpmEvent {
            z,
            rampz: self.rampz,
            control,
            interrupts_enabled: self.interrupts,
        };
        if self.events.push(event).is_err() {
            self.dropped_events += 1;
        }
    }
}

impl Default for SimulatedFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptControl for SimulatedFlash {
    fn interrupts_enabled(&self) -> bool {
        self.interrupts
    }

    fn disable_interrupts(&mut self) {
        self.interrupts = false;
    }

    fn enable_interrupts(&mut self) {
        self.interrupts = true;
    }
}

impl ProgramMemory for SimulatedFlash {
    fn rampz(&self) -> u8 {
        self.rampz
    }

    fn set_rampz(&mut self, bank: u8) {
        self.rampz = bank;
    }

    fn lpm(&mut self, address: u16) -> u8 {
        self.flash[address as usize]
    }

    fn elpm(&mut self, address: u16) -> u8 {
        self.flash[flash_index(self.rampz, address)]
    }
}

impl SpmController for SimulatedFlash {
    fn poll_ready(&mut self) -> nb::Result<(), Infallible> {
        if self.busy {
            self.busy = false;
            self.busy_polls += 1;
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    fn fill_word(&mut self, offset: u16, word: u16) {
        if self.interrupts {
            self.unguarded += 1;
        }
        self.fills += 1;
        self.page_buffer[(offset as usize & (PAGE_SIZE - 1)) >> 1] = word;
    }

    fn command(&mut self, address: u16, control: SpmControl) {
        if self.interrupts {
            self.unguarded += 1;
        }
        self.record(address, control);
        let base = self.page_base(address);

        if control == SpmControl::PAGE_ERASE {
            self.flash[base..base + PAGE_SIZE].fill(0xFF);
            self.rww_busy = true;
        } else if control == SpmControl::PAGE_WRITE {
            for (i, word) in self.page_buffer.iter().enumerate() {
                let [lo, hi] = word.to_le_bytes();
                self.flash[base + 2 * i] &= lo;
                self.flash[base + 2 * i + 1] &= hi;
            }
            // The temporary buffer is undefined after a write
            self.page_buffer = [0xFFFF; PAGE_WORDS];
            self.rww_busy = true;
        } else if control == SpmControl::RWW_ENABLE {
            self.rww_busy = false;
        }

        self.busy = true;
    }
}
