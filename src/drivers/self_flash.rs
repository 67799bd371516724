//! Self-programming front end used by application and interrupt code.
//!
//! Owns the CPU handle and the one staging buffer. In firmware a single
//! instance lives for the whole run, usually in a
//! `static Mutex<RefCell<Option<SelfFlash<Cpu>>>>` so both the main loop
//! and an interrupt handler can reach it.

use crate::config::{self, Geometry, PAGE_SIZE};
use crate::drivers::pgmspace;
use crate::drivers::programmer::PageProgrammer;
use crate::drivers::staging::StagingBuffer;
use crate::error::Result;
use crate::hal::Hardware;

pub struct SelfFlash<H: Hardware> {
    programmer: PageProgrammer<H>,
    buffer: StagingBuffer,
}

impl<H: Hardware> SelfFlash<H> {
    /// Uses the layout of the device selected by Cargo features.
    pub fn new(hw: H) -> Self {
        Self::with_geometry(hw, config::DEVICE)
    }

    pub fn with_geometry(hw: H, geometry: Geometry) -> Self {
        Self {
            programmer: PageProgrammer::new(hw, geometry),
            buffer: StagingBuffer::new(),
        }
    }

    pub fn geometry(&self) -> &Geometry {
        self.programmer.geometry()
    }

    pub fn hw(&self) -> &H {
        self.programmer.hw()
    }

    pub fn hw_mut(&mut self) -> &mut H {
        self.programmer.hw_mut()
    }

    pub fn release(self) -> H {
        self.programmer.release()
    }

    /// Erase `page` and program it with `data` (at most one page, padded
    /// with 0xFF).
    pub fn write_page(&mut self, page: u16, data: &[u8]) -> Result<()> {
        self.programmer.write_page(page, data)
    }

    pub fn erase_page(&mut self, page: u16) -> Result<()> {
        self.programmer.erase_page(page)
    }

    pub fn verify_page(&mut self, page: u16, data: &[u8]) -> Result<bool> {
        self.programmer.verify_page(page, data)
    }

    pub fn buffer(&self) -> &[u8; PAGE_SIZE] {
        self.buffer.as_bytes()
    }

    pub fn buffer_erase(&mut self) {
        self.buffer.erase();
    }

    pub fn buffer_load(&mut self, page: u16, section: u8) -> Result<()> {
        self.buffer.load(&mut self.programmer, page, section)
    }

    pub fn buffer_load_page(&mut self, page: u16) -> Result<()> {
        self.buffer.load_page(&mut self.programmer, page)
    }

    pub fn buffer_copy_in(&mut self, start: usize, data: &[u8]) -> Result<()> {
        self.buffer.copy_in(start, data)
    }

    pub fn commit_buffer(&mut self, page: u16) -> Result<()> {
        self.buffer.commit_to_flash(&mut self.programmer, page)
    }

    /// Copy program memory starting at `address` into `buf`.
    pub fn read_into(&mut self, address: u32, buf: &mut [u8]) {
        pgmspace::read_into(self.programmer.hw_mut(), address, buf);
    }
}
