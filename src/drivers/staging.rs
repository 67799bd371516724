//! Page-sized RAM buffer for assembling a page before committing it.

use crate::config::{PAGE_SIZE, SECTION_COUNT, SECTION_SIZE};
use crate::drivers::programmer::PageProgrammer;
use crate::error::{Result, SpmError};
use crate::hal::Hardware;

pub struct StagingBuffer {
    data: [u8; PAGE_SIZE],
}

impl StagingBuffer {
    /// Starts out erased.
    pub const fn new() -> Self {
        Self {
            data: [0xFF; PAGE_SIZE],
        }
    }

    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    pub fn erase(&mut self) {
        self.data.fill(0xFF);
    }

    /// Replace one quarter of the buffer with the same quarter of `page`.
    pub fn load<H: Hardware>(
        &mut self,
        programmer: &mut PageProgrammer<H>,
        page: u16,
        section: u8,
    ) -> Result<()> {
        if section >= SECTION_COUNT {
            return Err(SpmError::InvalidSection(section));
        }
        let start = section as usize * SECTION_SIZE;
        programmer.read_section(page, section, &mut self.data[start..start + SECTION_SIZE])
    }

    /// Load all of `page`, one section per critical section.
    pub fn load_page<H: Hardware>(&mut self, programmer: &mut PageProgrammer<H>, page: u16) -> Result<()> {
        programmer.check_page(page)?;
        for section in 0..SECTION_COUNT {
            self.load(programmer, page, section)?;
        }
        Ok(())
    }

    /// Overwrite `data.len()` bytes starting at `start`.
    ///
    /// The hardware takes whole words, so both `start` and the length must
    /// be even. Nothing is written unless the whole window fits.
    pub fn copy_in(&mut self, start: usize, data: &[u8]) -> Result<()> {
        let len = data.len();
        let end = match start.checked_add(len) {
            Some(end) if end <= PAGE_SIZE => end,
            _ => {
                log::warn!("rejecting copy of {} bytes at {}", len, start);
                return Err(SpmError::BufferOverflow { start, len });
            }
        };
        if len % 2 != 0 {
            log::warn!("rejecting odd copy of {} bytes", len);
            return Err(SpmError::OddLength(len));
        }
        if start % 2 != 0 {
            log::warn!("rejecting copy at odd offset {}", start);
            return Err(SpmError::OddOffset(start));
        }
        self.data[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Program the whole buffer into `page`.
    pub fn commit_to_flash<H: Hardware>(&self, programmer: &mut PageProgrammer<H>, page: u16) -> Result<()> {
        programmer.write_page(page, &self.data)
    }
}

impl Default for StagingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
