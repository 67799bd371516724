//! Configuration constants for the self-programming subsystem

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Size of one flash page in bytes
pub const PAGE_SIZE: usize = 256;

/// Number of 16-bit words in one flash page
pub const PAGE_WORDS: usize = PAGE_SIZE / 2;

/// Sections a page is split into when loading it back from flash
pub const SECTION_COUNT: u8 = 4;

/// Size of one section in bytes
pub const SECTION_SIZE: usize = PAGE_SIZE / SECTION_COUNT as usize;

/// Bytes reachable through a 16-bit Z pointer
pub const BANK_SIZE: u32 = 0x1_0000;

/// Page that the measurement workload programs
pub const BENCH_PAGE: u16 = 50;

/// Interval between measurement workload ticks in milliseconds
pub const BENCH_TICK_MS: u16 = 500;

/// Program memory layout of a device.
///
/// `page_count` only covers pages the application may reprogram; the boot
/// section at the top of flash is left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub page_count: u16,
    pub pages_per_bank: u16,
}

impl Geometry {
    /// 128KB flash, 8KB boot section, two RAMPZ banks
    pub const ATMEGA128: Geometry = Geometry {
        page_count: 480,
        pages_per_bank: (BANK_SIZE / PAGE_SIZE as u32) as u16,
    };

    /// 64KB flash, 8KB boot section, fits one bank
    pub const ATMEGA64: Geometry = Geometry {
        page_count: 224,
        pages_per_bank: (BANK_SIZE / PAGE_SIZE as u32) as u16,
    };

    #[inline]
    pub fn contains(&self, page: u16) -> bool {
        page < self.page_count
    }

    /// Whether more than one bank is needed to reach every page.
    #[inline]
    pub fn is_banked(&self) -> bool {
        self.page_count > self.pages_per_bank
    }

    /// Byte address of the first byte of `page` in program memory.
    #[inline]
    pub fn page_address(&self, page: u16) -> u32 {
        page as u32 * PAGE_SIZE as u32
    }
}

#[cfg(not(feature = "atmega64"))]
pub const DEVICE: Geometry = Geometry::ATMEGA128;

#[cfg(feature = "atmega64")]
pub const DEVICE: Geometry = Geometry::ATMEGA64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_pages_end_where_boot_section_starts() {
        // Must agree with the .bootloader section start passed by build.rs
        assert_eq!(Geometry::ATMEGA128.page_address(Geometry::ATMEGA128.page_count), 0x1_E000);
        assert_eq!(Geometry::ATMEGA64.page_address(Geometry::ATMEGA64.page_count), 0xE000);
    }

    #[test]
    fn only_atmega128_needs_rampz() {
        assert!(Geometry::ATMEGA128.is_banked());
        assert!(!Geometry::ATMEGA64.is_banked());
    }
}
