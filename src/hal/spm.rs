//! SPMCSR bit patterns

use bitflags::bitflags;

/// Data-space address of SPMCSR on ATmega64/128
pub const SPMCSR_ADDR: u8 = 0x68;

bitflags! {
    /// Store Program Memory Control and Status Register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpmControl: u8 {
        const SPMEN = 1 << 0;
        const PGERS = 1 << 1;
        const PGWRT = 1 << 2;
        const BLBSET = 1 << 3;
        const RWWSRE = 1 << 4;
        const RWWSB = 1 << 6;
        const SPMIE = 1 << 7;

        /// Load the temporary page buffer
        const BUFFER_FILL = Self::SPMEN.bits();
        /// Erase the page addressed by Z
        const PAGE_ERASE = Self::PGERS.bits() | Self::SPMEN.bits();
        /// Program the temporary page buffer into the page addressed by Z
        const PAGE_WRITE = Self::PGWRT.bits() | Self::SPMEN.bits();
        /// Re-enable reads from the RWW section
        const RWW_ENABLE = Self::RWWSRE.bits() | Self::SPMEN.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_patterns_match_datasheet() {
        assert_eq!(SpmControl::BUFFER_FILL.bits(), 0x01);
        assert_eq!(SpmControl::PAGE_ERASE.bits(), 0x03);
        assert_eq!(SpmControl::PAGE_WRITE.bits(), 0x05);
        assert_eq!(SpmControl::RWW_ENABLE.bits(), 0x11);
    }
}
