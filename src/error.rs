//! Error type for the self-programming subsystem

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpmError {
    /// Page index is past the last reprogrammable page
    PageOutOfRange { page: u16, page_count: u16 },
    /// Section index is not one of the four quarters of a page
    InvalidSection(u8),
    /// Copy window does not fit inside the staging buffer
    BufferOverflow { start: usize, len: usize },
    /// Copy length is not a whole number of words
    OddLength(usize),
    /// Copy window does not start on a word boundary
    OddOffset(usize),
}

pub type Result<T> = core::result::Result<T, SpmError>;

impl fmt::Display for SpmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageOutOfRange { page, page_count } => {
                write!(f, "page {} out of range (0..{})", page, page_count)
            }
            Self::InvalidSection(section) => write!(f, "invalid section {}", section),
            Self::BufferOverflow { start, len } => {
                write!(f, "copy of {} bytes at offset {} overflows buffer", len, start)
            }
            Self::OddLength(len) => write!(f, "copy length {} is not even", len),
            Self::OddOffset(start) => write!(f, "copy offset {} is not word aligned", start),
        }
    }
}

impl ufmt::uDisplay for SpmError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> core::result::Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        match self {
            Self::PageOutOfRange { page, page_count } => {
                ufmt::uwrite!(f, "page {} out of range (0..{})", page, page_count)
            }
            Self::InvalidSection(section) => ufmt::uwrite!(f, "invalid section {}", section),
            Self::BufferOverflow { start, len } => {
                ufmt::uwrite!(f, "copy of {} bytes at offset {} overflows buffer", len, start)
            }
            Self::OddLength(len) => ufmt::uwrite!(f, "copy length {} is not even", len),
            Self::OddOffset(start) => ufmt::uwrite!(f, "copy offset {} is not word aligned", start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink(heapless::String<64>);

    impl ufmt::uWrite for Sink {
        type Error = ();

        fn write_str(&mut self, s: &str) -> core::result::Result<(), ()> {
            self.0.push_str(s)
        }
    }

    #[test]
    fn display_and_udisplay_agree() {
        let errors = [
            SpmError::PageOutOfRange { page: 480, page_count: 480 },
            SpmError::InvalidSection(4),
            SpmError::BufferOverflow { start: 250, len: 8 },
            SpmError::OddLength(3),
            SpmError::OddOffset(usize::MAX - 2),
        ];
        for err in errors {
            let mut sink = Sink(heapless::String::new());
            ufmt::uwrite!(&mut sink, "{}", err).unwrap();
            assert_eq!(sink.0.as_str(), std::format!("{}", err));
        }
    }
}
