//! Page write timing workload.
//!
//! Driven by a periodic tick. Odd ticks commit the workload data to the
//! bench page with a trigger pin held high for the duration of the write,
//! so the commit time can be measured on a scope. Even ticks regenerate
//! the data so consecutive commits differ.

use embedded_hal::digital::v2::OutputPin;

use crate::config::{BENCH_PAGE, PAGE_SIZE};
use crate::drivers::SelfFlash;
use crate::error::SpmError;
use crate::hal::Hardware;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Committed,
    Regenerated,
}

#[derive(Debug, PartialEq, Eq)]
pub enum BenchError<E> {
    Pin(E),
    Flash(SpmError),
}

impl<E> From<SpmError> for BenchError<E> {
    fn from(err: SpmError) -> Self {
        BenchError::Flash(err)
    }
}

pub struct Workload {
    page: u16,
    ticks: u8,
    data: [u8; PAGE_SIZE],
}

impl Workload {
    pub fn new() -> Self {
        Self::for_page(BENCH_PAGE)
    }

    /// Data starts out as 0, 1, 2, ... 255.
    pub fn for_page(page: u16) -> Self {
        let mut data = [0u8; PAGE_SIZE];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = i as u8;
        }
        Self {
            page,
            ticks: 0,
            data,
        }
    }

    pub fn data(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    pub fn ticks(&self) -> u8 {
        self.ticks
    }

    pub fn tick<H, P>(&mut self, flash: &mut SelfFlash<H>, trigger: &mut P) -> Result<Tick, BenchError<P::Error>>
    where
        H: Hardware,
        P: OutputPin,
    {
        self.ticks = self.ticks.wrapping_add(1);

        if self.ticks % 2 == 1 {
            trigger.set_high().map_err(BenchError::Pin)?;
            let written = flash.write_page(self.page, &self.data);
            trigger.set_low().map_err(BenchError::Pin)?;
            written?;
            Ok(Tick::Committed)
        } else {
            for (i, byte) in self.data.iter_mut().enumerate() {
                *byte = (i as u8).wrapping_add(self.ticks);
            }
            Ok(Tick::Regenerated)
        }
    }
}

impl Default for Workload {
    fn default() -> Self {
        Self::new()
    }
}
