//! Flash self-programming for ATmega128 class AVR devices.
//!
//! Erases and rewrites program memory pages through the SPM instruction,
//! with a one-page staging buffer and RAMPZ bank selection for the upper
//! 64KB. All register access goes through the traits in [`hal`], so the
//! drivers run unchanged against [`hal::SimulatedFlash`] on the host.
//!
//! ```
//! use atmega128_spm::{config::Geometry, hal::SimulatedFlash, SelfFlash};
//!
//! let mut flash = SelfFlash::with_geometry(SimulatedFlash::new(), Geometry::ATMEGA128);
//! flash.write_page(50, &[0u8; 10]).unwrap();
//! assert_eq!(flash.hw().page(50)[10], 0xFF);
//! ```
#![cfg_attr(not(test), no_std)]

pub mod bench;
pub mod config;
pub mod critical;
pub mod drivers;
pub mod error;
pub mod hal;

pub use drivers::SelfFlash;
pub use error::{Result, SpmError};
