use avr_device::atmega128a::{PORTA, PORTB, PORTC, PORTD, PORTE, PORTF};
use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_hal::digital::v2::OutputPin;

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// DDR and PORT register access for one I/O port
pub trait PortRegisters {
    fn set_ddr_bits(mask: u8);
    fn set_port_bits(mask: u8);
    fn clear_port_bits(mask: u8);
}

macro_rules! impl_port {
    ($PORT:ident, $ddr:ident, $port:ident) => {
        impl PortRegisters for $PORT {
            #[inline]
            fn set_ddr_bits(mask: u8) {
                unsafe { (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | mask)) }
            }

            #[inline]
            fn set_port_bits(mask: u8) {
                unsafe { (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | mask)) }
            }

            #[inline]
            fn clear_port_bits(mask: u8) {
                unsafe { (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !mask)) }
            }
        }
    };
}

impl_port!(PORTA, ddra, porta);
impl_port!(PORTB, ddrb, portb);
impl_port!(PORTC, ddrc, portc);
impl_port!(PORTD, ddrd, portd);
impl_port!(PORTE, ddre, porte);
impl_port!(PORTF, ddrf, portf);

#[derive(Debug)]
pub struct Pin<PORT, const P: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT: PortRegisters, const P: u8> Pin<PORT, P, Input> {
    /// Pins come out of reset as inputs.
    pub fn new() -> Self {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

impl<PORT: PortRegisters, const P: u8, MODE: PinMode> Pin<PORT, P, MODE> {
    pub fn into_output(self) -> Pin<PORT, P, Output> {
        PORT::set_ddr_bits(1 << P);
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

impl<PORT: PortRegisters, const P: u8> OutputPin for Pin<PORT, P, Output> {
    type Error = Infallible;

    #[inline]
    fn set_high(&mut self) -> Result<(), Infallible> {
        PORT::set_port_bits(1 << P);
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Infallible> {
        PORT::clear_port_bits(1 << P);
        Ok(())
    }
}

pub mod board {
    use super::*;

    /// Scope trigger, high while a page commit runs
    pub type TRIGGER = Pin<PORTC, 1, Output>;

    // Status LEDs (PORTA, active low)
    pub type LED0 = Pin<PORTA, 0, Output>;
    pub type LED1 = Pin<PORTA, 1, Output>;
    pub type LED2 = Pin<PORTA, 2, Output>;
}
