use avr_device::atmega128a::USART0;
use core::convert::Infallible;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

/// Polled USART0 console
pub struct SerialConsole {
    _private: (),
}

impl SerialConsole {
    pub fn new() -> Self {
        unsafe {
            let p = USART0::ptr();
            (*p).ubrr0h.write(|w| w.bits((UBRR >> 8) as u8));
            (*p).ubrr0l.write(|w| w.bits(UBRR as u8));
            (*p).ucsr0b.modify(|_, w| w.txen0().set_bit().rxen0().set_bit());
        }
        Self { _private: () }
    }

    pub fn write_byte(&mut self, byte: u8) {
        unsafe {
            let p = USART0::ptr();
            while (*p).ucsr0a.read().udre0().bit_is_clear() {}
            (*p).udr0.write(|w| w.bits(byte));
        }
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        unsafe {
            let p = USART0::ptr();
            if (*p).ucsr0a.read().rxc0().bit_is_set() {
                Some((*p).udr0.read().bits())
            } else {
                None
            }
        }
    }

    pub fn write_line(&mut self, s: &str) {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        self.write_byte(b'\r');
        self.write_byte(b'\n');
    }
}

impl Default for SerialConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ufmt::uWrite for SerialConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}
