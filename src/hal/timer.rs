use avr_device::atmega128a::TC0;

use crate::config::CPU_FREQ_HZ;

/// TC0 clock select values (ATmega128 TC0 has its own prescaler table)
#[derive(Clone, Copy)]
#[repr(u8)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div32 = 3,
    Div64 = 4,
    Div128 = 5,
    Div256 = 6,
    Div1024 = 7,
}

const PRESCALER_MASK: u8 = 0x07;

/// Timer ticks per millisecond at clk/64
const TICKS_PER_MS: u8 = (CPU_FREQ_HZ / 64 / 1000) as u8;

pub struct Timer0 {
    _private: (),
}

impl Timer0 {
    pub fn new() -> Self {
        unsafe {
            // Normal mode, stopped
            let p = TC0::ptr();
            (*p).tccr0.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
        }
        Self { _private: () }
    }

    pub fn start(&mut self, prescaler: Prescaler) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0.modify(|r, w| w.bits((r.bits() & !PRESCALER_MASK) | prescaler as u8));
        }
    }

    pub fn stop(&mut self) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0.modify(|r, w| w.bits(r.bits() & !PRESCALER_MASK));
        }
    }

    pub fn set_counter(&mut self, value: u8) {
        unsafe { (*TC0::ptr()).tcnt0.write(|w| w.bits(value)) }
    }

    pub fn get_counter(&self) -> u8 {
        unsafe { (*TC0::ptr()).tcnt0.read().bits() }
    }
}

impl Default for Timer0 {
    fn default() -> Self {
        Self::new()
    }
}

// Millisecond delay using Timer0
pub fn delay_ms(ms: u16) {
    let mut timer = Timer0::new();

    // 16MHz/64 = 250kHz, 250 ticks = 1ms
    timer.set_counter(0);
    timer.start(Prescaler::Div64);

    for _ in 0..ms {
        while timer.get_counter() < TICKS_PER_MS {}
        timer.set_counter(0);
    }

    timer.stop();
}
