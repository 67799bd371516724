//! Page write timing bench for ATmega128.
//!
//! Every `BENCH_TICK_MS` the workload either commits its data to the bench
//! page (trigger pin PC1 high for the duration) or regenerates the data.
#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
use {
    atmega128_spm::bench::{BenchError, Tick, Workload},
    atmega128_spm::config::{BENCH_PAGE, BENCH_TICK_MS},
    atmega128_spm::drivers::{SelfFlash, SerialConsole},
    atmega128_spm::hal::{board, delay_ms, Cpu, Pin},
    avr_device::interrupt::{self, Mutex},
    core::cell::RefCell,
    embedded_hal::digital::v2::OutputPin,
};

// Shared with any interrupt handler that wants to commit pages
#[cfg(target_arch = "avr")]
static FLASH: Mutex<RefCell<Option<SelfFlash<Cpu>>>> = Mutex::new(RefCell::new(None));

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    let mut console = SerialConsole::new();
    let mut trigger: board::TRIGGER = Pin::new().into_output();
    let mut error_led: board::LED2 = Pin::new().into_output();
    trigger.set_low().ok();
    error_led.set_high().ok();

    interrupt::free(|cs| {
        FLASH.borrow(cs).replace(Some(SelfFlash::new(Cpu::new())));
    });

    // Enable interrupts globally
    unsafe { interrupt::enable() };

    ufmt::uwriteln!(&mut console, "SPM bench, page {}", BENCH_PAGE).ok();

    let mut workload = Workload::new();

    loop {
        delay_ms(BENCH_TICK_MS);

        let result = interrupt::free(|cs| {
            FLASH
                .borrow(cs)
                .borrow_mut()
                .as_mut()
                .map(|flash| workload.tick(flash, &mut trigger))
        });

        match result {
            Some(Ok(Tick::Committed)) => {
                ufmt::uwriteln!(&mut console, "committed tick {}", workload.ticks()).ok();
            }
            Some(Ok(Tick::Regenerated)) => {}
            Some(Err(BenchError::Flash(err))) => {
                error_led.set_low().ok();
                ufmt::uwriteln!(&mut console, "flash error: {}", err).ok();
            }
            Some(Err(BenchError::Pin(never))) => match never {},
            None => console.write_line("flash not initialised"),
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    println!("flash_bench runs on ATmega128 only; build with an AVR target");
}
