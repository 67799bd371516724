use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");

    // Host builds (tests, the simulator) need none of the AVR link setup
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    // Boot section start (byte address) at the largest BOOTSZ setting
    let (mcu, boot_start) = if env::var("CARGO_FEATURE_ATMEGA64").is_ok() {
        ("atmega64", 0xE000)
    } else {
        ("atmega128", 0x1E000)
    };
    println!("cargo:rustc-link-arg=-mmcu={}", mcu);
    println!("cargo:rustc-link-arg=-Wl,--section-start=.bootloader={:#x}", boot_start);
    println!("cargo:warning=Building for {} at 16MHz", mcu);
}
