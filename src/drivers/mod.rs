pub mod bank;
pub mod pgmspace;
pub mod programmer;
pub mod self_flash;
pub mod staging;

#[cfg(target_arch = "avr")]
pub mod serial_console;

pub use programmer::PageProgrammer;
pub use self_flash::SelfFlash;
pub use staging::StagingBuffer;

#[cfg(target_arch = "avr")]
pub use serial_console::SerialConsole;
