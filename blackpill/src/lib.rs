#![no_std]

//! Support for the STM32F401 "Black Pill" board.
//!
//! The board wires a user LED to PC13, a user button to PA0, and brings
//! USART1 out on PA9 (TX) and PA10 (RX).

pub mod prelude;

/// HAL crate, providing structured access to peripherals.
pub use stm32f401_hal as hal;

/// Peripheral access crate, providing raw, unconstrained access to peripherals.
pub use hal::pac;

pub mod button;
pub mod led;
pub mod link;
pub mod uart;

#[cfg(feature = "defmt-logger")]
pub mod defmt_logger;
