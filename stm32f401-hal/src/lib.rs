#![cfg_attr(not(test), no_std)]

//! Typed drivers for the STM32F401.
//!
//! Every driver is a thin handle over one register block. Handles built
//! from a peripheral token (or from a port letter / instance number) bind
//! to the silicon; `from_registers` binds any block, which lets the same
//! code run against memory in tests.
//!
//! All waiting is a busy-wait on a status bit with no timeout. A
//! peripheral that never answers hangs the caller, which is the intended
//! behaviour for a bare-metal control loop: there is no safer place to
//! go.

pub mod prelude;

/// Peripheral access crate, providing raw, unconstrained access to
/// peripherals.
pub use stm32f401 as pac;

pub mod block;
pub mod flash;
pub mod gpio;
pub mod nvic;
pub mod rcc;
pub mod time;
pub mod timer;
pub mod usart;
