//! Interfaces for USART1.
//!
//! Three layers must all be set up before bytes move reliably: the pins
//! (alternate function, output type), the peripheral ([Usart::configure]
//! and [Usart::enable_usart]), and each direction ([Tx::enable],
//! [Rx::enable]). None of them implies another.
//!
//! [Tx] and [Rx] share the status and data registers with the [Usart]
//! they came from. Each one only reads its own status bits.

mod config;
pub use config::*;

mod hal1;

mod port;
pub use port::*;

mod rx;
pub use rx::*;

mod tx;
pub use tx::*;

/// A USART error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Requested baud rate is not achievable from this clock.
    BaudOutOfRange,
    /// A byte arrived before the previous one was read.
    Overrun,
    /// Noise detected on a received byte.
    Noise,
    /// Stop bit missing on a received byte.
    Framing,
    /// Parity check failed on a received byte.
    Parity,
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "USART Error {:?}", self)
    }
}
