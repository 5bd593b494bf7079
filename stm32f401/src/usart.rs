//! Universal synchronous/asynchronous receiver transmitter.

use crate::Reg;

/// USART registers.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    /// Status, shared by both directions.
    pub sr: Reg,
    /// Data, shared by both directions.
    pub dr: Reg,
    /// Baud rate divisor.
    pub brr: Reg,
    pub cr1: Reg,
    pub cr2: Reg,
    pub cr3: Reg,
    /// Guard time and prescaler.
    pub gtpr: Reg,
}

layout!(RegisterBlock {
    sr: 0x00,
    dr: 0x04,
    brr: 0x08,
    cr1: 0x0c,
    cr2: 0x10,
    cr3: 0x14,
    gtpr: 0x18,
});

impl RegisterBlock {
    /// A detached block with every register zero.
    pub const fn new() -> Self {
        Self {
            sr: Reg::new(0),
            dr: Reg::new(0),
            brr: Reg::new(0),
            cr1: Reg::new(0),
            cr2: Reg::new(0),
            cr3: Reg::new(0),
            gtpr: Reg::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

pub mod sr {
    use crate::Field;

    /// Parity error.
    pub const PE: Field = Field::bit(0);
    /// Framing error.
    pub const FE: Field = Field::bit(1);
    /// Noise detected.
    pub const NF: Field = Field::bit(2);
    /// Overrun error.
    pub const ORE: Field = Field::bit(3);
    pub const IDLE: Field = Field::bit(4);
    /// Read data register not empty.
    pub const RXNE: Field = Field::bit(5);
    /// Transmission complete.
    pub const TC: Field = Field::bit(6);
    /// Transmit data register empty.
    pub const TXE: Field = Field::bit(7);
    /// LIN break detected.
    pub const LBD: Field = Field::bit(8);
    pub const CTS: Field = Field::bit(9);
}

pub mod dr {
    use crate::Field;

    pub const DR: Field = Field::new(0, 9);
}

pub mod brr {
    use crate::Field;

    pub const DIV_FRACTION: Field = Field::new(0, 4);
    pub const DIV_MANTISSA: Field = Field::new(4, 12);
}

pub mod cr1 {
    use crate::Field;

    /// Send break.
    pub const SBK: Field = Field::bit(0);
    /// Receiver wakeup (mute).
    pub const RWU: Field = Field::bit(1);
    /// Receiver enable.
    pub const RE: Field = Field::bit(2);
    /// Transmitter enable.
    pub const TE: Field = Field::bit(3);
    pub const IDLEIE: Field = Field::bit(4);
    pub const RXNEIE: Field = Field::bit(5);
    pub const TCIE: Field = Field::bit(6);
    pub const TXEIE: Field = Field::bit(7);
    pub const PEIE: Field = Field::bit(8);
    /// Parity selection, set is odd.
    pub const PS: Field = Field::bit(9);
    /// Parity control enable.
    pub const PCE: Field = Field::bit(10);
    /// Wakeup method, set is address mark.
    pub const WAKE: Field = Field::bit(11);
    /// Word length, set is 9 data bits.
    pub const M: Field = Field::bit(12);
    /// USART enable.
    pub const UE: Field = Field::bit(13);
    pub const OVER8: Field = Field::bit(15);
}

pub mod cr2 {
    use crate::Field;

    pub const STOP: Field = Field::new(12, 2);
    /// LIN mode enable.
    pub const LINEN: Field = Field::bit(14);
}

pub mod cr3 {
    use crate::Field;

    /// Smartcard mode enable.
    pub const SCEN: Field = Field::bit(5);
    pub const DMAR: Field = Field::bit(6);
    pub const DMAT: Field = Field::bit(7);
}
