//! General-purpose I/O.

use crate::Reg;

/// Address of port A.
pub const BASE: usize = 0x4002_0000;

/// Distance between consecutive ports.
pub const STRIDE: usize = 0x400;

/// Pointer to the port at `index`, where A is 0.
///
/// Only indices 0..=4 and 7 name ports that exist on this device.
#[inline(always)]
pub const fn port_ptr(index: u8) -> *const RegisterBlock {
    (BASE + index as usize * STRIDE) as *const _
}

/// GPIO port registers.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    /// Mode, 2 bits per pin.
    pub moder: Reg,
    /// Output type, 1 bit per pin.
    pub otyper: Reg,
    /// Output speed, 2 bits per pin.
    pub ospeedr: Reg,
    /// Pull-up / pull-down, 2 bits per pin.
    pub pupdr: Reg,
    /// Input data.
    pub idr: Reg,
    /// Output data.
    pub odr: Reg,
    /// Bit set / reset.
    pub bsrr: Reg,
    /// Configuration lock.
    pub lckr: Reg,
    /// Alternate function, pins 0..=7, 4 bits per pin.
    pub afrl: Reg,
    /// Alternate function, pins 8..=15, 4 bits per pin.
    pub afrh: Reg,
}

layout!(RegisterBlock {
    moder: 0x00,
    otyper: 0x04,
    ospeedr: 0x08,
    pupdr: 0x0c,
    idr: 0x10,
    odr: 0x14,
    bsrr: 0x18,
    lckr: 0x1c,
    afrl: 0x20,
    afrh: 0x24,
});

impl RegisterBlock {
    /// A detached block with every register zero.
    pub const fn new() -> Self {
        Self {
            moder: Reg::new(0),
            otyper: Reg::new(0),
            ospeedr: Reg::new(0),
            pupdr: Reg::new(0),
            idr: Reg::new(0),
            odr: Reg::new(0),
            bsrr: Reg::new(0),
            lckr: Reg::new(0),
            afrl: Reg::new(0),
            afrh: Reg::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-pin field shapes. Use [Field::at](crate::Field::at) with the pin
/// number (or `pin - 8` for AFRH).
pub mod pin {
    use crate::Field;

    pub const MODE: Field = Field::new(0, 2);
    pub const OTYPE: Field = Field::new(0, 1);
    pub const OSPEED: Field = Field::new(0, 2);
    pub const PUPD: Field = Field::new(0, 2);
    pub const DATA: Field = Field::new(0, 1);
    pub const AF: Field = Field::new(0, 4);
}
