//! SysTick timer.

use crate::Reg;

/// SysTick registers.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    /// Control and status.
    pub csr: Reg,
    /// Reload value, 24 bits.
    pub rvr: Reg,
    /// Current value, 24 bits.
    pub cvr: Reg,
    /// Calibration value.
    pub calib: Reg,
}

layout!(RegisterBlock {
    csr: 0x0,
    rvr: 0x4,
    cvr: 0x8,
    calib: 0xc,
});

impl RegisterBlock {
    /// A detached block with every register zero.
    pub const fn new() -> Self {
        Self {
            csr: Reg::new(0),
            rvr: Reg::new(0),
            cvr: Reg::new(0),
            calib: Reg::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

pub mod csr {
    use crate::Field;

    pub const ENABLE: Field = Field::bit(0);
    pub const TICKINT: Field = Field::bit(1);
    /// Set is the processor clock, clear is the processor clock / 8.
    pub const CLKSOURCE: Field = Field::bit(2);
    /// Set when the counter reached zero since the last read.
    pub const COUNTFLAG: Field = Field::bit(16);
}

pub mod rvr {
    use crate::Field;

    pub const RELOAD: Field = Field::new(0, 24);
}
