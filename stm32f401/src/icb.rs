//! Implementation control block.

use crate::Reg;

/// The part of the system control space ahead of SysTick.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    _reserved0: u32,
    /// Interrupt controller type.
    pub ictr: Reg,
    /// Auxiliary control.
    pub actlr: Reg,
}

layout!(RegisterBlock {
    ictr: 0x4,
    actlr: 0x8,
});

impl RegisterBlock {
    /// A detached block with every register zero.
    pub const fn new() -> Self {
        Self {
            _reserved0: 0,
            ictr: Reg::new(0),
            actlr: Reg::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

pub mod ictr {
    use crate::Field;

    /// Number of implemented interrupt lines, in groups of 32, minus one.
    pub const INTLINESNUM: Field = Field::new(0, 4);
}
