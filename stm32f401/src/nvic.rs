//! Nested vectored interrupt controller.

use crate::Reg;

/// Words in each of the bit-per-line arrays.
pub const WORDS: usize = 16;

/// Words in the byte-per-line priority array.
pub const PRIORITY_WORDS: usize = 124;

/// NVIC registers.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    /// Set-enable.
    pub iser: [Reg; WORDS],
    _reserved0: [u32; 16],
    /// Clear-enable.
    pub icer: [Reg; WORDS],
    _reserved1: [u32; 16],
    /// Set-pending.
    pub ispr: [Reg; WORDS],
    _reserved2: [u32; 16],
    /// Clear-pending.
    pub icpr: [Reg; WORDS],
    _reserved3: [u32; 16],
    /// Active bit, read only.
    pub iabr: [Reg; WORDS],
    _reserved4: [u32; 48],
    /// Priority, one byte per line.
    pub ipr: [Reg; PRIORITY_WORDS],
    _reserved5: [u32; 580],
    /// Software trigger.
    pub stir: Reg,
}

layout!(RegisterBlock {
    iser: 0x000,
    icer: 0x080,
    ispr: 0x100,
    icpr: 0x180,
    iabr: 0x200,
    ipr: 0x300,
    stir: 0xe00,
});

impl RegisterBlock {
    const ZERO: Reg = Reg::new(0);

    /// A detached block with every register zero.
    pub const fn new() -> Self {
        Self {
            iser: [Self::ZERO; WORDS],
            _reserved0: [0; 16],
            icer: [Self::ZERO; WORDS],
            _reserved1: [0; 16],
            ispr: [Self::ZERO; WORDS],
            _reserved2: [0; 16],
            icpr: [Self::ZERO; WORDS],
            _reserved3: [0; 16],
            iabr: [Self::ZERO; WORDS],
            _reserved4: [0; 48],
            ipr: [Self::ZERO; PRIORITY_WORDS],
            _reserved5: [0; 580],
            stir: Self::ZERO,
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

pub mod ipr {
    use crate::Field;

    /// One line's priority byte, repeated four times per word.
    pub const PRIORITY: Field = Field::new(0, 8);
}

pub mod stir {
    use crate::Field;

    pub const INTID: Field = Field::new(0, 9);
}
