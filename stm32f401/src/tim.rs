//! General-purpose timers TIM2 to TIM5.

use crate::Reg;

/// Address of TIM2.
pub const BASE: usize = 0x4000_0000;

/// Distance between consecutive instances.
pub const STRIDE: usize = 0x400;

/// Pointer to TIM`n`, valid for `n` in 2..=5.
#[inline(always)]
pub const fn instance_ptr(n: u8) -> *const RegisterBlock {
    (BASE + (n as usize - 2) * STRIDE) as *const _
}

/// General-purpose timer registers.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    pub cr1: Reg,
    pub cr2: Reg,
    /// Slave mode control.
    pub smcr: Reg,
    /// DMA / interrupt enable.
    pub dier: Reg,
    pub sr: Reg,
    /// Event generation.
    pub egr: Reg,
    pub ccmr1: Reg,
    pub ccmr2: Reg,
    pub ccer: Reg,
    /// Counter.
    pub cnt: Reg,
    /// Prescaler, 16 bits on every instance.
    pub psc: Reg,
    /// Auto-reload.
    pub arr: Reg,
    // repetition counter, advanced timers only
    _reserved0: u32,
    pub ccr1: Reg,
    pub ccr2: Reg,
    pub ccr3: Reg,
    pub ccr4: Reg,
    _reserved1: u32,
    pub dcr: Reg,
    pub dmar: Reg,
    /// Option register, TIM2 and TIM5 only.
    pub or: Reg,
}

layout!(RegisterBlock {
    cr1: 0x00,
    cr2: 0x04,
    smcr: 0x08,
    dier: 0x0c,
    sr: 0x10,
    egr: 0x14,
    ccmr1: 0x18,
    ccmr2: 0x1c,
    ccer: 0x20,
    cnt: 0x24,
    psc: 0x28,
    arr: 0x2c,
    ccr1: 0x34,
    ccr2: 0x38,
    ccr3: 0x3c,
    ccr4: 0x40,
    dcr: 0x48,
    dmar: 0x4c,
    or: 0x50,
});

impl RegisterBlock {
    /// A detached block with every register zero.
    pub const fn new() -> Self {
        Self {
            cr1: Reg::new(0),
            cr2: Reg::new(0),
            smcr: Reg::new(0),
            dier: Reg::new(0),
            sr: Reg::new(0),
            egr: Reg::new(0),
            ccmr1: Reg::new(0),
            ccmr2: Reg::new(0),
            ccer: Reg::new(0),
            cnt: Reg::new(0),
            psc: Reg::new(0),
            arr: Reg::new(0),
            _reserved0: 0,
            ccr1: Reg::new(0),
            ccr2: Reg::new(0),
            ccr3: Reg::new(0),
            ccr4: Reg::new(0),
            _reserved1: 0,
            dcr: Reg::new(0),
            dmar: Reg::new(0),
            or: Reg::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

pub mod cr1 {
    use crate::Field;

    /// Counter enable.
    pub const CEN: Field = Field::bit(0);
    pub const UDIS: Field = Field::bit(1);
    pub const URS: Field = Field::bit(2);
    pub const OPM: Field = Field::bit(3);
    pub const DIR: Field = Field::bit(4);
    pub const ARPE: Field = Field::bit(7);
}

pub mod sr {
    use crate::Field;

    /// Update interrupt flag.
    pub const UIF: Field = Field::bit(0);
}

pub mod egr {
    use crate::Field;

    /// Update generation.
    pub const UG: Field = Field::bit(0);
}
