//! Embedded flash interface.

use crate::Reg;

/// Embedded flash interface registers.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    /// Access control.
    pub acr: Reg,
    /// Key, unlocks CR.
    pub keyr: Reg,
    /// Option key, unlocks OPTCR.
    pub optkeyr: Reg,
    /// Status.
    pub sr: Reg,
    /// Control.
    pub cr: Reg,
    /// Option control.
    pub optcr: Reg,
}

layout!(RegisterBlock {
    acr: 0x00,
    keyr: 0x04,
    optkeyr: 0x08,
    sr: 0x0c,
    cr: 0x10,
    optcr: 0x14,
});

impl RegisterBlock {
    /// A detached block with every register zero.
    pub const fn new() -> Self {
        Self {
            acr: Reg::new(0),
            keyr: Reg::new(0),
            optkeyr: Reg::new(0),
            sr: Reg::new(0),
            cr: Reg::new(0),
            optcr: Reg::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Unlock sequence for CR, written in order.
pub const KEYS: [u32; 2] = [0x4567_0123, 0xcdef_89ab];

/// Unlock sequence for OPTCR, written in order.
pub const OPT_KEYS: [u32; 2] = [0x0819_2a3b, 0x4c5d_6e7f];

pub mod acr {
    use crate::Field;

    pub const LATENCY: Field = Field::new(0, 4);
    pub const PRFTEN: Field = Field::bit(8);
    pub const ICEN: Field = Field::bit(9);
    pub const DCEN: Field = Field::bit(10);
}

pub mod sr {
    use crate::Field;

    pub const EOP: Field = Field::bit(0);
    pub const OPERR: Field = Field::bit(1);
    pub const WRPERR: Field = Field::bit(4);
    pub const PGAERR: Field = Field::bit(5);
    pub const PGPERR: Field = Field::bit(6);
    pub const PGSERR: Field = Field::bit(7);
    pub const RDERR: Field = Field::bit(8);
    pub const BSY: Field = Field::bit(16);
}

pub mod cr {
    use crate::Field;

    pub const PG: Field = Field::bit(0);
    pub const SER: Field = Field::bit(1);
    pub const MER: Field = Field::bit(2);
    pub const SNB: Field = Field::new(3, 4);
    pub const PSIZE: Field = Field::new(8, 2);
    pub const STRT: Field = Field::bit(16);
    pub const EOPIE: Field = Field::bit(24);
    pub const ERRIE: Field = Field::bit(25);
    /// Reads as set while the interface refuses control changes.
    pub const LOCK: Field = Field::bit(31);
}
