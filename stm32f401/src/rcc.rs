//! Reset and clock control.

use crate::Reg;

/// Reset and clock control registers.
#[repr(C)]
#[derive(Debug)]
pub struct RegisterBlock {
    /// Clock control.
    pub cr: Reg,
    /// PLL configuration.
    pub pllcfgr: Reg,
    /// Clock configuration.
    pub cfgr: Reg,
    /// Clock interrupt.
    pub cir: Reg,
    pub ahb1rstr: Reg,
    pub ahb2rstr: Reg,
    _reserved0: [u32; 2],
    pub apb1rstr: Reg,
    pub apb2rstr: Reg,
    _reserved1: [u32; 2],
    /// AHB1 peripheral clock enable.
    pub ahb1enr: Reg,
    pub ahb2enr: Reg,
    _reserved2: [u32; 2],
    /// APB1 peripheral clock enable.
    pub apb1enr: Reg,
    /// APB2 peripheral clock enable.
    pub apb2enr: Reg,
    _reserved3: [u32; 2],
    pub ahb1lpenr: Reg,
    pub ahb2lpenr: Reg,
    _reserved4: [u32; 2],
    pub apb1lpenr: Reg,
    pub apb2lpenr: Reg,
    _reserved5: [u32; 2],
    /// Backup domain control.
    pub bdcr: Reg,
    /// Clock control and status.
    pub csr: Reg,
    _reserved6: [u32; 2],
    pub sscgr: Reg,
    pub plli2scfgr: Reg,
    _reserved7: u32,
    pub dckcfgr: Reg,
}

layout!(RegisterBlock {
    cr: 0x00,
    pllcfgr: 0x04,
    cfgr: 0x08,
    cir: 0x0c,
    ahb1rstr: 0x10,
    apb1rstr: 0x20,
    ahb1enr: 0x30,
    apb1enr: 0x40,
    apb2enr: 0x44,
    ahb1lpenr: 0x50,
    apb1lpenr: 0x60,
    bdcr: 0x70,
    csr: 0x74,
    sscgr: 0x80,
    plli2scfgr: 0x84,
    dckcfgr: 0x8c,
});

impl RegisterBlock {
    /// A detached block with every register zero.
    pub const fn new() -> Self {
        Self {
            cr: Reg::new(0),
            pllcfgr: Reg::new(0),
            cfgr: Reg::new(0),
            cir: Reg::new(0),
            ahb1rstr: Reg::new(0),
            ahb2rstr: Reg::new(0),
            _reserved0: [0; 2],
            apb1rstr: Reg::new(0),
            apb2rstr: Reg::new(0),
            _reserved1: [0; 2],
            ahb1enr: Reg::new(0),
            ahb2enr: Reg::new(0),
            _reserved2: [0; 2],
            apb1enr: Reg::new(0),
            apb2enr: Reg::new(0),
            _reserved3: [0; 2],
            ahb1lpenr: Reg::new(0),
            ahb2lpenr: Reg::new(0),
            _reserved4: [0; 2],
            apb1lpenr: Reg::new(0),
            apb2lpenr: Reg::new(0),
            _reserved5: [0; 2],
            bdcr: Reg::new(0),
            csr: Reg::new(0),
            _reserved6: [0; 2],
            sscgr: Reg::new(0),
            plli2scfgr: Reg::new(0),
            _reserved7: 0,
            dckcfgr: Reg::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

pub mod cr {
    use crate::Field;

    pub const HSION: Field = Field::bit(0);
    pub const HSIRDY: Field = Field::bit(1);
    pub const HSEON: Field = Field::bit(16);
    pub const HSERDY: Field = Field::bit(17);
    pub const HSEBYP: Field = Field::bit(18);
    pub const CSSON: Field = Field::bit(19);
    pub const PLLON: Field = Field::bit(24);
    pub const PLLRDY: Field = Field::bit(25);
}

pub mod pllcfgr {
    use crate::Field;

    pub const PLLM: Field = Field::new(0, 6);
    pub const PLLN: Field = Field::new(6, 9);
    pub const PLLP: Field = Field::new(16, 2);
    /// Clear selects HSI, set selects HSE.
    pub const PLLSRC: Field = Field::bit(22);
    pub const PLLQ: Field = Field::new(24, 4);
}

pub mod cfgr {
    use crate::Field;

    /// System clock switch.
    pub const SW: Field = Field::new(0, 2);
    /// System clock switch status.
    pub const SWS: Field = Field::new(2, 2);
    pub const HPRE: Field = Field::new(4, 4);
    pub const PPRE1: Field = Field::new(10, 3);
    pub const PPRE2: Field = Field::new(13, 3);

    /// SW / SWS codes.
    pub const SW_HSI: u32 = 0b00;
    pub const SW_HSE: u32 = 0b01;
    pub const SW_PLL: u32 = 0b10;
}

pub mod ahb1enr {
    use crate::Field;

    pub const GPIOAEN: Field = Field::bit(0);
    pub const GPIOBEN: Field = Field::bit(1);
    pub const GPIOCEN: Field = Field::bit(2);
    pub const GPIODEN: Field = Field::bit(3);
    pub const GPIOEEN: Field = Field::bit(4);
    pub const GPIOHEN: Field = Field::bit(7);
}

pub mod apb1enr {
    use crate::Field;

    pub const TIM2EN: Field = Field::bit(0);
    pub const TIM3EN: Field = Field::bit(1);
    pub const TIM4EN: Field = Field::bit(2);
    pub const TIM5EN: Field = Field::bit(3);
}

pub mod apb2enr {
    use crate::Field;

    pub const USART1EN: Field = Field::bit(4);
}
