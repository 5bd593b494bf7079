//! Peripheral access crate for the STM32F401.
//!
//! Each peripheral is a `#[repr(C)]` [RegisterBlock](rcc::RegisterBlock)
//! laid out exactly as in the reference manual, plus a zero-sized token
//! that dereferences to the block at its fixed physical address. Bit
//! positions live next to each block as [Field] constants.
//!
//! Register blocks can also be built in ordinary memory with
//! `RegisterBlock::new()`, which is how the HAL tests simulate silicon.
#![no_std]

use core::marker::PhantomData;
use core::ops::Deref;

use vcell::VolatileCell;

// checks a block's field offsets against the reference manual at compile
// time
macro_rules! layout {
    ($block:ty { $($field:ident: $offset:expr),* $(,)? }) => {
        const _: () = {
            $(assert!(core::mem::offset_of!($block, $field) == $offset);)*
        };
    };
}

pub mod flash;
pub mod gpio;
pub mod icb;
pub mod nvic;
pub mod rcc;
pub mod syst;
pub mod tim;
pub mod usart;

/// A named range of bits inside a 32-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    offset: u8,
    width: u8,
}

impl Field {
    /// A field of `width` bits starting at bit `offset`.
    #[inline(always)]
    pub const fn new(offset: u8, width: u8) -> Self {
        Self { offset, width }
    }

    /// A single-bit field.
    #[inline(always)]
    pub const fn bit(offset: u8) -> Self {
        Self::new(offset, 1)
    }

    /// The `index`th repetition of this field, for per-pin or per-line
    /// arrays packed into one word (MODER, PUPDR, IPR, ...).
    #[inline(always)]
    pub const fn at(self, index: u8) -> Self {
        Self::new(self.offset + index * self.width, self.width)
    }

    #[inline(always)]
    pub const fn offset(&self) -> u8 {
        self.offset
    }

    #[inline(always)]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// The bits this field covers, in place.
    #[inline(always)]
    pub const fn mask(&self) -> u32 {
        (((1u64 << self.width) - 1) as u32) << self.offset
    }

    /// Replace this field inside `word`, leaving every other bit alone.
    ///
    /// `value` is truncated to the field width.
    #[inline(always)]
    pub const fn insert(&self, word: u32, value: u32) -> u32 {
        (word & !self.mask()) | ((value << self.offset) & self.mask())
    }

    /// Pull this field out of `word`.
    #[inline(always)]
    pub const fn extract(&self, word: u32) -> u32 {
        (word & self.mask()) >> self.offset
    }
}

/// One 32-bit memory-mapped register.
#[repr(transparent)]
pub struct Reg(VolatileCell<u32>);

// safety: every access is a single volatile word load or store. Keeping
// read-modify-write sequences from racing is left to the owner of the
// handle, same as on the silicon.
unsafe impl Sync for Reg {}

impl Reg {
    /// A detached register holding `value`.
    #[inline(always)]
    pub const fn new(value: u32) -> Self {
        Self(VolatileCell::new(value))
    }

    #[inline(always)]
    pub fn read(&self) -> u32 {
        self.0.get()
    }

    #[inline(always)]
    pub fn write(&self, value: u32) {
        self.0.set(value)
    }

    #[inline(always)]
    pub fn modify(&self, f: impl FnOnce(u32) -> u32) {
        self.write(f(self.read()))
    }

    /// Set every bit of `field`.
    #[inline(always)]
    pub fn set(&self, field: Field) {
        self.modify(|r| r | field.mask())
    }

    /// Clear every bit of `field`.
    #[inline(always)]
    pub fn clear(&self, field: Field) {
        self.modify(|r| r & !field.mask())
    }

    /// Is any bit of `field` set?
    #[inline(always)]
    pub fn is_set(&self, field: Field) -> bool {
        self.read() & field.mask() != 0
    }

    /// Clear `field`, then OR in `value`.
    #[inline(always)]
    pub fn write_field(&self, field: Field, value: u32) {
        self.modify(|r| field.insert(r, value))
    }

    #[inline(always)]
    pub fn read_field(&self, field: Field) -> u32 {
        field.extract(self.read())
    }
}

impl core::fmt::Debug for Reg {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:#010x}", self.read())
    }
}

macro_rules! peripheral {
    ($(#[$meta:meta])* $name:ident, $module:ident, $addr:expr) => {
        $(#[$meta])*
        pub struct $name {
            _marker: PhantomData<*const ()>,
        }

        unsafe impl Send for $name {}

        impl $name {
            /// Pointer to the register block.
            pub const PTR: *const $module::RegisterBlock = $addr as *const _;

            /// Return the pointer to the register block.
            #[inline(always)]
            pub const fn ptr() -> *const $module::RegisterBlock {
                Self::PTR
            }

            /// Steal an instance of this peripheral.
            ///
            /// # Safety
            /// Ensure that the new instance of the peripheral cannot be
            /// used in a way that may race with any existing instances.
            #[inline(always)]
            pub unsafe fn steal() -> Self {
                Self {
                    _marker: PhantomData,
                }
            }
        }

        impl Deref for $name {
            type Target = $module::RegisterBlock;

            #[inline(always)]
            fn deref(&self) -> &Self::Target {
                // safety: the block lives at a fixed address for the
                // whole program
                unsafe { &*Self::PTR }
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                f.debug_struct(stringify!($name)).finish()
            }
        }

        #[cfg(feature = "defmt")]
        impl defmt::Format for $name {
            fn format(&self, f: defmt::Formatter) {
                defmt::write!(f, "{}", stringify!($name));
            }
        }
    };
}

peripheral!(
    /// Embedded flash interface.
    FLASH, flash, 0x4002_3c00
);
peripheral!(
    /// Reset and clock control.
    RCC, rcc, 0x4002_3800
);
peripheral!(
    /// General-purpose I/O port A.
    GPIOA, gpio, gpio::BASE
);
peripheral!(
    /// General-purpose I/O port B.
    GPIOB, gpio, gpio::BASE + gpio::STRIDE
);
peripheral!(
    /// General-purpose I/O port C.
    GPIOC, gpio, gpio::BASE + 2 * gpio::STRIDE
);
peripheral!(
    /// General-purpose I/O port D.
    GPIOD, gpio, gpio::BASE + 3 * gpio::STRIDE
);
peripheral!(
    /// General-purpose I/O port E.
    GPIOE, gpio, gpio::BASE + 4 * gpio::STRIDE
);
peripheral!(
    /// General-purpose I/O port H.
    GPIOH, gpio, gpio::BASE + 7 * gpio::STRIDE
);
peripheral!(
    /// General-purpose timer 2 (32-bit).
    TIM2, tim, tim::BASE
);
peripheral!(
    /// General-purpose timer 3 (16-bit).
    TIM3, tim, tim::BASE + tim::STRIDE
);
peripheral!(
    /// General-purpose timer 4 (16-bit).
    TIM4, tim, tim::BASE + 2 * tim::STRIDE
);
peripheral!(
    /// General-purpose timer 5 (32-bit).
    TIM5, tim, tim::BASE + 3 * tim::STRIDE
);
peripheral!(
    /// Universal synchronous/asynchronous receiver transmitter 1.
    USART1, usart, 0x4001_1000
);
peripheral!(
    /// Nested vectored interrupt controller.
    NVIC, nvic, 0xe000_e100
);
peripheral!(
    /// Implementation control block, holding the interrupt controller
    /// type register.
    ICB, icb, 0xe000_e000
);
peripheral!(
    /// System timer.
    SYST, syst, 0xe000_e010
);

// the singleton guard
static mut DEVICE_PERIPHERALS: bool = false;

/// All the peripherals.
#[allow(non_snake_case)]
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Peripherals {
    pub FLASH: FLASH,
    pub RCC: RCC,
    pub GPIOA: GPIOA,
    pub GPIOB: GPIOB,
    pub GPIOC: GPIOC,
    pub GPIOD: GPIOD,
    pub GPIOE: GPIOE,
    pub GPIOH: GPIOH,
    pub TIM2: TIM2,
    pub TIM3: TIM3,
    pub TIM4: TIM4,
    pub TIM5: TIM5,
    pub USART1: USART1,
    pub NVIC: NVIC,
    pub ICB: ICB,
    pub SYST: SYST,
}

impl Peripherals {
    /// Returns all the peripherals *once*.
    #[cfg(feature = "critical-section")]
    #[inline]
    pub fn take() -> Option<Self> {
        critical_section::with(|_| {
            // safety: we are inside a critical section
            if unsafe { DEVICE_PERIPHERALS } {
                return None;
            }
            Some(unsafe { Peripherals::steal() })
        })
    }

    /// Unchecked version of [Peripherals::take].
    ///
    /// # Safety
    /// Each of the returned peripherals must be used at most once.
    #[inline]
    pub unsafe fn steal() -> Self {
        DEVICE_PERIPHERALS = true;
        Peripherals {
            FLASH: FLASH::steal(),
            RCC: RCC::steal(),
            GPIOA: GPIOA::steal(),
            GPIOB: GPIOB::steal(),
            GPIOC: GPIOC::steal(),
            GPIOD: GPIOD::steal(),
            GPIOE: GPIOE::steal(),
            GPIOH: GPIOH::steal(),
            TIM2: TIM2::steal(),
            TIM3: TIM3::steal(),
            TIM4: TIM4::steal(),
            TIM5: TIM5::steal(),
            USART1: USART1::steal(),
            NVIC: NVIC::steal(),
            ICB: ICB::steal(),
            SYST: SYST::steal(),
        }
    }
}

/// Device interrupt lines, numbered as the NVIC sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum Interrupt {
    WWDG = 0,
    PVD = 1,
    TAMP_STAMP = 2,
    RTC_WKUP = 3,
    FLASH = 4,
    RCC = 5,
    EXTI0 = 6,
    EXTI1 = 7,
    EXTI2 = 8,
    EXTI3 = 9,
    EXTI4 = 10,
    EXTI9_5 = 23,
    TIM2 = 28,
    TIM3 = 29,
    TIM4 = 30,
    USART1 = 37,
    USART2 = 38,
    EXTI15_10 = 40,
    TIM5 = 50,
    USART6 = 71,
    FPU = 81,
}

impl Interrupt {
    /// The NVIC line number.
    #[inline(always)]
    pub const fn line(self) -> u16 {
        self as u16
    }
}

impl From<Interrupt> for u16 {
    #[inline(always)]
    fn from(value: Interrupt) -> Self {
        value.line()
    }
}
