//! Peripheral clock gates.
//!
//! Each peripheral family sits in its own enable register at its own bit,
//! so every peripheral gets its own `enable_*`, `disable_*` and
//! `is_*_enabled` method instead of one call keyed by an id.
//!
//! Gates are a plain read-modify-write of a shared enable register. Two
//! contexts must not flip gates in the same register at the same time.

use crate::pac::rcc::{ahb1enr, apb1enr, apb2enr};

use super::Rcc;

// way too much repitition to not use a macro
macro_rules! gates {
    {$(($dev:ident, $reg:ident, $bit:path)),+,} => {
        paste::paste! {
            impl Rcc<'_> {
                $(
                    #[doc = "Turn on the " $dev " clock."]
                    #[inline(always)]
                    pub fn [<enable_ $dev:lower>](&self) {
                        self.regs.$reg.set($bit);
                    }

                    #[doc = "Turn off the " $dev " clock."]
                    #[inline(always)]
                    pub fn [<disable_ $dev:lower>](&self) {
                        self.regs.$reg.clear($bit);
                    }

                    #[doc = "Is the " $dev " clock on?"]
                    #[inline(always)]
                    pub fn [<is_ $dev:lower _enabled>](&self) -> bool {
                        self.regs.$reg.is_set($bit)
                    }
                )+
            }
        }
    };
}

gates! {
    (GPIOA, ahb1enr, ahb1enr::GPIOAEN),
    (GPIOB, ahb1enr, ahb1enr::GPIOBEN),
    (GPIOC, ahb1enr, ahb1enr::GPIOCEN),
    (GPIOD, ahb1enr, ahb1enr::GPIODEN),
    (GPIOE, ahb1enr, ahb1enr::GPIOEEN),
    (GPIOH, ahb1enr, ahb1enr::GPIOHEN),
    (TIM2, apb1enr, apb1enr::TIM2EN),
    (TIM3, apb1enr, apb1enr::TIM3EN),
    (TIM4, apb1enr, apb1enr::TIM4EN),
    (TIM5, apb1enr, apb1enr::TIM5EN),
    (USART1, apb2enr, apb2enr::USART1EN),
}
