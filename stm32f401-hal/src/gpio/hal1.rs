use core::convert::Infallible;
use embedded_hal_1::digital as hal1;

use super::{Pin, PinState};

impl From<hal1::PinState> for PinState {
    #[inline(always)]
    fn from(value: hal1::PinState) -> Self {
        match value {
            hal1::PinState::Low => Self::Low,
            hal1::PinState::High => Self::High,
        }
    }
}

impl From<PinState> for hal1::PinState {
    #[inline(always)]
    fn from(value: PinState) -> Self {
        match value {
            PinState::Low => Self::Low,
            PinState::High => Self::High,
        }
    }
}

// pin modes are runtime state here, so every pin gets every trait. the
// caller picks the mode.

impl hal1::ErrorType for Pin<'_> {
    type Error = Infallible;
}

impl hal1::InputPin for Pin<'_> {
    #[inline(always)]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(Pin::is_high(self))
    }

    #[inline(always)]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(Pin::is_low(self))
    }
}

impl hal1::OutputPin for Pin<'_> {
    #[inline(always)]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Pin::set_low(self);
        Ok(())
    }

    #[inline(always)]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        Pin::set_high(self);
        Ok(())
    }

    #[inline(always)]
    fn set_state(&mut self, state: hal1::PinState) -> Result<(), Self::Error> {
        Pin::set_state(self, state.into());
        Ok(())
    }
}

impl hal1::StatefulOutputPin for Pin<'_> {
    #[inline(always)]
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(Pin::is_set_high(self))
    }

    #[inline(always)]
    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(Pin::is_set_low(self))
    }

    #[inline(always)]
    fn toggle(&mut self) -> Result<(), Self::Error> {
        Pin::toggle(self);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;
    use crate::pac;
    use hal1::{OutputPin, StatefulOutputPin};

    #[test]
    fn trait_state_reaches_odr() {
        let regs = sim::leak(pac::gpio::RegisterBlock::new());
        let mut pin = Pin::from_registers(regs, 'B', 7).unwrap();

        OutputPin::set_state(&mut pin, hal1::PinState::High).unwrap();
        assert_eq!(regs.odr.read(), 1 << 7);
        StatefulOutputPin::toggle(&mut pin).unwrap();
        assert_eq!(StatefulOutputPin::is_set_low(&mut pin), Ok(true));
    }
}
