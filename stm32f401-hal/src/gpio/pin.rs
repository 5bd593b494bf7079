use crate::pac;
use crate::pac::gpio::pin;
use crate::rcc::Rcc;

use super::{Error, Mode, OutputType, Port, Pull, Speed};

/// Digital pin state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    Low = 0,
    High = 1,
}

impl From<bool> for PinState {
    #[inline(always)]
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl core::ops::Not for PinState {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

impl PinState {
    /// Is the pin high?
    #[inline(always)]
    pub fn is_high(&self) -> bool {
        *self == Self::High
    }

    /// Is the pin low?
    #[inline(always)]
    pub fn is_low(&self) -> bool {
        *self == Self::Low
    }
}

/// Highest alternate function number.
pub const MAX_ALT_FUNCTION: u8 = 15;

/// One pin of one port.
pub struct Pin<'a> {
    regs: &'a pac::gpio::RegisterBlock,
    port: Port,
    n: u8,
}

impl core::fmt::Debug for Pin<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_tuple("Pin")
            .field(&self.port.letter())
            .field(&self.n)
            .field(&self.mode())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Pin<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Pin({}, {}, {})", self.port.letter(), self.n, self.mode())
    }
}

impl Pin<'static> {
    /// Take pin `n` of the port named by `port`.
    ///
    /// Pins share their port's registers but only ever touch their own
    /// bits, so any number of distinct pins may exist at once. Creating
    /// two handles for the same pin is allowed but they will fight.
    pub fn new(port: char, n: u8) -> Result<Self, Error> {
        let port = Port::from_letter(port)?;
        // safety: GPIO blocks live forever at a fixed address, and
        // from_letter only returns ports that exist
        let regs = unsafe { &*pac::gpio::port_ptr(port.index()) };
        Self::checked(regs, port, n)
    }
}

impl<'a> Pin<'a> {
    /// Drive pin `n` of an arbitrary GPIO register block, labelled as
    /// `port`.
    pub fn from_registers(
        regs: &'a pac::gpio::RegisterBlock,
        port: char,
        n: u8,
    ) -> Result<Self, Error> {
        Self::checked(regs, Port::from_letter(port)?, n)
    }

    #[inline(always)]
    fn checked(regs: &'a pac::gpio::RegisterBlock, port: Port, n: u8) -> Result<Self, Error> {
        if n > 15 {
            return Err(Error::InvalidPin(n));
        }

        Ok(Self { regs, port, n })
    }

    /// The port this pin belongs to.
    #[inline(always)]
    pub fn port(&self) -> Port {
        self.port
    }

    /// The pin number within its port.
    #[inline(always)]
    pub fn pin(&self) -> u8 {
        self.n
    }

    /// Turn on the clock for this pin's port.
    pub fn clock_enable(&self, rcc: &Rcc) {
        match self.port {
            Port::A => rcc.enable_gpioa(),
            Port::B => rcc.enable_gpiob(),
            Port::C => rcc.enable_gpioc(),
            Port::D => rcc.enable_gpiod(),
            Port::E => rcc.enable_gpioe(),
            Port::H => rcc.enable_gpioh(),
        }
    }

    #[inline(always)]
    pub fn set_mode(&mut self, mode: Mode) {
        self.regs.moder.write_field(pin::MODE.at(self.n), mode as u32);
    }

    #[inline(always)]
    pub fn mode(&self) -> Mode {
        Mode::from_bits(self.regs.moder.read_field(pin::MODE.at(self.n)))
    }

    #[inline(always)]
    pub fn set_input_mode(&mut self) {
        self.set_mode(Mode::Input);
    }

    #[inline(always)]
    pub fn set_output_mode(&mut self) {
        self.set_mode(Mode::Output);
    }

    /// Route the pin to the peripheral picked by
    /// [Pin::set_alt_function].
    #[inline(always)]
    pub fn set_alternate_mode(&mut self) {
        self.set_mode(Mode::Alternate);
    }

    #[inline(always)]
    pub fn set_analog_mode(&mut self) {
        self.set_mode(Mode::Analog);
    }

    #[inline(always)]
    pub fn set_output_type(&mut self, otype: OutputType) {
        self.regs
            .otyper
            .write_field(pin::OTYPE.at(self.n), otype as u32);
    }

    #[inline(always)]
    pub fn output_type(&self) -> OutputType {
        OutputType::from_bits(self.regs.otyper.read_field(pin::OTYPE.at(self.n)))
    }

    #[inline(always)]
    pub fn enable_push_pull(&mut self) {
        self.set_output_type(OutputType::PushPull);
    }

    #[inline(always)]
    pub fn enable_open_drain(&mut self) {
        self.set_output_type(OutputType::OpenDrain);
    }

    #[inline(always)]
    pub fn set_speed(&mut self, speed: Speed) {
        self.regs
            .ospeedr
            .write_field(pin::OSPEED.at(self.n), speed as u32);
    }

    #[inline(always)]
    pub fn speed(&self) -> Speed {
        Speed::from_bits(self.regs.ospeedr.read_field(pin::OSPEED.at(self.n)))
    }

    #[inline(always)]
    pub fn set_pull(&mut self, pull: Pull) {
        self.regs.pupdr.write_field(pin::PUPD.at(self.n), pull as u32);
    }

    #[inline(always)]
    pub fn pull(&self) -> Pull {
        Pull::from_bits(self.regs.pupdr.read_field(pin::PUPD.at(self.n)))
    }

    #[inline(always)]
    pub fn no_pull_up_down(&mut self) {
        self.set_pull(Pull::None);
    }

    #[inline(always)]
    pub fn set_pull_up(&mut self) {
        self.set_pull(Pull::Up);
    }

    #[inline(always)]
    pub fn set_pull_down(&mut self) {
        self.set_pull(Pull::Down);
    }

    /// Select alternate function `f`, 0 to [MAX_ALT_FUNCTION].
    ///
    /// Larger numbers do not fit the field and are ignored. Nothing
    /// checks that `f` means anything on this pin.
    pub fn set_alt_function(&mut self, f: u8) {
        if f > MAX_ALT_FUNCTION {
            return;
        }

        if self.n < 8 {
            self.regs.afrl.write_field(pin::AF.at(self.n), f as u32);
        } else {
            self.regs.afrh.write_field(pin::AF.at(self.n - 8), f as u32);
        }
    }

    pub fn alt_function(&self) -> u8 {
        let f = if self.n < 8 {
            self.regs.afrl.read_field(pin::AF.at(self.n))
        } else {
            self.regs.afrh.read_field(pin::AF.at(self.n - 8))
        };
        f as u8
    }

    /// Read this pin's input bit.
    #[inline(always)]
    pub fn read_data(&self) -> PinState {
        PinState::from(self.regs.idr.is_set(pin::DATA.at(self.n)))
    }

    /// Is the pin input high?
    #[inline(always)]
    pub fn is_high(&self) -> bool {
        self.read_data().is_high()
    }

    /// Is the pin input low?
    #[inline(always)]
    pub fn is_low(&self) -> bool {
        self.read_data().is_low()
    }

    /// Drive the output to `state`.
    #[inline(always)]
    pub fn set_state(&mut self, state: PinState) {
        self.regs
            .odr
            .write_field(pin::DATA.at(self.n), state as u32);
    }

    /// The level the output is driven to.
    #[inline(always)]
    pub fn output_state(&self) -> PinState {
        PinState::from(self.regs.odr.is_set(pin::DATA.at(self.n)))
    }

    #[inline(always)]
    pub fn set_high(&mut self) {
        self.set_state(PinState::High);
    }

    #[inline(always)]
    pub fn set_low(&mut self) {
        self.set_state(PinState::Low);
    }

    #[inline(always)]
    pub fn is_set_high(&self) -> bool {
        self.output_state().is_high()
    }

    #[inline(always)]
    pub fn is_set_low(&self) -> bool {
        self.output_state().is_low()
    }

    #[inline(always)]
    pub fn toggle(&mut self) {
        self.set_state(!self.output_state());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    impl Arbitrary for Mode {
        fn arbitrary(g: &mut Gen) -> Self {
            *g.choose(&[Mode::Input, Mode::Output, Mode::Alternate, Mode::Analog])
                .unwrap()
        }
    }

    impl Arbitrary for Speed {
        fn arbitrary(g: &mut Gen) -> Self {
            *g.choose(&[Speed::Low, Speed::Medium, Speed::Fast, Speed::High])
                .unwrap()
        }
    }

    impl Arbitrary for Pull {
        fn arbitrary(g: &mut Gen) -> Self {
            *g.choose(&[Pull::None, Pull::Up, Pull::Down]).unwrap()
        }
    }

    impl Arbitrary for OutputType {
        fn arbitrary(g: &mut Gen) -> Self {
            *g.choose(&[OutputType::PushPull, OutputType::OpenDrain])
                .unwrap()
        }
    }

    fn port() -> &'static pac::gpio::RegisterBlock {
        sim::leak(pac::gpio::RegisterBlock::new())
    }

    // bits outside `width` bits at pin * width must survive
    fn others_kept(before: u32, after: u32, n: u8, width: u8) -> bool {
        let mask = (((1u64 << width) - 1) as u32) << (n * width);
        before & !mask == after & !mask
    }

    #[quickcheck]
    fn mode_keeps_other_pins(init: u32, n: u8, mode: Mode) -> bool {
        let regs = port();
        let n = n % 16;
        regs.moder.write(init);

        let mut pin = Pin::from_registers(regs, 'A', n).unwrap();
        pin.set_mode(mode);

        others_kept(init, regs.moder.read(), n, 2) && pin.mode() == mode
    }

    #[quickcheck]
    fn speed_keeps_other_pins(init: u32, n: u8, speed: Speed) -> bool {
        let regs = port();
        let n = n % 16;
        regs.ospeedr.write(init);

        let mut pin = Pin::from_registers(regs, 'B', n).unwrap();
        pin.set_speed(speed);

        others_kept(init, regs.ospeedr.read(), n, 2) && pin.speed() == speed
    }

    #[quickcheck]
    fn pull_keeps_other_pins(init: u32, n: u8, pull: Pull) -> bool {
        let regs = port();
        let n = n % 16;
        regs.pupdr.write(init);

        let mut pin = Pin::from_registers(regs, 'C', n).unwrap();
        pin.set_pull(pull);

        others_kept(init, regs.pupdr.read(), n, 2) && pin.pull() == pull
    }

    #[quickcheck]
    fn output_type_keeps_other_pins(init: u32, n: u8, otype: OutputType) -> bool {
        let regs = port();
        let n = n % 16;
        regs.otyper.write(init);

        let mut pin = Pin::from_registers(regs, 'D', n).unwrap();
        pin.set_output_type(otype);

        others_kept(init, regs.otyper.read(), n, 1) && pin.output_type() == otype
    }

    #[quickcheck]
    fn alt_function_keeps_other_pins(low: u32, high: u32, n: u8, f: u8) -> bool {
        let regs = port();
        let n = n % 16;
        let f = f % 16;
        regs.afrl.write(low);
        regs.afrh.write(high);

        let mut pin = Pin::from_registers(regs, 'E', n).unwrap();
        pin.set_alt_function(f);

        let (touched, untouched, before, slot) = if n < 8 {
            (&regs.afrl, &regs.afrh, low, n)
        } else {
            (&regs.afrh, &regs.afrl, high, n - 8)
        };
        others_kept(before, touched.read(), slot, 4)
            && untouched.read() == if n < 8 { high } else { low }
            && pin.alt_function() == f
    }

    #[quickcheck]
    fn alt_function_overflow_ignored(low: u32, high: u32, n: u8, f: u8) -> bool {
        let regs = port();
        regs.afrl.write(low);
        regs.afrh.write(high);

        let mut pin = Pin::from_registers(regs, 'H', n % 16).unwrap();
        pin.set_alt_function(f.max(16));

        regs.afrl.read() == low && regs.afrh.read() == high
    }

    #[quickcheck]
    fn output_keeps_other_pins(init: u32, n: u8) -> bool {
        let regs = port();
        let n = n % 16;
        regs.odr.write(init);

        let mut pin = Pin::from_registers(regs, 'A', n).unwrap();
        pin.toggle();
        let toggled = regs.odr.read() == init ^ (1 << n);
        pin.set_high();
        let high = regs.odr.read() == init | (1 << n);
        pin.set_low();
        let low = regs.odr.read() == init & !(1 << n);

        toggled && high && low
    }

    #[test]
    fn read_data_is_one_bit() {
        let regs = port();
        regs.idr.write(0xffff & !(1 << 3));

        let pin3 = Pin::from_registers(regs, 'a', 3).unwrap();
        let pin4 = Pin::from_registers(regs, 'a', 4).unwrap();
        assert_eq!(pin3.read_data(), PinState::Low);
        assert_eq!(pin4.read_data(), PinState::High);
    }

    #[test]
    fn high_afr_shift() {
        let regs = port();
        let mut pin = Pin::from_registers(regs, 'A', 10).unwrap();

        pin.set_alt_function(7);
        assert_eq!(regs.afrh.read(), 7 << 8);
        assert_eq!(regs.afrl.read(), 0);
    }

    #[test]
    fn construction_validates() {
        let regs = port();
        assert_eq!(
            Pin::from_registers(regs, 'F', 0).unwrap_err(),
            Error::InvalidPort('F')
        );
        assert_eq!(
            Pin::from_registers(regs, 'Z', 0).unwrap_err(),
            Error::InvalidPort('Z')
        );
        assert_eq!(
            Pin::from_registers(regs, 'A', 16).unwrap_err(),
            Error::InvalidPin(16)
        );
        let pin = Pin::from_registers(regs, 'h', 1).unwrap();
        assert_eq!(pin.port(), Port::H);
        assert_eq!(pin.port().index(), 7);
    }

    #[test]
    fn clock_gate_per_port() {
        let rcc_regs = sim::leak(pac::rcc::RegisterBlock::new());
        let rcc = Rcc::from_registers(rcc_regs);
        let regs = port();

        Pin::from_registers(regs, 'C', 13).unwrap().clock_enable(&rcc);
        assert_eq!(rcc_regs.ahb1enr.read(), 1 << 2);
        Pin::from_registers(regs, 'H', 0).unwrap().clock_enable(&rcc);
        assert_eq!(rcc_regs.ahb1enr.read(), (1 << 2) | (1 << 7));
    }
}
