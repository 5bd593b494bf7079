use muldiv::MulDiv;

use crate::time::Hertz;

use super::Error;

/// Data bits per frame, parity included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Eight,
    Nine,
}

/// Parity bit, taken from the top data bit when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Stop bits, as their 2-bit CR2 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    /// 0.5 stop bits.
    Half = 0b01,
    One = 0b00,
    /// 1.5 stop bits.
    OneAndHalf = 0b11,
    Two = 0b10,
}

/// What wakes a muted receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeTrigger {
    IdleLine,
    AddressMark,
}

/// Frame format and speed, applied with
/// [Usart::configure](super::Usart::configure).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub baud: Hertz,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub wake: WakeTrigger,
}

impl Default for Config {
    /// 9600 baud, 8N1, idle-line wake.
    fn default() -> Self {
        Self {
            baud: Hertz::from_raw(9600),
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            wake: WakeTrigger::IdleLine,
        }
    }
}

impl Config {
    /// Default frame format at `baud`.
    #[inline(always)]
    pub fn new(baud: Hertz) -> Self {
        Self::default().baud(baud)
    }

    #[inline(always)]
    pub fn baud(mut self, baud: Hertz) -> Self {
        self.baud = baud;
        self
    }

    #[inline(always)]
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    #[inline(always)]
    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    #[inline(always)]
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    #[inline(always)]
    pub fn wake(mut self, wake: WakeTrigger) -> Self {
        self.wake = wake;
        self
    }
}

/// A baud rate divisor, as BRR holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Divisor {
    /// Whole part, 12 bits.
    pub mantissa: u16,
    /// Sixteenths, 4 bits.
    pub fraction: u8,
}

impl Divisor {
    /// The BRR word.
    #[inline(always)]
    pub fn bits(&self) -> u32 {
        ((self.mantissa as u32) << 4) | self.fraction as u32
    }

    /// Baud rate this divisor gives from `clock`.
    #[inline(always)]
    pub fn baud(&self, clock: Hertz) -> Option<Hertz> {
        let bits = self.bits();
        if bits == 0 {
            None
        } else {
            Some(clock / bits)
        }
    }
}

/// Divisor for `baud` from a USART clocked at `clock`, with 16x
/// oversampling.
///
/// USARTDIV is `clock / (16 * baud)`. Rounding `clock / baud` to a whole
/// number of sixteenths directly means a fraction that would round up to
/// 16 carries into the mantissa instead of overflowing its field.
pub fn baud_divisor(clock: Hertz, baud: Hertz) -> Result<Divisor, Error> {
    // mul_div_round asserts on a zero divisor
    if baud.raw() == 0 {
        return Err(Error::BaudOutOfRange);
    }

    let div16 = clock
        .raw()
        .mul_div_round(1, baud.raw())
        .ok_or(Error::BaudOutOfRange)?;

    let mantissa = div16 >> 4;
    if mantissa == 0 || mantissa > 0xfff {
        return Err(Error::BaudOutOfRange);
    }

    Ok(Divisor {
        mantissa: mantissa as u16,
        fraction: (div16 & 0xf) as u8,
    })
}
