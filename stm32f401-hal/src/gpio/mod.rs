//! General-purpose I/O.
//!
//! A [Pin] is one pin of one port, chosen at runtime by port letter and
//! pin number. Every setter rewrites only this pin's bits; neighbouring
//! pins sharing the register keep their configuration.
//!
//! [Led] and [Button] wrap a [Pin] with board polarity and named
//! operations.

mod button;
pub use button::*;

mod hal02;
mod hal1;

mod led;
pub use led::*;

mod pin;
pub use pin::*;

/// A GPIO error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The port letter names no port on this device.
    InvalidPort(char),
    /// Pin numbers run 0 to 15.
    InvalidPin(u8),
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "GPIO Error {:?}", self)
    }
}

/// The ports this device implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    H,
}

impl Port {
    /// Look up a port by letter, either case.
    ///
    /// Ports F and G are not bonded out on this device and are rejected
    /// along with every other letter.
    pub fn from_letter(letter: char) -> Result<Self, Error> {
        match letter.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            'E' => Ok(Self::E),
            'H' => Ok(Self::H),
            _ => Err(Error::InvalidPort(letter)),
        }
    }

    #[inline(always)]
    pub fn letter(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::H => 'H',
        }
    }

    /// Position of this port in the GPIO address space, A is 0.
    #[inline(always)]
    pub fn index(&self) -> u8 {
        self.letter() as u8 - b'A'
    }
}

/// Pin mode, 2 bits in MODER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Input = 0b00,
    Output = 0b01,
    Alternate = 0b10,
    Analog = 0b11,
}

/// Output driver, 1 bit in OTYPER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputType {
    PushPull = 0,
    OpenDrain = 1,
}

/// Output slew rate, 2 bits in OSPEEDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    Low = 0b00,
    Medium = 0b01,
    Fast = 0b10,
    High = 0b11,
}

/// Pull resistor, 2 bits in PUPDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None = 0b00,
    Up = 0b01,
    Down = 0b10,
}

macro_rules! from_bits {
    ($ty:ident { $($bits:pat => $variant:ident),+ $(,)? }) => {
        impl $ty {
            // bits come from a masked field, so the last arm is a catch-all
            #[inline(always)]
            pub(crate) fn from_bits(bits: u32) -> Self {
                match bits {
                    $($bits => Self::$variant,)+
                }
            }
        }
    };
}

from_bits!(Mode {
    0 => Input,
    1 => Output,
    2 => Alternate,
    _ => Analog,
});

from_bits!(OutputType {
    0 => PushPull,
    _ => OpenDrain,
});

from_bits!(Pull {
    1 => Up,
    2 => Down,
    _ => None,
});

from_bits!(Speed {
    0 => Low,
    1 => Medium,
    2 => Fast,
    _ => High,
});

/// Which level means "active" on a board signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// High is active.
    ActiveHigh,
    /// Low is active.
    ActiveLow,
}

impl Polarity {
    /// The pin level for the active or inactive state.
    #[inline(always)]
    pub fn level(&self, active: bool) -> PinState {
        match self {
            Self::ActiveHigh => PinState::from(active),
            Self::ActiveLow => !PinState::from(active),
        }
    }

    /// Is `level` the active state?
    #[inline(always)]
    pub fn is_active(&self, level: PinState) -> bool {
        self.level(true) == level
    }
}
