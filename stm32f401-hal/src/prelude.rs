//! Extension traits, imported with `use stm32f401_hal::prelude::*`.

pub use crate::time::{DurationExtU32 as _, RateExtU32 as _};

pub use embedded_hal_02::digital::v2::{
    InputPin as _, OutputPin as _, StatefulOutputPin as _, ToggleableOutputPin as _,
};
pub use embedded_io::{Read as _, Write as _};
