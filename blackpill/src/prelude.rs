//! Board prelude, imported with `use blackpill::prelude::*`.
//!
//! Brings in the HAL prelude along with the global [print!] and
//! [println!] macros.

pub use crate::hal::prelude::*;
pub use crate::{print, println};
