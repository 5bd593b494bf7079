//! USART1 on PA9 (TX) and PA10 (RX).

use core::convert::Infallible;
use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::hal::block;
use crate::hal::gpio::{self, Pin, Speed};
use crate::hal::rcc::{Clocks, Rcc};
use crate::hal::usart::{self, Config, Usart};
use crate::pac::USART1;

/// Port and pin of the transmit line.
pub const TX_PIN: (char, u8) = ('A', 9);

/// Port and pin of the receive line.
pub const RX_PIN: (char, u8) = ('A', 10);

/// Alternate function routing USART1 to PA9/PA10.
pub const ALT_FUNCTION: u8 = 7;

/// The Rx half of the UART.
pub type Rx = usart::Rx<'static>;

/// The Tx half of the UART.
pub type Tx = usart::Tx<'static>;

/// An error setting up the UART.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Gpio(gpio::Error),
    Usart(usart::Error),
}

impl fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Gpio(e) => fmt::Display::fmt(e, f),
            Self::Usart(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl From<gpio::Error> for Error {
    fn from(value: gpio::Error) -> Self {
        Self::Gpio(value)
    }
}

impl From<usart::Error> for Error {
    fn from(value: usart::Error) -> Self {
        Self::Usart(value)
    }
}

/// The UART interface, split into its two directions.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uart {
    pub rx: Rx,
    pub tx: Tx,
}

// PA9/PA10 share everything but the pull
fn alternate_pin(at: (char, u8), rcc: &Rcc) -> Result<Pin<'static>, gpio::Error> {
    let mut pin = Pin::new(at.0, at.1)?;
    pin.clock_enable(rcc);
    pin.set_alt_function(ALT_FUNCTION);
    pin.enable_push_pull();
    pin.set_speed(Speed::High);
    pin.set_alternate_mode();
    Ok(pin)
}

/// Set up USART1 on its board pins, with both directions enabled.
///
/// The frame and baud rate come from `config`. Nothing is enabled if the
/// baud rate cannot be reached from the APB2 clock.
pub fn new(usart: USART1, rcc: &Rcc, clocks: &Clocks, config: &Config) -> Result<Uart, Error> {
    let tx = alternate_pin(TX_PIN, rcc)?;
    let mut rx = alternate_pin(RX_PIN, rcc)?;
    rx.set_pull_up();

    let mut usart = Usart::new(usart);
    usart.clock_enable(rcc);
    usart.disable_usart();
    usart.configure(clocks, config)?;
    usart.enable_usart();

    let mut tx = usart.tx(tx);
    let mut rx = usart.rx(rx);
    tx.enable();
    rx.enable();

    Ok(Uart { rx, tx })
}

// the global UART
static RX: spin::Mutex<Option<Rx>> = spin::Mutex::new(None);
static TX: spin::Mutex<Option<Tx>> = spin::Mutex::new(None);

/// Print a line to the global UART.
///
/// See [install()] for how to install a global UART.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\r\n"));
    ($($arg:tt)*) => ($crate::print!("{}\r\n", format_args!($($arg)*)));
}

/// Print to the global UART.
///
/// See [install()] for how to install a global UART.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::uart::_print(format_args!($($arg)*)));
}

#[doc(hidden)]
/// Internal print function, used by [print!()] macro.
pub fn _print(args: fmt::Arguments) {
    use fmt::Write;
    if let Some(mut tx) = try_tx() {
        // best effort, printing must never panic
        let _ = write!(tx, "{}", args);
    }
}

/// Wait until the global UART has sent everything.
///
/// See [install()] for how to install a global UART.
pub fn flush() {
    if let Some(mut tx) = try_tx() {
        let _ = block::block!(tx.flush());
    }
}

/// A token indicating the UART has been installed globally.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalUart {
    _priv: (),
}

/// Install the UART as the global handler.
///
/// This allows the use of [println!()] and [print!()] anywhere.
pub fn install(uart: Uart) -> GlobalUart {
    GlobalUart::install(uart)
}

/// Uninstall the global handler, recovering the UART.
pub fn uninstall(global: GlobalUart) -> Uart {
    global.uninstall()
}

impl GlobalUart {
    /// Install the UART as the global handler.
    ///
    /// This allows the use of [println!()] and [print!()] anywhere.
    pub fn install(uart: Uart) -> Self {
        let mut rx = RX.lock();
        let mut tx = TX.lock();
        *rx = Some(uart.rx);
        *tx = Some(uart.tx);
        GlobalUart { _priv: () }
    }

    /// Try to install the UART as the global handler.
    ///
    /// This will fail, rather than lock up, if the global UART locks are held.
    pub fn try_install(uart: Uart) -> Result<Self, Uart> {
        if let Some(mut rx) = RX.try_lock() {
            if let Some(mut tx) = TX.try_lock() {
                *rx = Some(uart.rx);
                *tx = Some(uart.tx);
                return Ok(GlobalUart { _priv: () });
            }
        }

        Err(uart)
    }

    /// Uninstall the global handler, recovering the UART.
    pub fn uninstall(self) -> Uart {
        let mut rx = RX.lock();
        let mut tx = TX.lock();
        // unwrap is ok: owning this token means these were set
        Uart {
            rx: rx.take().unwrap(),
            tx: tx.take().unwrap(),
        }
    }

    /// Try to uninstall the global handler, recovering the UART.
    ///
    /// This will fail, rather than lock up, if the global UART locks are held.
    pub fn try_uninstall(self) -> Result<Uart, Self> {
        if let Some(mut rx) = RX.try_lock() {
            if let Some(mut tx) = TX.try_lock() {
                // unwrap is ok: owning this token means these were set
                return Ok(Uart {
                    rx: rx.take().unwrap(),
                    tx: tx.take().unwrap(),
                });
            }
        }

        Err(self)
    }

    /// Get the global [Rx] exclusively.
    pub fn lock_rx(&self) -> Proxy<Rx> {
        // unwrap is ok: we have reference to the token that sets it
        Proxy::new(RX.lock()).unwrap()
    }

    /// Get the global [Tx] exclusively.
    pub fn lock_tx(&self) -> Proxy<Tx> {
        // unwrap is ok: we have reference to the token that sets it
        Proxy::new(TX.lock()).unwrap()
    }
}

// the transmitter never fails, so both directions share the receive error
fn never(e: Infallible) -> usart::Error {
    match e {}
}

impl embedded_io::ErrorType for GlobalUart {
    type Error = usart::Error;
}

impl<'a> embedded_io::ErrorType for &'a GlobalUart {
    type Error = usart::Error;
}

impl embedded_io::Read for GlobalUart {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        embedded_io::Read::read(&mut &*self, buf)
    }
}

impl<'a> embedded_io::Read for &'a GlobalUart {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        embedded_io::Read::read(self.lock_rx().deref_mut(), buf)
    }
}

impl embedded_io::ReadReady for GlobalUart {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        embedded_io::ReadReady::read_ready(&mut &*self)
    }
}

impl<'a> embedded_io::ReadReady for &'a GlobalUart {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        embedded_io::ReadReady::read_ready(self.lock_rx().deref_mut())
    }
}

impl embedded_io::Write for GlobalUart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        embedded_io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        embedded_io::Write::flush(&mut &*self)
    }
}

impl<'a> embedded_io::Write for &'a GlobalUart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        embedded_io::Write::write(self.lock_tx().deref_mut(), buf).map_err(never)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        embedded_io::Write::flush(self.lock_tx().deref_mut()).map_err(never)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        // hold the lock for the whole buffer so output is not interleaved
        embedded_io::Write::write_all(self.lock_tx().deref_mut(), buf).map_err(never)
    }
}

impl embedded_io::WriteReady for GlobalUart {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        embedded_io::WriteReady::write_ready(&mut &*self)
    }
}

impl<'a> embedded_io::WriteReady for &'a GlobalUart {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        embedded_io::WriteReady::write_ready(self.lock_tx().deref_mut()).map_err(never)
    }
}

/// A proxy type for the global UART.
#[derive(Debug)]
pub struct Proxy<T: 'static> {
    guard: spin::MutexGuard<'static, Option<T>>,
}

impl<T> Proxy<T> {
    fn new(guard: spin::MutexGuard<'static, Option<T>>) -> Option<Self> {
        if guard.is_none() {
            None
        } else {
            Some(Proxy { guard })
        }
    }
}

impl<T> Deref for Proxy<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // unwrap is ok, new guarantees this is_some()
        self.guard.as_ref().unwrap()
    }
}

impl<T> DerefMut for Proxy<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // unwrap is ok, new guarantees this is_some()
        self.guard.as_mut().unwrap()
    }
}

/// Try to get the global [Rx].
///
/// This will fail if the global UART is not set, or if Rx is in use already.
pub fn try_rx() -> Option<Proxy<Rx>> {
    Proxy::new(RX.try_lock()?)
}

/// Try to get the global [Tx].
///
/// This will fail if the global UART is not set, or if Tx is in use already.
pub fn try_tx() -> Option<Proxy<Tx>> {
    Proxy::new(TX.try_lock()?)
}
