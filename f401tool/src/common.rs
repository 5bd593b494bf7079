use std::time::Duration;

use anyhow::Context;

/// Baud rate the board firmware runs its link at.
pub const BAUD_RATE: u32 = 9600;

#[derive(clap::Args, Debug, Clone)]
pub struct SerialPortArgs {
    /// Serial device the board is attached to.
    #[arg(short, long, default_value_t = default_serial_port())]
    pub port: String,
    #[arg(short, long, default_value_t = BAUD_RATE)]
    baud: u32,
    #[arg(long, value_enum, default_value = "none")]
    parity: Parity,
    /// Read timeout for a single byte, in milliseconds.
    #[arg(long, default_value_t = 100)]
    timeout: u64,
    /// Time between attempts to open the port, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    retry: u64,
    /// Give up after this many attempts to open the port. Retries
    /// forever if not given.
    #[arg(long)]
    attempts: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl From<Parity> for serialport::Parity {
    fn from(value: Parity) -> Self {
        match value {
            Parity::None => serialport::Parity::None,
            Parity::Even => serialport::Parity::Even,
            Parity::Odd => serialport::Parity::Odd,
        }
    }
}

pub fn default_serial_port() -> String {
    if let Ok(infos) = serialport::available_ports() {
        for info in infos {
            #[cfg(target_os = "macos")]
            if info.port_name.ends_with(".Bluetooth-Incoming-Port") {
                // these ports are almost always *not* what we want
                continue;
            }

            #[cfg(target_os = "macos")]
            if info.port_name.starts_with("/dev/tty.") {
                // macos ports with tty. have flow control we don't use
                continue;
            }

            // the board enumerates as a USB serial adapter
            if let serialport::SerialPortType::UsbPort(_) = info.port_type {
                return info.port_name;
            }
        }
    }

    // not great, but reasonable fallback
    "/dev/ttyUSB0".to_owned()
}

impl SerialPortArgs {
    /// How long to wait between attempts to open the port.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry)
    }

    /// Open the port once, 8 data bits and 1 stop bit.
    pub fn open(&self) -> anyhow::Result<Box<dyn serialport::SerialPort>> {
        serialport::new(&self.port, self.baud)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .parity(self.parity.into())
            .timeout(Duration::from_millis(self.timeout))
            .open()
            .with_context(|| format!("could not open {}", self.port))
    }

    /// Open the port, retrying until it appears.
    pub fn connect(&self) -> anyhow::Result<Box<dyn serialport::SerialPort>> {
        let bar = wait_spinner(&format!("waiting for {}", self.port));
        let port = retry(self.attempts, self.retry_interval(), || self.open());
        bar.finish_and_clear();

        let port = port?;
        eprintln!("Connected to {} at {} baud.", self.port, self.baud);
        Ok(port)
    }
}

/// Call `f` until it succeeds, sleeping `interval` between calls.
///
/// With `attempts` set, the last error is returned once they run out.
pub fn retry<T>(
    attempts: Option<u32>,
    interval: Duration,
    mut f: impl FnMut() -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut tries = 0;
    loop {
        tries += 1;
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                if attempts.map_or(false, |max| tries >= max) {
                    return Err(e.context(format!("gave up after {} attempts", tries)));
                }
            }
        }
        std::thread::sleep(interval);
    }
}

pub fn wait_spinner(message: &str) -> indicatif::ProgressBar {
    let bar = indicatif::ProgressBar::new_spinner();
    bar.set_style(
        indicatif::ProgressStyle::with_template("({spinner}) {msg} {elapsed}")
            .unwrap()
            .tick_strings(&["<<<  ", "<<  <", "<  <<", "  <<<", " <<< ", "-----"]),
    );
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
