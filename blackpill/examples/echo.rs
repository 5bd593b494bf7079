#![no_std]
#![no_main]

use blackpill::hal;
use panic_halt as _;

use blackpill::prelude::*;
use hal::flash::Flash;
use hal::rcc::{PllConfig, Rcc};
use hal::usart::Config;

#[cortex_m_rt::entry]
fn main() -> ! {
    // grab peripherals and bring the system clock up to 84MHz
    let p = hal::pac::Peripherals::take().unwrap();
    let mut flash = Flash::new(p.FLASH);
    let mut rcc = Rcc::new(p.RCC);
    rcc.config_pll(&mut flash, PllConfig::hsi_84mhz()).unwrap();
    let clocks = rcc.clocks().unwrap();

    let mut led = blackpill::led::new(&rcc).unwrap();

    // 9600 8N1, what the host tool expects
    let uart = blackpill::uart::new(p.USART1, &rcc, &clocks, &Config::default()).unwrap();
    let mut global = blackpill::uart::install(uart);

    // answer every message from the host with the same message back,
    // blinking once per round trip
    let mut buf = [0; 64];
    loop {
        led.on();
        match blackpill::link::recv(&mut global, &mut buf) {
            Ok(len) => {
                let _ = blackpill::link::send(&mut global, &buf[..len]);
            }
            Err(e) => {
                // the host tool ignores anything outside an exchange
                println!("{}", e);
            }
        }
        led.off();
    }
}
