#![no_std]
#![no_main]

use blackpill::hal;
use panic_halt as _;

use blackpill::prelude::*;
use hal::flash::Flash;
use hal::rcc::{PllConfig, Rcc};
use hal::timer::SysTick;
use hal::usart::Config;

#[cortex_m_rt::entry]
fn main() -> ! {
    let p = hal::pac::Peripherals::take().unwrap();
    let mut flash = Flash::new(p.FLASH);
    let mut rcc = Rcc::new(p.RCC);
    rcc.config_pll(&mut flash, PllConfig::hsi_84mhz()).unwrap();
    let clocks = rcc.clocks().unwrap();

    // defmt output goes wherever the global UART goes
    let uart = blackpill::uart::new(p.USART1, &rcc, &clocks, &Config::new(115_200.Hz())).unwrap();
    blackpill::uart::install(uart);
    defmt::info!("clocks: {}", clocks);

    let mut systick = SysTick::new(p.SYST, &clocks);
    let mut counter = 0u32;
    loop {
        defmt::info!("counter is: {}", counter);
        counter += 1;
        systick.delay(1000).unwrap();
    }
}
