#![no_std]
#![no_main]

use blackpill::hal;
use panic_halt as _;

use hal::flash::Flash;
use hal::rcc::{PllConfig, Rcc};
use hal::timer::Timer;

#[cortex_m_rt::entry]
fn main() -> ! {
    // grab peripherals and bring the system clock up to 84MHz
    let p = hal::pac::Peripherals::take().unwrap();
    let mut flash = Flash::new(p.FLASH);
    let mut rcc = Rcc::new(p.RCC);
    rcc.config_pll(&mut flash, PllConfig::hsi_84mhz()).unwrap();
    let clocks = rcc.clocks().unwrap();

    let mut led = blackpill::led::new(&rcc).unwrap();
    let button = blackpill::button::new(&rcc).unwrap();

    // TIM2 is 32 bits wide, plenty for any of these delays
    let mut timer = Timer::new(2, &clocks).unwrap();
    timer.clock_enable(&rcc);

    // it's blinkin' time, faster while the button is held
    loop {
        let ms = if button.is_pressed() { 100 } else { 500 };
        timer.delay(ms).unwrap();
        led.toggle();
    }
}
