//! GPIO module. Pins by Daisy names for the pins this firmware drives.
//! Provides access to the Seed LED, the user button and the PWM output.

use stm32h7xx_hal::gpio::{
    gpioc::{PC7, PC8},
    gpiog::PG3,
    Alternate, Analog, Input, Output, PushPull,
};

pub type SeedLed = PC7<Output<PushPull>>;
pub type SeedButton = PG3<Input>;

/// Daisy pin 4, routed to the TIM3 channel 3 compare output.
pub type DutyPin = PC8<Alternate<2>>;

/// GPIO struct holding the pins in their configured modes.
#[allow(clippy::upper_case_acronyms)]
pub struct GPIO {
    pub led: SeedLed,
    pub button: SeedButton,
    pub duty: DutyPin,
}

impl GPIO {
    /// Initialize the GPIOs.
    pub fn init(
        seed_led: PC7<Analog>,
        seed_button: PG3<Analog>,
        duty_pin: PC8<Analog>,
    ) -> GPIO {
        GPIO {
            led: seed_led.into_push_pull_output(),
            button: seed_button.into_floating_input(),
            duty: duty_pin.into_alternate(),
        }
    }
}
