//! Daisy Seed hardware layer: clock tree, pins, the TIM2 sample clock,
//! the TIM3 PWM carrier and the DMA duty-cycle streamer.

pub mod gpio;
pub mod logger;
pub mod millis;
pub mod pwm;
pub mod sample_clock;
pub mod streamer;
pub mod system;

pub use system::System;

/// Terminal error state for configuration faults: interrupts off, halt.
///
/// There is no supervisor to recover to; continuing would drive an
/// unconfigured timer or DMA engine.
pub fn fatal() -> ! {
    cortex_m::interrupt::disable();
    loop {
        cortex_m::asm::wfi();
    }
}
