//! Wavetable generator firmware for the Daisy Seed.
//!
//! Streams the active lookup table into the PWM duty register over
//! circular DMA; the user button cycles the waveform set, the LED blinks
//! on every accepted switch, and the idle loop just sleeps.
#![no_std]
#![no_main]

#[rtic::app(device = stm32h7xx_hal::stm32, peripherals = true)]
mod app {
    use log::info;
    use panic_halt as _;
    use wavegen::{
        board::{self, gpio, logger, millis::MilliTick, pwm::PwmCarrier, system},
        display::LogNotifier,
        fault::{FaultCode, FaultState},
        hal::gpio::{Edge, ExtiPin},
        selector::{Selector, SwitchOutcome},
        DEFAULT_SIGNAL_HZ,
    };

    static FAULT: FaultState = FaultState::new();

    type BoardSelector = Selector<
        board::streamer::DutyCycleDma,
        board::sample_clock::Tim2SampleClock,
        LogNotifier,
    >;

    #[shared]
    struct Shared {
        selector: BoardSelector,
    }

    #[local]
    struct Local {
        button: gpio::SeedButton,
        led: gpio::SeedLed,
        millis: MilliTick,
        // Keeps the carrier timer owned for the firmware's lifetime.
        _pwm: PwmCarrier,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        logger::init();
        let mut core = ctx.core;
        let mut device = ctx.device;
        let ccdr = system::System::init_clocks(device.PWR, device.RCC, &device.SYSCFG);
        let mut system = wavegen::system_init!(core, device, ccdr);

        // Button
        system.gpio.button.make_interrupt_source(&mut device.SYSCFG);
        system
            .gpio
            .button
            .trigger_on_edge(&mut device.EXTI, Edge::Rising);
        system.gpio.button.enable_interrupt(&mut device.EXTI);

        let selector = match Selector::start(
            system.streamer,
            system.sample_clock,
            LogNotifier,
            &FAULT,
            DEFAULT_SIGNAL_HZ,
        ) {
            Ok(selector) => selector,
            Err(_) => {
                FAULT.record(FaultCode::Config);
                board::fatal();
            }
        };
        info!("Streaming started");

        (
            Shared { selector },
            Local {
                button: system.gpio.button,
                led: system.gpio.led,
                millis: system.millis,
                _pwm: system.pwm,
            },
            init::Monotonics(),
        )
    }

    #[idle]
    fn idle(_ctx: idle::Context) -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }

    #[task(binds = EXTI3, local = [button, led, millis, _pwm], shared = [selector])]
    fn button_edge(mut ctx: button_edge::Context) {
        let now_ms = ctx.local.millis.now_ms();
        let outcome = ctx
            .shared
            .selector
            .lock(|selector| selector.on_button_edge(now_ms));
        if let SwitchOutcome::Applied(_) = outcome {
            ctx.local.led.toggle();
        }
        // Cleared last: an edge that lands mid-handler re-pends and is
        // serviced on re-entry instead of being lost.
        ctx.local.button.clear_interrupt_pending_bit();
    }

    #[task(binds = DMA1_STR5, priority = 2, shared = [selector])]
    fn stream_error(mut ctx: stream_error::Context) {
        ctx.shared.selector.lock(|selector| {
            selector.on_stream_fault();
        });
    }
}
