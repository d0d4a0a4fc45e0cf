//! Contains setup for Daisy Seed hardware.

use log::info;
use stm32h7xx_hal::{
    prelude::*,
    rcc, stm32,
    time::{Hertz, MegaHertz},
};

use crate::board::gpio::GPIO;
use crate::board::millis::MilliTick;
use crate::board::pwm::PwmCarrier;
use crate::board::sample_clock::Tim2SampleClock;
use crate::board::streamer::DutyCycleDma;

const HSE_CLOCK_MHZ: MegaHertz = MegaHertz::from_raw(16);

pub const CLOCK_RATE_HZ: Hertz = Hertz::from_raw(400_000_000);

// PCLKx
const PCLK_HZ: Hertz = Hertz::from_raw(CLOCK_RATE_HZ.raw() / 4);
// PLL1
const PLL1_P_HZ: Hertz = CLOCK_RATE_HZ;

pub struct System {
    pub gpio: GPIO,
    pub streamer: DutyCycleDma,
    pub sample_clock: Tim2SampleClock,
    pub millis: MilliTick,
    pub pwm: PwmCarrier,
}

/// All peripherals and other resources required for the system
pub struct SystemResources<'a> {
    pub clocks: &'a rcc::CoreClocks,
    pub scb: &'a mut cortex_m::peripheral::SCB,
    pub cpuid: &'a mut cortex_m::peripheral::CPUID,

    pub tim2: stm32::TIM2,
    pub tim2_rec: rcc::rec::Tim2,

    pub tim3: stm32::TIM3,
    pub tim3_rec: rcc::rec::Tim3,

    pub tim5: stm32::TIM5,
    pub tim5_rec: rcc::rec::Tim5,

    pub dma1: stm32::DMA1,
    pub dma1_rec: rcc::rec::Dma1,
    pub dmamux1: stm32::DMAMUX1,

    pub gpioc: stm32::GPIOC,
    pub gpioc_rec: rcc::rec::Gpioc,

    pub gpiog: stm32::GPIOG,
    pub gpiog_rec: rcc::rec::Gpiog,
}

#[macro_export]
macro_rules! system_init {
    ($core:ident, $device:ident, $ccdr:ident) => {{
        let resources = $crate::board::system::SystemResources {
            clocks: &$ccdr.clocks,
            scb: &mut $core.SCB,
            cpuid: &mut $core.CPUID,
            tim2: $device.TIM2,
            tim2_rec: $ccdr.peripheral.TIM2,
            tim3: $device.TIM3,
            tim3_rec: $ccdr.peripheral.TIM3,
            tim5: $device.TIM5,
            tim5_rec: $ccdr.peripheral.TIM5,
            dma1: $device.DMA1,
            dma1_rec: $ccdr.peripheral.DMA1,
            dmamux1: $device.DMAMUX1,
            gpioc: $device.GPIOC,
            gpioc_rec: $ccdr.peripheral.GPIOC,
            gpiog: $device.GPIOG,
            gpiog_rec: $ccdr.peripheral.GPIOG,
        };

        $crate::board::system::System::init(resources)
    }};
}

impl System {
    /// Initialize clocks
    pub fn init_clocks(pwr: stm32::PWR, rcc: stm32::RCC, syscfg: &stm32::SYSCFG) -> rcc::Ccdr {
        // Power
        let pwr = pwr.constrain();
        let vos = pwr.vos0(syscfg).freeze();

        rcc.constrain()
            .use_hse(HSE_CLOCK_MHZ.convert())
            .sys_ck(CLOCK_RATE_HZ)
            .pclk1(PCLK_HZ) // DMA clock
            .pll1_strategy(rcc::PllConfigStrategy::Iterative)
            .pll1_p_ck(PLL1_P_HZ)
            .freeze(vos, syscfg)
    }

    /// Setup cache
    pub fn init_cache(
        scb: &mut cortex_m::peripheral::SCB,
        cpuid: &mut cortex_m::peripheral::CPUID,
    ) {
        scb.enable_icache();
        scb.enable_dcache(cpuid);
    }

    /// Batteries included initialization
    pub fn init(resources: SystemResources) -> System {
        info!("Starting system init");

        Self::init_cache(resources.scb, resources.cpuid);

        info!("Setting up GPIOs...");
        let gpioc = resources.gpioc.split(resources.gpioc_rec);
        let gpiog = resources.gpiog.split(resources.gpiog_rec);
        let gpio = GPIO::init(gpioc.pc7, gpiog.pg3, gpioc.pc8);

        info!("Setting up PWM carrier...");
        let pwm = PwmCarrier::init(resources.tim3, resources.tim3_rec);

        info!("Setting up DMA...");
        let streamer = DutyCycleDma::new(
            resources.dma1,
            resources.dma1_rec,
            resources.dmamux1,
            pwm.duty_addr(),
        );

        let sample_clock =
            Tim2SampleClock::new(resources.tim2, resources.tim2_rec, resources.clocks);
        let millis = MilliTick::new(resources.tim5, resources.tim5_rec, resources.clocks);

        log_clocks(resources.clocks);
        info!("System init done!");

        System {
            gpio,
            streamer,
            sample_clock,
            millis,
            pwm,
        }
    }
}

fn log_clocks(clocks: &rcc::CoreClocks) {
    info!("Core {}", clocks.c_ck());
    info!("pclk1 {}", clocks.pclk1());
    info!("timx_ker_ck {}", clocks.timx_ker_ck());
}
