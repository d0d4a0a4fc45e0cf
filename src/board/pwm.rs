//! PWM carrier: TIM3 channel 3 running at a fixed 12-bit period.
//!
//! The carrier is configured once and then left alone; the duty cycle is
//! written exclusively by the DMA engine, directly into CCR3. With the
//! reload fixed at [`PWM_MAX`](crate::waveform::PWM_MAX), table samples
//! are raw compare codes.

use stm32h7xx_hal::{rcc::rec, stm32};

use crate::waveform::PWM_MAX;

pub struct PwmCarrier {
    tim: stm32::TIM3,
}

impl PwmCarrier {
    /// Configure TIM3 for PWM mode 1 on channel 3 and start the carrier
    /// with a 0% duty cycle.
    ///
    /// The channel pin must already be in its alternate function (see
    /// [`gpio::DutyPin`](crate::board::gpio::DutyPin)).
    pub fn init(tim: stm32::TIM3, prec: rec::Tim3) -> Self {
        let _ = prec.enable().reset();

        tim.psc.write(|w| unsafe { w.bits(0) });
        tim.arr.write(|w| unsafe { w.bits(PWM_MAX as u32) });
        tim.ccr3.write(|w| unsafe { w.bits(0) });
        // PWM mode 1 with the compare register preloaded; a DMA write
        // takes effect at the next update event, never mid-period.
        tim.ccmr2_output()
            .modify(|_, w| unsafe { w.oc3m().bits(0b110).oc3pe().set_bit() });
        tim.ccer.modify(|_, w| w.cc3e().set_bit());
        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Address of the duty-cycle register, the fixed DMA destination.
    pub fn duty_addr(&self) -> u32 {
        &self.tim.ccr3 as *const _ as u32
    }
}
