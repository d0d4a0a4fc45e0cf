//! Sample clock: TIM2 free-running from the APB1 timer kernel clock,
//! raising one DMA request per update event.

use log::debug;
use stm32h7xx_hal::{rcc::rec, rcc::CoreClocks, stm32};

use crate::rate::{self, RateError, SampleInterval};
use crate::selector::SampleClock;

pub struct Tim2SampleClock {
    tim: stm32::TIM2,
    timer_clk_hz: u32,
}

impl Tim2SampleClock {
    pub fn new(tim: stm32::TIM2, prec: rec::Tim2, clocks: &CoreClocks) -> Self {
        let _ = prec.enable().reset();

        // URS: a software-forced update latches PSC/ARR without raising
        // a DMA request. ARPE so an on-the-fly reload cannot strand the
        // counter above the new ARR.
        tim.cr1.modify(|_, w| w.urs().set_bit().arpe().set_bit());
        tim.dier.modify(|_, w| w.ude().set_bit());

        Self {
            tim,
            timer_clk_hz: clocks.timx_ker_ck().raw(),
        }
    }
}

impl SampleClock for Tim2SampleClock {
    fn configure(
        &mut self,
        table_len: usize,
        signal_hz: u32,
    ) -> Result<SampleInterval, RateError> {
        // Validate before touching the counter; on error it keeps running
        // at the previous rate.
        let interval = rate::sample_interval(self.timer_clk_hz, table_len, signal_hz)?;

        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
        self.tim.psc.write(|w| unsafe { w.bits(0) });
        self.tim.arr.write(|w| unsafe { w.bits(interval.reload()) });
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
        self.tim.egr.write(|w| w.ug().set_bit());

        debug!(
            "sample clock: {} ticks per sample ({} Hz timer)",
            interval.ticks(),
            self.timer_clk_hz
        );
        Ok(interval)
    }

    fn start(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    fn stop(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
    }
}
