//! Monotonic millisecond source: TIM5 free-running at 10 kHz.
//!
//! Wraps after roughly five days; consumers compare timestamps with
//! wrapping arithmetic.

use stm32h7xx_hal::{rcc::rec, rcc::CoreClocks, stm32};

const TICK_RATE_HZ: u32 = 10_000;
const TICKS_PER_MS: u32 = TICK_RATE_HZ / 1_000;

pub struct MilliTick {
    tim: stm32::TIM5,
}

impl MilliTick {
    pub fn new(tim: stm32::TIM5, prec: rec::Tim5, clocks: &CoreClocks) -> Self {
        let _ = prec.enable().reset();

        let psc = clocks.timx_ker_ck().raw() / TICK_RATE_HZ - 1;
        debug_assert!(psc <= u16::MAX as u32);
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(u32::MAX) });
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Milliseconds since the counter started, wrapping.
    #[inline]
    pub fn now_ms(&self) -> u32 {
        self.tim.cnt.read().bits() / TICKS_PER_MS
    }
}
