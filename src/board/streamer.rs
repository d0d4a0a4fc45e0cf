//! Duty-cycle streamer: DMA1 stream 5, memory-to-peripheral circular
//! transfers from the active table into the PWM compare register, paced
//! by TIM2 update requests through DMAMUX1.

use stm32h7xx_hal::{rcc::rec, stm32};

use crate::streamer::{DutyStreamer, StreamerState};

/// DMAMUX1 request line for TIM2_UP (RM0433 table 121).
const TIM2_UP_REQ: u8 = 22;

/// Stream index on DMA1; its flags live in the high ISR bank.
const STREAM: usize = 5;

pub struct DutyCycleDma {
    dma: stm32::DMA1,
    state: StreamerState,
}

impl DutyCycleDma {
    /// Take ownership of DMA1 and route TIM2 update requests to stream 5.
    ///
    /// `duty_addr` is the PWM compare register the transfers write to; it
    /// is programmed once per arm and never changes mid-stream.
    pub fn new(
        dma: stm32::DMA1,
        prec: rec::Dma1,
        mux: stm32::DMAMUX1,
        duty_addr: u32,
    ) -> Self {
        let _ = prec.enable().reset();
        mux.ccr[STREAM].modify(|_, w| unsafe { w.dmareq_id().bits(TIM2_UP_REQ) });
        dma.st[STREAM].par.write(|w| unsafe { w.bits(duty_addr) });

        Self {
            dma,
            state: StreamerState::Idle,
        }
    }

    /// Stale stream flags must be clear before EN is set again.
    fn clear_flags(&self) {
        self.dma.hifcr.write(|w| {
            w.ctcif5().set_bit();
            w.chtif5().set_bit();
            w.cteif5().set_bit();
            w.cdmeif5().set_bit();
            w.cfeif5().set_bit()
        });
    }
}

impl DutyStreamer for DutyCycleDma {
    fn arm(&mut self, samples: &'static [u16]) {
        debug_assert_eq!(self.state, StreamerState::Idle);

        let st = &self.dma.st[STREAM];
        self.clear_flags();
        st.m0ar.write(|w| unsafe { w.bits(samples.as_ptr() as u32) });
        st.ndtr.write(|w| unsafe { w.bits(samples.len() as u32) });
        // 16-bit memory-to-peripheral, memory increment, circular so the
        // index wraps from the end of the table with no CPU involvement.
        // Transfer errors raise the stream interrupt.
        st.cr.write(|w| unsafe {
            w.dir().bits(0b01); // memory -> peripheral
            w.minc().set_bit();
            w.pinc().clear_bit();
            w.msize().bits(0b01); // 16-bit
            w.psize().bits(0b01);
            w.circ().set_bit();
            w.pl().bits(0b10); // high priority
            w.teie().set_bit()
        });
        st.cr.modify(|_, w| w.en().set_bit());

        self.state = StreamerState::Streaming;
    }

    fn abort(&mut self) {
        let st = &self.dma.st[STREAM];
        st.cr.modify(|_, w| w.en().clear_bit());
        // EN reads back set until the engine has drained; the caller must
        // not rebind source or length before that.
        while st.cr.read().en().bit_is_set() {}
        self.clear_flags();
        self.state = StreamerState::Idle;
    }

    fn state(&self) -> StreamerState {
        self.state
    }

    fn take_fault(&mut self) -> bool {
        if self.dma.hisr.read().teif5().bit_is_set() {
            self.dma.hifcr.write(|w| w.cteif5().set_bit());
            true
        } else {
            false
        }
    }
}
