//! Sample-clock arithmetic: table length and signal frequency to timer
//! reload values, with explicit failure instead of silent wrapping.

/// Ticks of the sample timer between successive samples (`reload + 1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleInterval(u32);

impl SampleInterval {
    #[inline]
    pub fn ticks(self) -> u32 {
        self.0
    }

    /// The auto-reload value that produces this interval.
    #[inline]
    pub fn reload(self) -> u32 {
        self.0 - 1
    }
}

/// The requested sample rate cannot be produced by the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateError {
    Unrepresentable,
}

/// `f_tick = f_signal * N`: the DMA-trigger rate that plays one full table
/// per signal period.
///
/// Fails when the product overflows or is zero.
pub fn tick_rate(table_len: usize, signal_hz: u32) -> Result<u32, RateError> {
    if table_len > u32::MAX as usize {
        return Err(RateError::Unrepresentable);
    }
    match signal_hz.checked_mul(table_len as u32) {
        Some(f) if f > 0 => Ok(f),
        _ => Err(RateError::Unrepresentable),
    }
}

/// Timer ticks per sample for a table of `table_len` entries played at
/// `signal_hz`, rounded to the nearest tick.
///
/// An interval below 2 ticks (a zero reload stalls the counter) or a
/// reload beyond the 32-bit counter is rejected rather than clamped.
pub fn sample_interval(
    timer_clk_hz: u32,
    table_len: usize,
    signal_hz: u32,
) -> Result<SampleInterval, RateError> {
    let f_tick = tick_rate(table_len, signal_hz)? as u64;
    let ticks = (timer_clk_hz as u64 + f_tick / 2) / f_tick;
    if ticks < 2 || ticks > u32::MAX as u64 {
        return Err(RateError::Unrepresentable);
    }
    Ok(SampleInterval(ticks as u32))
}
