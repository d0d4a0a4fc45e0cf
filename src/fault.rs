//! Fault taxonomy and an interrupt-safe fault latch.
//!
//! There is no supervisory layer above this firmware, so fatal faults end
//! in a terminal halt; everything else is latched here for diagnostics
//! and handled locally at the call site.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

/// Why the firmware degraded or stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault recorded.
    None = 0,

    /// A peripheral failed to configure at startup. Fatal: the system
    /// halts with interrupts disabled rather than drive an unconfigured
    /// timer or DMA engine.
    Config = 1,

    /// A requested sample rate was rejected at configuration time.
    RateUnrepresentable = 2,

    /// The DMA engine reported a transfer error mid-stream. The transfer
    /// is aborted and the PWM output freezes at its last duty value.
    Stream = 3,

    /// The display collaborator did not respond. Ignored, never retried.
    Display = 4,
}

impl FaultCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::Config,
            2 => FaultCode::RateUnrepresentable,
            3 => FaultCode::Stream,
            4 => FaultCode::Display,
            _ => FaultCode::None,
        }
    }
}

/// Lock-free fault latch, shared as a `static` between interrupt handlers
/// and whatever wants to inspect it.
pub struct FaultState {
    active: AtomicBool,
    code: AtomicU8,
    count: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Latch a fault and bump the cumulative counter.
    #[inline]
    pub fn record(&self, code: FaultCode) {
        self.code.store(code as u8, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.active.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Most recently latched code (meaningful while active).
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    /// Total faults since boot. Never reset, for diagnostics.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Clear the active flag; the counter is preserved.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_records_and_clears() {
        let fault = FaultState::new();
        assert!(!fault.is_active());
        assert_eq!(fault.code(), FaultCode::None);

        fault.record(FaultCode::Stream);
        assert!(fault.is_active());
        assert_eq!(fault.code(), FaultCode::Stream);
        assert_eq!(fault.count(), 1);

        fault.clear();
        assert!(!fault.is_active());
        assert_eq!(fault.count(), 1);
    }

    #[test]
    fn count_accumulates_across_faults() {
        let fault = FaultState::new();
        fault.record(FaultCode::Display);
        fault.clear();
        fault.record(FaultCode::RateUnrepresentable);
        fault.clear();
        fault.record(FaultCode::Stream);
        assert_eq!(fault.count(), 3);
        assert_eq!(fault.code(), FaultCode::Stream);
    }
}
