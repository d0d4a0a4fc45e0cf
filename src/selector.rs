//! Waveform selector: the state machine that swaps the active table
//! without racing the DMA engine.
//!
//! The selector owns the streamer, the sample clock, the notifier and the
//! shared `ActiveWaveform` state; nothing else touches them. Callers run
//! [`Selector::on_button_edge`] and [`Selector::on_stream_fault`] from
//! interrupt context under whatever masking keeps the two from
//! interleaving (an RTIC resource lock in the firmware). The handlers do
//! no blocking work beyond the streamer's bounded quiesce wait.

use crate::display::Notifier;
use crate::fault::{FaultCode, FaultState};
use crate::rate::{RateError, SampleInterval};
use crate::streamer::DutyStreamer;
use crate::waveform::Waveform;

/// Rate source for the streamer: a hardware counter producing one DMA
/// trigger per output sample.
pub trait SampleClock {
    /// Recompute and apply the interval for `table_len` entries at
    /// `signal_hz`.
    ///
    /// Validation happens before any register is touched: on error the
    /// counter keeps its previous configuration and run state. On success
    /// the counter is left stopped, ready for [`start`](Self::start).
    fn configure(
        &mut self,
        table_len: usize,
        signal_hz: u32,
    ) -> Result<SampleInterval, RateError>;

    /// Run the counter from the start of its period.
    fn start(&mut self);

    fn stop(&mut self);
}

/// The currently selected table and its derived sample interval.
///
/// Mutated only inside the selector's switch sequence, while the streamer
/// is halted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveWaveform {
    pub waveform: Waveform,
    pub interval: SampleInterval,
}

/// What a button edge amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The next waveform is streaming.
    Applied(Waveform),
    /// The edge fell inside the debounce window and was discarded.
    Bounced,
    /// The next table's rate was unrepresentable; the previous table
    /// keeps streaming.
    Rejected(RateError),
}

pub struct Selector<S, C, N> {
    streamer: S,
    clock: C,
    notifier: N,
    fault: &'static FaultState,
    signal_hz: u32,
    active: ActiveWaveform,
    last_accepted_ms: Option<u32>,
}

impl<S, C, N> Selector<S, C, N>
where
    S: DutyStreamer,
    C: SampleClock,
    N: Notifier,
{
    /// Power-on sequence: configure the default Sine table, arm the
    /// streamer against it, start the sample clock and report the name.
    ///
    /// Fails only if the default rate itself is unrepresentable, which is
    /// a configuration fault for the caller to escalate.
    pub fn start(
        mut streamer: S,
        mut clock: C,
        notifier: N,
        fault: &'static FaultState,
        signal_hz: u32,
    ) -> Result<Self, RateError> {
        let table = Waveform::Sine.table();
        let interval = clock.configure(table.samples.len(), signal_hz)?;
        streamer.arm(table.samples);
        clock.start();
        let mut sel = Self {
            streamer,
            clock,
            notifier,
            fault,
            signal_hz,
            active: ActiveWaveform {
                waveform: Waveform::Sine,
                interval,
            },
            last_accepted_ms: None,
        };
        sel.notify(table.name);
        Ok(sel)
    }

    /// Handle one debounced-candidate button edge at `now_ms` (monotonic
    /// milliseconds, wrapping).
    pub fn on_button_edge(&mut self, now_ms: u32) -> SwitchOutcome {
        if let Some(last) = self.last_accepted_ms {
            if now_ms.wrapping_sub(last) < crate::DEBOUNCE_WINDOW_MS {
                return SwitchOutcome::Bounced;
            }
        }

        let next = self.active.waveform.next();
        let table = next.table();

        // The engine must be fully quiesced before table or rate change.
        self.streamer.abort();

        let interval = match self.clock.configure(table.samples.len(), self.signal_hz) {
            Ok(interval) => interval,
            Err(e) => {
                // Clock untouched on failure; put the previous table back.
                let prev = self.active.waveform.table();
                self.streamer.arm(prev.samples);
                self.clock.start();
                self.fault.record(FaultCode::RateUnrepresentable);
                log::warn!("rate for {} unrepresentable, keeping {}", table.name, prev.name);
                self.last_accepted_ms = Some(now_ms);
                return SwitchOutcome::Rejected(e);
            }
        };

        self.active = ActiveWaveform {
            waveform: next,
            interval,
        };
        self.streamer.arm(table.samples);
        self.clock.start();

        self.notify(table.name);
        self.last_accepted_ms = Some(now_ms);
        SwitchOutcome::Applied(next)
    }

    /// Service a transfer-error interrupt from the streamer's engine.
    ///
    /// Returns `true` if a fault was pending. The stream falls back to
    /// idle and the PWM output freezes at its last duty value; recovery
    /// is the user's next waveform switch.
    pub fn on_stream_fault(&mut self) -> bool {
        if !self.streamer.take_fault() {
            return false;
        }
        self.streamer.abort();
        self.clock.stop();
        self.fault.record(FaultCode::Stream);
        log::error!("stream fault: transfer aborted, output frozen");
        true
    }

    #[inline]
    pub fn active(&self) -> ActiveWaveform {
        self.active
    }

    #[inline]
    pub fn waveform(&self) -> Waveform {
        self.active.waveform
    }

    fn notify(&mut self, name: &'static str) {
        if let Err(e) = self.notifier.show(name) {
            self.fault.record(FaultCode::Display);
            log::warn!("display update failed: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayError;
    use crate::rate;
    use crate::streamer::StreamerState;
    use crate::DEBOUNCE_WINDOW_MS;

    const TIMER_CLK: u32 = 200_000_000;

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    enum Op {
        Abort,
        Arm(*const u16, usize),
    }

    struct MockStreamer {
        state: StreamerState,
        ops: Vec<Op>,
        fault_pending: bool,
    }

    impl MockStreamer {
        fn new() -> Self {
            Self {
                state: StreamerState::Idle,
                ops: Vec::new(),
                fault_pending: false,
            }
        }

        fn armed(&self) -> Option<(*const u16, usize)> {
            self.ops.iter().rev().find_map(|op| match op {
                Op::Arm(p, n) => Some((*p, *n)),
                Op::Abort => None,
            })
        }
    }

    impl DutyStreamer for MockStreamer {
        fn arm(&mut self, samples: &'static [u16]) {
            assert_eq!(self.state, StreamerState::Idle, "armed while streaming");
            self.ops.push(Op::Arm(samples.as_ptr(), samples.len()));
            self.state = StreamerState::Streaming;
        }

        fn abort(&mut self) {
            self.ops.push(Op::Abort);
            self.state = StreamerState::Idle;
        }

        fn state(&self) -> StreamerState {
            self.state
        }

        fn take_fault(&mut self) -> bool {
            core::mem::take(&mut self.fault_pending)
        }
    }

    struct MockClock {
        running: bool,
        fail_next: bool,
    }

    impl MockClock {
        fn new() -> Self {
            Self {
                running: false,
                fail_next: false,
            }
        }
    }

    impl SampleClock for MockClock {
        fn configure(
            &mut self,
            table_len: usize,
            signal_hz: u32,
        ) -> Result<SampleInterval, RateError> {
            if core::mem::take(&mut self.fail_next) {
                return Err(RateError::Unrepresentable);
            }
            let interval = rate::sample_interval(TIMER_CLK, table_len, signal_hz)?;
            self.running = false;
            Ok(interval)
        }

        fn start(&mut self) {
            self.running = true;
        }

        fn stop(&mut self) {
            self.running = false;
        }
    }

    struct MockNotifier {
        shown: Vec<&'static str>,
        fail: bool,
    }

    impl MockNotifier {
        fn new() -> Self {
            Self {
                shown: Vec::new(),
                fail: false,
            }
        }
    }

    impl Notifier for MockNotifier {
        fn show(&mut self, name: &'static str) -> Result<(), DisplayError> {
            self.shown.push(name);
            if self.fail {
                Err(DisplayError::Unresponsive)
            } else {
                Ok(())
            }
        }
    }

    fn fault_slot() -> &'static FaultState {
        Box::leak(Box::new(FaultState::new()))
    }

    fn started() -> Selector<MockStreamer, MockClock, MockNotifier> {
        Selector::start(
            MockStreamer::new(),
            MockClock::new(),
            MockNotifier::new(),
            fault_slot(),
            crate::DEFAULT_SIGNAL_HZ,
        )
        .unwrap()
    }

    #[test]
    fn startup_streams_sine_and_shows_it() {
        let sel = started();
        assert_eq!(sel.waveform(), Waveform::Sine);
        assert_eq!(sel.notifier.shown, vec!["Sine"]);
        assert_eq!(sel.streamer.state(), StreamerState::Streaming);
        assert!(sel.clock.running);
        let sine = Waveform::Sine.table().samples;
        assert_eq!(sel.streamer.armed(), Some((sine.as_ptr(), sine.len())));
    }

    #[test]
    fn one_edge_advances_to_saw() {
        let mut sel = started();
        assert_eq!(
            sel.on_button_edge(1_000),
            SwitchOutcome::Applied(Waveform::Saw)
        );
        assert_eq!(sel.waveform(), Waveform::Saw);
        assert_eq!(
            sel.active().interval,
            rate::sample_interval(TIMER_CLK, 128, crate::DEFAULT_SIGNAL_HZ).unwrap()
        );
        assert_eq!(sel.notifier.shown.last(), Some(&"Saw"));
    }

    #[test]
    fn edges_inside_the_window_are_discarded() {
        let mut sel = started();
        assert_eq!(
            sel.on_button_edge(1_000),
            SwitchOutcome::Applied(Waveform::Saw)
        );
        assert_eq!(
            sel.on_button_edge(1_000 + DEBOUNCE_WINDOW_MS - 1),
            SwitchOutcome::Bounced
        );
        assert_eq!(sel.waveform(), Waveform::Saw);
        // a bounce does not move the baseline
        assert_eq!(
            sel.on_button_edge(1_000 + DEBOUNCE_WINDOW_MS),
            SwitchOutcome::Applied(Waveform::Triangle)
        );
    }

    #[test]
    fn full_cycle_restores_the_initial_state() {
        let mut sel = started();
        let initial = sel.active();
        let mut t = 1_000;
        for _ in 0..Waveform::COUNT {
            assert!(matches!(sel.on_button_edge(t), SwitchOutcome::Applied(_)));
            t += 100;
        }
        assert_eq!(sel.active(), initial);
    }

    #[test]
    fn abort_always_precedes_rearm() {
        let mut sel = started();
        let mut t = 1_000;
        for _ in 0..10 {
            sel.on_button_edge(t);
            t += 100;
        }
        // every arm after the first must directly follow an abort
        let ops = &sel.streamer.ops;
        for (i, op) in ops.iter().enumerate() {
            if let Op::Arm(..) = op {
                if i > 0 {
                    assert_eq!(ops[i - 1], Op::Abort);
                }
            }
        }
    }

    #[test]
    fn armed_table_and_length_always_pair() {
        let mut sel = started();
        let mut t = 1_000;
        for _ in 0..25 {
            sel.on_button_edge(t);
            t += 100;
        }
        let canonical: Vec<(*const u16, usize)> = [
            Waveform::Sine,
            Waveform::Saw,
            Waveform::Triangle,
            Waveform::Piano,
            Waveform::Guitar,
            Waveform::Drum,
        ]
        .iter()
        .map(|w| {
            let s = w.table().samples;
            (s.as_ptr(), s.len())
        })
        .collect();
        for op in &sel.streamer.ops {
            if let Op::Arm(ptr, len) = op {
                assert!(
                    canonical.contains(&(*ptr, *len)),
                    "torn (table, length) pair observed"
                );
            }
        }
    }

    #[test]
    fn rate_failure_keeps_the_previous_table() {
        let mut sel = started();
        sel.clock.fail_next = true;
        assert_eq!(
            sel.on_button_edge(1_000),
            SwitchOutcome::Rejected(RateError::Unrepresentable)
        );
        assert_eq!(sel.waveform(), Waveform::Sine);
        assert_eq!(sel.streamer.state(), StreamerState::Streaming);
        assert!(sel.clock.running);
        let sine = Waveform::Sine.table().samples;
        assert_eq!(sel.streamer.armed(), Some((sine.as_ptr(), sine.len())));
        assert_eq!(sel.fault.code(), FaultCode::RateUnrepresentable);
        // the next waveform was never shown
        assert_eq!(sel.notifier.shown, vec!["Sine"]);
    }

    #[test]
    fn display_failure_never_blocks_a_switch() {
        let mut sel = started();
        sel.notifier.fail = true;
        assert_eq!(
            sel.on_button_edge(1_000),
            SwitchOutcome::Applied(Waveform::Saw)
        );
        assert_eq!(sel.waveform(), Waveform::Saw);
        assert!(sel.fault.is_active());
        assert_eq!(sel.fault.code(), FaultCode::Display);
    }

    #[test]
    fn stream_fault_aborts_to_idle() {
        let mut sel = started();
        sel.streamer.fault_pending = true;
        assert!(sel.on_stream_fault());
        assert_eq!(sel.streamer.state(), StreamerState::Idle);
        assert!(!sel.clock.running);
        assert_eq!(sel.fault.code(), FaultCode::Stream);
    }

    #[test]
    fn spurious_fault_interrupt_is_a_no_op() {
        let mut sel = started();
        let ops_before = sel.streamer.ops.len();
        assert!(!sel.on_stream_fault());
        assert_eq!(sel.streamer.ops.len(), ops_before);
        assert_eq!(sel.streamer.state(), StreamerState::Streaming);
    }

    #[test]
    fn debounce_wraps_with_the_tick_counter() {
        let mut sel = started();
        assert!(matches!(
            sel.on_button_edge(u32::MAX - 10),
            SwitchOutcome::Applied(_)
        ));
        // 20 ms later, across the wrap: still inside the window
        assert_eq!(sel.on_button_edge(9), SwitchOutcome::Bounced);
        // well past the window after wrapping
        assert!(matches!(
            sel.on_button_edge(DEBOUNCE_WINDOW_MS + 20),
            SwitchOutcome::Applied(_)
        ));
    }
}
