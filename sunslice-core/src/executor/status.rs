//! Shared Status Record
//!
//! The one piece of state both the main control loop and interrupt
//! handlers touch. From the main loop's perspective every field can change
//! at any instruction boundary, so the record is a set of lock-free
//! atomics: each read is a fresh acquire load, each write a release store,
//! and nothing is ever cached across the sleep boundary.
//!
//! Interrupt handlers get momentary shared access (`&StatusBlock`) and
//! limit themselves to deciding the next state and the sleep flag; the
//! multi-step predictor state is never reachable from here.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::executor::StateId;
use crate::hal::SleepMode;

/// Status record shared between the executor and interrupt handlers.
///
/// Lives for the whole process; initialized once at configuration time and
/// mutated continuously afterwards.
#[derive(Debug)]
pub struct StatusBlock {
    /// State the executor dispatches next
    next_state: AtomicU8,

    /// Set by a state handler to request sleep; an interrupt clears it to
    /// force immediate re-evaluation
    want_to_sleep: AtomicBool,

    /// Power mode for the next sleep period
    sleep_mode: AtomicU8,

    /// Whether the clock tree is restored after deep sleep
    restore_clock_setting: AtomicBool,

    /// Number of interrupt bindings registered at configuration
    interrupt_count: AtomicU8,
}

impl StatusBlock {
    /// Creates a record dispatching `initial` first, awake, stop-mode.
    pub const fn new(initial: StateId) -> Self {
        Self {
            next_state: AtomicU8::new(initial.0),
            want_to_sleep: AtomicBool::new(false),
            sleep_mode: AtomicU8::new(SleepMode::Stop as u8),
            restore_clock_setting: AtomicBool::new(true),
            interrupt_count: AtomicU8::new(0),
        }
    }

    /// State the executor will dispatch next. Fresh load on every call.
    pub fn next_state(&self) -> StateId {
        StateId(self.next_state.load(Ordering::Acquire))
    }

    /// Selects the state the executor dispatches next.
    pub fn set_next_state(&self, state: StateId) {
        self.next_state.store(state.0, Ordering::Release);
    }

    /// Whether the current state asked to sleep before the next dispatch.
    pub fn want_to_sleep(&self) -> bool {
        self.want_to_sleep.load(Ordering::Acquire)
    }

    /// Requests (`true`) or cancels (`false`) the pending sleep.
    pub fn set_want_to_sleep(&self, sleep: bool) {
        self.want_to_sleep.store(sleep, Ordering::Release);
    }

    /// Power mode the next sleep period will use.
    pub fn sleep_mode(&self) -> SleepMode {
        SleepMode::from_bits(self.sleep_mode.load(Ordering::Acquire))
    }

    /// Selects the power mode for subsequent sleep periods.
    pub fn set_sleep_mode(&self, mode: SleepMode) {
        self.sleep_mode.store(mode.bits(), Ordering::Release);
    }

    /// Whether the clock tree is restored after deep sleep.
    pub fn restore_clock_setting(&self) -> bool {
        self.restore_clock_setting.load(Ordering::Acquire)
    }

    /// Controls clock-tree restoration after deep sleep.
    pub fn set_restore_clock_setting(&self, restore: bool) {
        self.restore_clock_setting.store(restore, Ordering::Release);
    }

    /// Number of interrupt bindings registered at configuration time.
    pub fn interrupt_count(&self) -> u8 {
        self.interrupt_count.load(Ordering::Acquire)
    }

    pub(crate) fn set_interrupt_count(&self, count: u8) {
        self.interrupt_count.store(count, Ordering::Release);
    }
}
