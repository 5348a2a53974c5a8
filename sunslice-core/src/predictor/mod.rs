//! Adaptive Duty-Cycle Predictors
//!
//! ## Overview
//!
//! The predictor answers one question once per duty-cycle slot: given the
//! energy the node has been harvesting, how many sampling slices may the
//! next slot hold? More harvest means more slices (shorter sleeps); lean
//! harvest collapses a slot to a single slice.
//!
//! Two interchangeable variants satisfy the same contract:
//!
//! - [`Ewma`]: an exponentially-weighted moving average over one day of
//!   per-slot history. Cheap, memory-light, slow to track weather changes.
//! - [`Wcma`]: a weighted multi-day moving average that compares today
//!   against the same time-of-day on previous days and scales by a
//!   sunny/cloudy indicator. The primary, more accurate algorithm.
//!
//! ## Slots and slices
//!
//! A *slot* is one fixed duty-cycle period (`min_duty_cycle` seconds). The
//! predictor subdivides it into `adaptive_slices` equal *slices*, each one
//! wake-up. Only the last slice of a slot replans; every other slice just
//! counts, re-arms the alarm with the previously computed interval, and
//! goes back to sleep. [`SlicePredictor::tick`] implements exactly that
//! alternation, shared by both variants.
//!
//! ## Numeric policy
//!
//! Slice counts are integers ≥ 1 - a slot with zero slices would never be
//! scheduled, so the node could never wake again. Rounding is uniformly
//! `ceil`, which errs toward sampling more than the harvest estimate
//! strictly supports. Non-finite intermediate values collapse to the
//! one-slice minimum rather than propagating.

use crate::hal::{AlarmTimer, EnergySource, Seconds};

pub mod ewma;
pub mod wcma;

pub use ewma::Ewma;
pub use wcma::Wcma;

/// Per-slot execution position and plan shared by both predictor variants.
///
/// `adaptive_slices` and `sleep_time` are recomputed exactly once per slot,
/// at its last slice; `current_slice` walks 0..`adaptive_slices` between
/// replans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSchedule {
    pub(crate) current_slice: u32,
    pub(crate) adaptive_slices: u32,
    pub(crate) sleep_time: Seconds,
}

impl SliceSchedule {
    /// A fresh schedule: one slice per slot, sleeping a whole slot.
    pub const fn new(slot_length: Seconds) -> Self {
        Self {
            current_slice: 0,
            adaptive_slices: 1,
            sleep_time: slot_length,
        }
    }

    /// Slice currently being executed, 0-based within the slot.
    pub const fn current_slice(&self) -> u32 {
        self.current_slice
    }

    /// Number of slices in the current slot. Always ≥ 1.
    pub const fn adaptive_slices(&self) -> u32 {
        self.adaptive_slices
    }

    /// Seconds until the next wake-up.
    pub const fn sleep_time(&self) -> Seconds {
        self.sleep_time
    }

    /// Installs a new plan for the upcoming slot.
    ///
    /// `slices` is clamped to the one-slice minimum; a zero-slice slot
    /// would never be scheduled and the node could never wake again.
    pub fn set_plan(&mut self, slices: u32, sleep_time: Seconds) {
        self.adaptive_slices = slices.max(1);
        self.sleep_time = sleep_time;
    }

    /// True when the slot's last slice is executing and a replan is due.
    pub(crate) const fn is_last_slice(&self) -> bool {
        self.current_slice + 1 >= self.adaptive_slices
    }
}

/// Common contract of the duty-cycle predictors.
///
/// Implementors provide the per-slot replanning; the per-wake slice
/// bookkeeping ([`Self::tick`]) is shared.
pub trait SlicePredictor {
    /// Seeds the history with one measured sample.
    ///
    /// Called once at node initialization, before the first slot. Every
    /// history element is set to the sample so early averages are anchored
    /// to reality instead of the zero seed.
    fn initialize(&mut self, source: &mut dyn EnergySource);

    /// Replans the next slot from the latest energy sample.
    ///
    /// Updates the history, recomputes `adaptive_slices` (clamped to ≥ 1)
    /// and `sleep_time`. Invoked only from [`Self::tick`] on the last
    /// slice of a slot; interrupt handlers must never call this.
    fn recompute(&mut self, sample: f32);

    /// Read access to the slice schedule.
    fn schedule(&self) -> &SliceSchedule;

    /// Mutable access to the slice schedule.
    fn schedule_mut(&mut self) -> &mut SliceSchedule;

    /// Number of slices in the current slot. Always ≥ 1.
    fn adaptive_slices(&self) -> u32 {
        self.schedule().adaptive_slices()
    }

    /// Seconds the node will sleep until the next wake-up.
    fn sleep_time(&self) -> Seconds {
        self.schedule().sleep_time()
    }

    /// One wake-up: count or replan, then re-arm the alarm.
    ///
    /// On the last slice of the slot this samples the energy source,
    /// replans via [`Self::recompute`], arms the alarm with the *new*
    /// sleep interval and resets the slice counter. On any other slice it
    /// advances the counter, re-arms with the *previously* computed
    /// interval and returns a fresh sample without replanning.
    ///
    /// Returns the energy value observed at this wake-up.
    fn tick(&mut self, source: &mut dyn EnergySource, timer: &mut dyn AlarmTimer) -> f32 {
        if self.schedule().is_last_slice() {
            let sample = source.read();
            self.recompute(sample);

            timer.arm(self.schedule().sleep_time());
            self.schedule_mut().current_slice = 0;

            sample
        } else {
            log_debug!("slice {} counted", self.schedule().current_slice());

            self.schedule_mut().current_slice += 1;
            timer.arm(self.schedule().sleep_time());

            source.read()
        }
    }
}

/// Rounds a raw slice estimate up and clamps it to the one-slice minimum.
///
/// NaN and negative estimates (possible with all-zero or degenerate
/// history) land on 1, never on 0.
pub(crate) fn clamp_slices(raw: f32) -> u32 {
    let rounded = libm::ceilf(raw);
    if rounded >= 1.0 {
        rounded as u32
    } else {
        1
    }
}
