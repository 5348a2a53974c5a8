//! Weighted Multi-Day Moving Average Predictor
//!
//! ## Overview
//!
//! The primary duty-cycle algorithm. Where the EWMA variant only knows
//! "how much energy does this slot usually yield", this one also knows
//! *what kind of day it is having*: it keeps a matrix of per-slot samples
//! for the last `DAYS` days, compares the last few samples of today
//! against the mean of past days at the same time of day, and weights
//! those comparisons by recency. A ratio above one reads as a sunny day,
//! below one as a cloudy day.
//!
//! ## Data layout
//!
//! ```text
//! prediction matrix (DAYS × SLOTS), most recent completed day first:
//!   row 0   [ e e e e e e ... ]   yesterday
//!   row 1   [ e e e e e e ... ]   the day before
//!   ...
//! current-day row (SLOTS), written one slot at a time:
//!           [ e e e · · · ... ]
//!                  ↑ day_index
//! ```
//!
//! At day rollover the matrix rows shift down by one, the completed
//! current-day row becomes row 0, and the slot cursor resets. The
//! current-day row is *not* purged: slots past the cursor keep the
//! previous day's samples until overwritten. Two published behaviors
//! depend on that: [`Wcma::last_24h_average`] averages the full row
//! (including stale or not-yet-sampled slots), and the quotient window wraps
//! into those stale samples early in the day. Both are intentional and
//! preserved; see the method docs.

use crate::config::Config;
use crate::hal::{EnergySource, Seconds};
use crate::predictor::{clamp_slices, SlicePredictor, SliceSchedule};

/// WCMA duty-cycle predictor.
///
/// ## Type Parameters
///
/// - `DAYS`: retained history depth in days (matrix rows, *D*)
/// - `SLOTS`: duty-cycle slots per day (matrix columns, *N*)
/// - `SAMPLES`: recent samples entering the sunny/cloudy indicator (*K*)
///
/// The reference deployment runs `Wcma<4, 48, 3>`.
#[derive(Debug, Clone)]
pub struct Wcma<const DAYS: usize, const SLOTS: usize, const SAMPLES: usize> {
    /// Per-slot history of the last `DAYS` completed days, row 0 newest
    matrix: [[f32; SLOTS]; DAYS],

    /// Today's samples, merged into the matrix at day rollover
    current_day: [f32; SLOTS],

    /// Quotient vector V of the last replan
    quotient: [f32; SAMPLES],

    /// Time-distance weights P, `weight[k] = (k+1) / SAMPLES`
    weights: [f32; SAMPLES],

    /// Slot currently being sampled, 0..`SLOTS`
    day_index: usize,

    /// Energy observed at the last replan
    energy_current_slot: f32,

    /// Forecast produced by the last replan (diagnostic)
    last_forecast: f32,

    weighting_factor: f32,
    energy_per_storage_cycle: f32,
    slot_length: Seconds,

    schedule: SliceSchedule,
}

impl<const DAYS: usize, const SLOTS: usize, const SAMPLES: usize> Wcma<DAYS, SLOTS, SAMPLES> {
    /// Creates a predictor carrying its share of `config`.
    ///
    /// History starts zeroed; call
    /// [`initialize`](SlicePredictor::initialize) before the first slot.
    pub fn new(config: &Config) -> Self {
        let mut weights = [0.0; SAMPLES];
        for (k, weight) in weights.iter_mut().enumerate() {
            *weight = (k + 1) as f32 / SAMPLES as f32;
        }

        Self {
            matrix: [[0.0; SLOTS]; DAYS],
            current_day: [0.0; SLOTS],
            quotient: [0.0; SAMPLES],
            weights,
            day_index: 0,
            energy_current_slot: 0.0,
            last_forecast: 0.0,
            weighting_factor: config.weighting_factor,
            energy_per_storage_cycle: config.energy_per_storage_cycle,
            slot_length: config.min_duty_cycle,
            schedule: SliceSchedule::new(config.min_duty_cycle),
        }
    }

    /// Slot the next sample will land in, 0..`SLOTS`.
    pub const fn day_index(&self) -> usize {
        self.day_index
    }

    /// The prediction matrix, row 0 the most recently completed day.
    pub const fn prediction_matrix(&self) -> &[[f32; SLOTS]; DAYS] {
        &self.matrix
    }

    /// Today's per-slot samples; slots past the cursor hold stale
    /// carry-over from the previous day.
    pub const fn current_day(&self) -> &[f32; SLOTS] {
        &self.current_day
    }

    /// Unweighted mean of the past `DAYS` days at `slot` (M_D).
    pub fn mean_past_days(&self, slot: usize) -> f32 {
        let mut mean = 0.0;
        for row in &self.matrix {
            mean += row[slot];
        }
        mean / DAYS as f32
    }

    /// Quotient of today against past days over the last `SAMPLES` slots
    /// ending at the cursor (V).
    ///
    /// Values above one indicate a sunny day, below one a cloudy day.
    /// Early in the day the window wraps below slot 0 into the stale
    /// samples the previous day left in the current-day row.
    pub fn past_days_quotient(&self) -> [f32; SAMPLES] {
        let mut quotient = [0.0; SAMPLES];
        let mut slot = self.day_index;

        for k in (0..SAMPLES).rev() {
            let mean = self.mean_past_days(slot);
            // A dead history column yields a neutral-cloudy zero rather
            // than an infinite quotient.
            quotient[k] = if mean == 0.0 {
                0.0
            } else {
                self.current_day[slot] / mean
            };
            slot = if slot == 0 { SLOTS - 1 } else { slot - 1 };
        }

        quotient
    }

    /// Recency-weighted sunny/cloudy indicator:
    /// `gap = (V · P) / Σ P`.
    pub fn gap(&self) -> f32 {
        let mut dot = 0.0;
        let mut weight_sum = 0.0;

        for (v, p) in self.quotient.iter().zip(&self.weights) {
            dot += v * p;
            weight_sum += p;
        }

        dot / weight_sum
    }

    /// Energy forecast for the next slot:
    /// `α · e + gap · (1 − α) · M_D`.
    ///
    /// Computed at every replan and exposed through
    /// [`Self::last_forecast`]; the slice count is sized from
    /// [`Self::last_24h_average`] instead.
    pub fn next_prediction(&self) -> f32 {
        self.weighting_factor * self.energy_current_slot
            + self.gap() * (1.0 - self.weighting_factor) * self.mean_past_days(self.day_index)
    }

    /// Forecast produced by the most recent replan (diagnostic).
    pub const fn last_forecast(&self) -> f32 {
        self.last_forecast
    }

    /// Average of the full current-day row.
    ///
    /// Slots not yet sampled today still hold the previous day's values
    /// (or the initialization seed), so early in the day this estimate is
    /// biased toward yesterday. Published behavior - callers that want a
    /// sampled-slots-only mean must track the cursor themselves.
    pub fn last_24h_average(&self) -> f32 {
        let mut sum = 0.0;
        for v in &self.current_day {
            sum += v;
        }
        sum / SLOTS as f32
    }

    /// Shifts the matrix rows down one day and installs the completed
    /// current-day row as row 0. The current-day row keeps its values.
    fn roll_over_day(&mut self) {
        for i in (1..DAYS).rev() {
            self.matrix[i] = self.matrix[i - 1];
        }
        self.matrix[0] = self.current_day;
    }
}

impl<const DAYS: usize, const SLOTS: usize, const SAMPLES: usize> SlicePredictor
    for Wcma<DAYS, SLOTS, SAMPLES>
{
    fn initialize(&mut self, source: &mut dyn EnergySource) {
        let seed = source.read();

        self.current_day = [seed; SLOTS];
        self.matrix = [[seed; SLOTS]; DAYS];

        for (k, weight) in self.weights.iter_mut().enumerate() {
            *weight = (k + 1) as f32 / SAMPLES as f32;
        }

        self.day_index = 0;
        self.schedule.current_slice = 0;
    }

    fn recompute(&mut self, sample: f32) {
        log_debug!("wcma replan: slot {}, sample {}", self.day_index, sample);

        self.energy_current_slot = sample;
        self.current_day[self.day_index] = sample;
        self.quotient = self.past_days_quotient();
        self.last_forecast = self.next_prediction();

        let last_24h = self.last_24h_average();
        let slices = clamp_slices(
            (last_24h - self.energy_per_storage_cycle) / self.energy_per_storage_cycle + 1.0,
        );
        self.schedule.set_plan(slices, self.slot_length / slices);

        log_debug!(
            "wcma replan: mean {}, 24h avg {}, forecast {}, slices {}",
            self.mean_past_days(self.day_index),
            last_24h,
            self.last_forecast,
            slices
        );

        if self.day_index == SLOTS - 1 {
            self.roll_over_day();
            self.day_index = 0;
        } else {
            self.day_index += 1;
        }
    }

    fn schedule(&self) -> &SliceSchedule {
        &self.schedule
    }

    fn schedule_mut(&mut self) -> &mut SliceSchedule {
        &mut self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::ScriptedEnergy;

    fn small_config() -> Config {
        Config {
            seconds_per_day: 7200,
            min_duty_cycle: 1800, // 4 slots per day
            energy_per_storage_cycle: 4.0,
            ..Config::default()
        }
    }

    fn seeded<const D: usize, const S: usize, const K: usize>(seed: f32) -> Wcma<D, S, K> {
        let mut wcma = Wcma::new(&small_config());
        let samples = [seed];
        let mut source = ScriptedEnergy::new(&samples);
        wcma.initialize(&mut source);
        wcma
    }

    #[test]
    fn initialize_seeds_matrix_and_weights() {
        let wcma: Wcma<2, 4, 2> = seeded(10.0);

        assert_eq!(wcma.mean_past_days(0), 10.0);
        assert_eq!(wcma.current_day(), &[10.0; 4]);
        assert_eq!(wcma.weights, [0.5, 1.0]);
        assert_eq!(wcma.day_index(), 0);
    }

    #[test]
    fn quotient_is_unity_on_a_seeded_history() {
        let mut wcma: Wcma<2, 4, 2> = seeded(10.0);
        wcma.quotient = wcma.past_days_quotient();

        assert_eq!(wcma.quotient, [1.0, 1.0]);
        assert_eq!(wcma.gap(), 1.0);
    }

    #[test]
    fn quotient_flags_a_sunny_day() {
        let mut wcma: Wcma<2, 4, 2> = seeded(10.0);

        // Twice the historical harvest in the current slot.
        wcma.current_day[0] = 20.0;
        let quotient = wcma.past_days_quotient();

        // Most recent entry (k = SAMPLES-1) is the cursor slot; the
        // older entry wrapped to slot 3, still at the seed value.
        assert_eq!(quotient, [1.0, 2.0]);
    }

    #[test]
    fn zero_history_yields_zero_quotient() {
        let wcma: Wcma<2, 4, 2> = Wcma::new(&small_config());
        assert_eq!(wcma.past_days_quotient(), [0.0, 0.0]);
    }

    #[test]
    fn day_rollover_installs_current_day_as_row_zero() {
        let mut wcma: Wcma<2, 4, 2> = seeded(10.0);

        for _ in 0..4 {
            wcma.recompute(20.0);
        }

        assert_eq!(wcma.day_index(), 0);
        assert_eq!(wcma.prediction_matrix()[0], [20.0; 4]);
        assert_eq!(wcma.prediction_matrix()[1], [10.0; 4]);
        // Current-day row not purged after the merge.
        assert_eq!(wcma.current_day(), &[20.0; 4]);
    }

    #[test]
    fn slices_never_fall_below_one() {
        let mut wcma: Wcma<2, 4, 2> = seeded(0.0);

        for _ in 0..12 {
            wcma.recompute(0.0);
            assert_eq!(wcma.adaptive_slices(), 1);
            assert_eq!(wcma.sleep_time(), 1800);
        }
    }

    #[test]
    fn forecast_tracks_constant_input() {
        let mut wcma: Wcma<2, 4, 2> = seeded(10.0);
        wcma.recompute(10.0);

        // α·10 + 1.0·(1-α)·10 = 10 for any α.
        assert_eq!(wcma.last_forecast(), 10.0);
    }

    #[test]
    fn last_24h_average_includes_unsampled_slots() {
        let mut wcma: Wcma<2, 4, 2> = seeded(10.0);

        // One slot of a brighter day: average moves 1/SLOTS of the way.
        wcma.recompute(30.0);
        assert_eq!(wcma.last_24h_average(), 15.0);
    }
}
