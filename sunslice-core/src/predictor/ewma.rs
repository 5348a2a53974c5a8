//! Exponentially-Weighted Moving Average Predictor
//!
//! The lightweight variant: one day of per-slot history in a single ring,
//! blended with each new sample by a fixed factor α. Memory cost is one
//! `f32` per slot. Reacts to weather changes only as fast as α lets the
//! blend move, which is why the multi-day [`Wcma`](super::Wcma) variant is
//! the default on nodes that can afford its matrix.

use crate::buffer::Ring;
use crate::config::Config;
use crate::hal::{EnergySource, Seconds};
use crate::predictor::{clamp_slices, SlicePredictor, SliceSchedule};

/// EWMA duty-cycle predictor over `SLOTS` per-slot history entries.
///
/// `SLOTS` is the number of duty-cycle slots per day
/// ([`Config::slots_per_day`]); the ring then spans exactly one day.
#[derive(Debug, Clone)]
pub struct Ewma<const SLOTS: usize> {
    history: Ring<f32, SLOTS>,

    weighting_factor: f32,
    energy_per_sampling_cycle: f32,
    energy_per_storage_cycle: f32,
    slot_length: Seconds,

    schedule: SliceSchedule,
}

impl<const SLOTS: usize> Ewma<SLOTS> {
    /// Creates a predictor carrying its share of `config`.
    ///
    /// The history starts zeroed; call
    /// [`initialize`](SlicePredictor::initialize) before the first slot.
    pub fn new(config: &Config) -> Self {
        Self {
            history: Ring::new(),
            weighting_factor: config.weighting_factor,
            energy_per_sampling_cycle: config.energy_per_sampling_cycle,
            energy_per_storage_cycle: config.energy_per_storage_cycle,
            slot_length: config.min_duty_cycle,
            schedule: SliceSchedule::new(config.min_duty_cycle),
        }
    }

    /// Average of the historical per-slot window.
    pub fn historical_average(&self) -> f32 {
        self.history.average()
    }
}

impl<const SLOTS: usize> SlicePredictor for Ewma<SLOTS> {
    fn initialize(&mut self, source: &mut dyn EnergySource) {
        self.history.fill(source.read());
        self.schedule.current_slice = 0;
    }

    fn recompute(&mut self, sample: f32) {
        let old = self.history.pop();
        let blended = self.weighting_factor * old + (1.0 - self.weighting_factor) * sample;

        // Averaged before the blended value is pushed, over the window
        // that still holds the slot being replaced.
        let expected_per_slot = self.history.average();

        let slices = clamp_slices(
            (expected_per_slot - self.energy_per_storage_cycle) / self.energy_per_sampling_cycle
                + 1.0,
        );
        self.schedule.set_plan(slices, self.slot_length / slices);

        self.history.push(blended);

        log_debug!(
            "ewma replan: old {}, blended {}, expected {}, slices {}",
            old,
            blended,
            expected_per_slot,
            slices
        );
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
    use crate::hal::{RecordingTimer, ScriptedEnergy};

    fn test_config() -> Config {
        Config {
            min_duty_cycle: 1800,
            energy_per_sampling_cycle: 0.01,
            energy_per_storage_cycle: 0.02,
            ..Config::default()
        }
    }

    #[test]
    fn initialize_fills_history() {
        let mut ewma: Ewma<4> = Ewma::new(&test_config());
        let samples = [0.5];
        let mut source = ScriptedEnergy::new(&samples);

        ewma.initialize(&mut source);
        assert_eq!(ewma.historical_average(), 0.5);
    }

    #[test]
    fn constant_input_stabilizes_slices() {
        let mut ewma: Ewma<4> = Ewma::new(&test_config());
        let samples = [0.1];
        let mut source = ScriptedEnergy::new(&samples);
        let mut timer = RecordingTimer::new();

        ewma.initialize(&mut source);

        // With constant input e the blend is a fixed point: history stays
        // at e and the slice count satisfies the formula exactly.
        let expected = clamp_slices((0.1 - 0.02) / 0.01 + 1.0);
        for _ in 0..32 {
            ewma.tick(&mut source, &mut timer);
            assert_eq!(ewma.adaptive_slices(), expected);
        }
        assert_eq!(ewma.historical_average(), 0.1);
    }

    #[test]
    fn all_zero_input_keeps_one_slice() {
        let mut ewma: Ewma<4> = Ewma::new(&test_config());
        let samples = [0.0];
        let mut source = ScriptedEnergy::new(&samples);

        ewma.initialize(&mut source);
        for _ in 0..8 {
            ewma.recompute(0.0);
            assert_eq!(ewma.adaptive_slices(), 1);
            assert_eq!(ewma.sleep_time(), 1800);
        }
    }

    #[test]
    fn sleep_time_divides_slot_by_slices() {
        let mut ewma: Ewma<4> = Ewma::new(&test_config());
        let samples = [0.1];
        let mut source = ScriptedEnergy::new(&samples);

        ewma.initialize(&mut source);
        ewma.recompute(0.1);

        let slices = ewma.adaptive_slices();
        assert_eq!(ewma.sleep_time(), 1800 / slices);
    }
}
