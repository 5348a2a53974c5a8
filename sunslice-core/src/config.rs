//! Boot-Time Configuration for the Duty-Cycle Core
//!
//! All tunables the predictors consume in one plain record: day geometry,
//! per-cycle energy costs, the EWMA/WCMA weighting factor, and the storage
//! voltage thresholds. The values are fixed at boot; the only mutation path
//! afterwards is an over-the-air update frame relayed by a state handler,
//! which is validated before anything is installed.
//!
//! History dimensions (`retainDays`, `slotsPerDay`, `retainSamples`) are
//! *not* runtime configuration - they size arrays and therefore live as
//! const generic parameters on the predictors themselves.

use crate::errors::ConfigError;
use crate::wire::ConfigUpdate;

/// Duty-cycle and energy-model constants, fixed at boot.
///
/// `Default` holds the deployment values of the reference node: 48 slots
/// of 1800 s per day, α = 0.5, 0.2 mJ per sampling cycle and 40 mJ per
/// storage cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Length of one calendar day in seconds
    pub seconds_per_day: u32,

    /// Duty-cycle slot length in seconds; one slot holds one or more slices
    pub min_duty_cycle: u32,

    /// Shortest admissible wake interval in seconds
    pub max_duty_cycle: u32,

    /// Blend factor α of the predictors, strictly between 0 and 1
    pub weighting_factor: f32,

    /// Energy cost of one sample-and-transmit slice, in joules
    pub energy_per_sampling_cycle: f32,

    /// Energy cost of one storage (bookkeeping) cycle, in joules
    pub energy_per_storage_cycle: f32,

    /// Storage voltage below which the buffer counts as empty, in volts
    pub energy_storage_empty: f32,

    /// Storage voltage above which the buffer counts as full, in volts
    pub energy_storage_full: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seconds_per_day: 86_400,
            min_duty_cycle: 1_800,
            max_duty_cycle: 300,
            weighting_factor: 0.5,
            energy_per_sampling_cycle: 0.0002,
            energy_per_storage_cycle: 0.04,
            energy_storage_empty: 1.0,
            energy_storage_full: 2.5,
        }
    }
}

impl Config {
    /// Number of duty-cycle slots in one day.
    pub const fn slots_per_day(&self) -> u32 {
        self.seconds_per_day / self.min_duty_cycle
    }

    /// Checks the invariants the predictors rely on.
    ///
    /// Must pass before the node starts; the executor never re-checks at
    /// runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_duty_cycle == 0 || self.max_duty_cycle == 0 {
            return Err(ConfigError::ZeroDutyCycle);
        }
        if self.min_duty_cycle > self.seconds_per_day {
            return Err(ConfigError::SlotExceedsDay {
                seconds: self.min_duty_cycle,
            });
        }
        Self::check_weight(self.weighting_factor)?;
        Self::check_energy(self.energy_per_sampling_cycle)?;
        Self::check_energy(self.energy_per_storage_cycle)?;
        Ok(())
    }

    /// Installs an over-the-air configuration update.
    ///
    /// The frame carries the two per-cycle energy costs and the weighting
    /// factor. On rejection the configuration is left untouched.
    pub fn apply_update(&mut self, update: &ConfigUpdate) -> Result<(), ConfigError> {
        Self::check_weight(update.weighting_factor)?;
        Self::check_energy(update.energy_per_sampling_cycle)?;
        Self::check_energy(update.energy_per_storage_cycle)?;

        self.energy_per_sampling_cycle = update.energy_per_sampling_cycle;
        self.energy_per_storage_cycle = update.energy_per_storage_cycle;
        self.weighting_factor = update.weighting_factor;

        log_debug!(
            "config update installed: sampling {} J, storage {} J, alpha {}",
            self.energy_per_sampling_cycle,
            self.energy_per_storage_cycle,
            self.weighting_factor
        );

        Ok(())
    }

    fn check_weight(value: f32) -> Result<(), ConfigError> {
        // NaN fails both comparisons and is rejected with the rest.
        if value > 0.0 && value < 1.0 {
            Ok(())
        } else {
            Err(ConfigError::WeightingFactor { value })
        }
    }

    fn check_energy(value: f32) -> Result<(), ConfigError> {
        if value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NegativeEnergy { value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slots_per_day(), 48);
    }

    #[test]
    fn rejects_degenerate_weighting_factor() {
        let mut config = Config::default();

        for bad in [0.0, 1.0, -0.5, 2.0, f32::NAN] {
            config.weighting_factor = bad;
            assert!(config.validate().is_err(), "accepted alpha {bad}");
        }
    }

    #[test]
    fn rejects_zero_duty_cycle() {
        let mut config = Config::default();
        config.min_duty_cycle = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDutyCycle));
    }

    #[test]
    fn rejects_slot_longer_than_day() {
        let mut config = Config::default();
        config.min_duty_cycle = config.seconds_per_day + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SlotExceedsDay { .. })
        ));
    }

    #[test]
    fn update_is_all_or_nothing() {
        let mut config = Config::default();
        let before = config;

        let update = ConfigUpdate {
            energy_per_sampling_cycle: 0.0004,
            energy_per_storage_cycle: 0.02,
            weighting_factor: 1.5,
        };

        assert!(config.apply_update(&update).is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn update_installs_all_three_fields() {
        let mut config = Config::default();

        let update = ConfigUpdate {
            energy_per_sampling_cycle: 0.0004,
            energy_per_storage_cycle: 0.02,
            weighting_factor: 0.7,
        };

        config.apply_update(&update).unwrap();
        assert_eq!(config.energy_per_sampling_cycle, 0.0004);
        assert_eq!(config.energy_per_storage_cycle, 0.02);
        assert_eq!(config.weighting_factor, 0.7);
    }
}
