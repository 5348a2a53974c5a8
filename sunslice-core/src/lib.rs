//! Adaptive duty-cycle core for energy-harvesting sensor nodes
//!
//! Decides, slot by slot, how often a node may wake, sample and transmit
//! without exhausting its energy buffer, and drives execution through a
//! small set of discrete states woken by hardware interrupts.
//!
//! Key constraints:
//! - Runs on battery/solar nodes with a few KB of RAM
//! - No heap allocation in the per-wake path
//! - Resumes strictly from hardware interrupts; one suspension point
//!
//! ```no_run
//! use sunslice_core::{Config, SlicePredictor, Wcma};
//! use sunslice_core::hal::{RecordingTimer, ScriptedEnergy};
//!
//! let config = Config::default();
//! let mut predictor: Wcma<4, 48, 3> = Wcma::new(&config);
//!
//! let samples = [0.05_f32; 8];
//! let mut panel = ScriptedEnergy::new(&samples);
//! let mut timer = RecordingTimer::new();
//!
//! predictor.initialize(&mut panel);
//!
//! // One wake-up: count or replan, then re-arm the alarm.
//! let energy = predictor.tick(&mut panel, &mut timer);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Optional logging shims; calls compile away without the `log` feature.
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod buffer;
pub mod config;
pub mod errors;
pub mod executor;
pub mod hal;
pub mod predictor;
pub mod wire;

// Public API
pub use buffer::Ring;
pub use config::Config;
pub use errors::{ConfigError, ExecutorError, FrameError};
pub use executor::{Executor, ExecutorBuilder, State, StateId, StatusBlock};
pub use predictor::{Ewma, SlicePredictor, SliceSchedule, Wcma};

/// Crate version string, taken from the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
