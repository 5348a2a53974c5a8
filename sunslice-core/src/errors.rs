//! Error Types for the Duty-Cycle Core
//!
//! ## Design Philosophy
//!
//! The node runs unattended and unreachable, so almost nothing here is an
//! error: numeric degeneracies (empty averaging windows, slice counts below
//! one) are absorbed into conservative defaults at the point they occur and
//! never surface. What remains are the faults that must stop the node
//! *before* it starts - malformed configuration - plus the wire-format
//! decode failures a state handler may want to report.
//!
//! All variants are small, `Copy`, and heap-free: payloads are scalars or
//! `&'static str`, so errors can be returned from hot paths and stored in
//! fixed-size records without allocation.

use thiserror_no_std::Error;

/// Invalid boot-time or over-the-air configuration.
///
/// Any of these prevents the predictor from producing meaningful slice
/// counts, so they are rejected before the value is installed.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Weighting factor must lie strictly between 0 and 1
    #[error("weighting factor {value} outside (0, 1)")]
    WeightingFactor {
        /// The rejected factor
        value: f32,
    },

    /// A zero-length duty cycle cannot be subdivided into slices
    #[error("duty cycle length must be nonzero")]
    ZeroDutyCycle,

    /// Slot length must divide the day into at least one slot
    #[error("slot length {seconds}s exceeds one day")]
    SlotExceedsDay {
        /// The rejected slot length in seconds
        seconds: u32,
    },

    /// Per-cycle energy costs cannot be negative
    #[error("negative energy constant {value}")]
    NegativeEnergy {
        /// The rejected energy value in joules
        value: f32,
    },
}

/// Fatal state-machine configuration or execution faults.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorError {
    /// The state table is empty; there is nothing to run
    #[error("state table is empty")]
    NoStates,

    /// No interrupt bindings: the node could never be woken again
    #[error("interrupt binding table is empty")]
    NoBindings,

    /// More states or bindings registered than the tables can hold
    #[error("state or binding table capacity exceeded")]
    TableFull,

    /// The configured initial state is not in the table
    #[error("initial state {id} is not registered")]
    UnknownInitialState {
        /// The unregistered state identifier
        id: u8,
    },

    /// A state handler returned `false`, halting the machine
    #[error("state {id} halted the executor")]
    Halted {
        /// Identifier of the halting state
        id: u8,
    },
}

/// Wire-format decode failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than the fixed frame layout requires
    #[error("frame truncated: need {required} bytes, have {available}")]
    Truncated {
        /// Bytes the layout requires
        required: usize,
        /// Bytes actually supplied
        available: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::WeightingFactor { value } => {
                defmt::write!(fmt, "weighting factor {} outside (0, 1)", value)
            }
            Self::ZeroDutyCycle => defmt::write!(fmt, "duty cycle length must be nonzero"),
            Self::SlotExceedsDay { seconds } => {
                defmt::write!(fmt, "slot length {}s exceeds one day", seconds)
            }
            Self::NegativeEnergy { value } => {
                defmt::write!(fmt, "negative energy constant {}", value)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ExecutorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NoStates => defmt::write!(fmt, "state table is empty"),
            Self::NoBindings => defmt::write!(fmt, "interrupt binding table is empty"),
            Self::TableFull => defmt::write!(fmt, "table capacity exceeded"),
            Self::UnknownInitialState { id } => {
                defmt::write!(fmt, "initial state {} is not registered", id)
            }
            Self::Halted { id } => defmt::write!(fmt, "state {} halted the executor", id),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FrameError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Truncated {
                required,
                available,
            } => defmt::write!(fmt, "frame truncated: need {}, have {}", required, available),
        }
    }
}
