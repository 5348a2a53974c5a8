//! Hardware Collaborator Interfaces
//!
//! The core never talks to hardware directly. Everything it needs from the
//! platform - an energy reading, an alarm, a way to suspend - comes through
//! the narrow traits in this module, so the predictor and executor run
//! unchanged on real silicon and in host tests.
//!
//! The contract is deliberately infallible: collaborators return best-effort
//! values rather than errors, because the core has no retry or fallback
//! policy of its own. A flaky sensor yields a skewed sample, not a fault.
//!
//! Test doubles (`ScriptedEnergy`, `RecordingTimer`, `ScriptedSleep`) live
//! here next to the traits so unit tests, integration tests and examples
//! share one set of mocks.

/// Whole seconds, the resolution of the wake alarm.
pub type Seconds = u32;

/// Instantaneous harvested-energy source.
///
/// On the reference node this is the solar panel current serving as a
/// luminance proxy; any monotonic energy proxy works.
pub trait EnergySource {
    /// Reads one sample, in joules or a proxy unit. Best-effort, never fails.
    fn read(&mut self) -> f32;
}

/// Hardware wake alarm. Fires exactly one interrupt at expiry.
pub trait AlarmTimer {
    /// Arms the alarm `seconds` from now, replacing any pending alarm.
    fn arm(&mut self, seconds: Seconds);

    /// Cancels a pending alarm, if any.
    fn disarm(&mut self);
}

/// Processor power mode requested while suspended.
///
/// The ladder mirrors the energy modes of the reference MCU: higher
/// variants shut down more of the chip and cost more to wake from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SleepMode {
    /// Core clock gated only
    Idle = 0,
    /// Peripherals clocked down
    Light = 1,
    /// RAM retained, high-frequency oscillators off
    Deep = 2,
    /// Only the RTC and wake logic powered
    Stop = 3,
}

impl SleepMode {
    /// Decodes a mode from its stored representation.
    ///
    /// Unknown values fall back to [`SleepMode::Stop`], the conservative
    /// (deepest) choice for an unattended node.
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::Idle,
            1 => Self::Light,
            2 => Self::Deep,
            _ => Self::Stop,
        }
    }

    /// Stored representation of the mode.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Identifier of a hardware interrupt source (IRQ line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptSource(pub u8);

/// What woke the processor: the source line and its data word.
///
/// The data word carries whatever the line latched - a GPIO mask for pin
/// interrupts, the received byte for serial interrupts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeEvent {
    /// Interrupt line that fired
    pub source: InterruptSource,
    /// Source-specific data word
    pub data: u32,
}

/// Low-power sleep control.
pub trait SleepController {
    /// Enters `mode` and blocks until an enabled interrupt fires.
    ///
    /// Returns the wake event so the caller can dispatch the bound
    /// handler. This is the single suspension point of the whole core.
    fn enter(&mut self, mode: SleepMode) -> WakeEvent;
}

/// Energy source fed from a canned sample sequence.
///
/// Replays `samples` in order, then repeats the final sample forever -
/// convenient for "constant input from here on" scenarios.
#[derive(Debug, Clone)]
pub struct ScriptedEnergy<'a> {
    samples: &'a [f32],
    pos: usize,
}

impl<'a> ScriptedEnergy<'a> {
    /// Creates a source over a non-empty sample script.
    pub fn new(samples: &'a [f32]) -> Self {
        assert!(!samples.is_empty(), "energy script must not be empty");
        Self { samples, pos: 0 }
    }

    /// Number of samples consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl EnergySource for ScriptedEnergy<'_> {
    fn read(&mut self) -> f32 {
        let sample = self.samples[self.pos.min(self.samples.len() - 1)];
        self.pos += 1;
        sample
    }
}

/// Alarm timer that records what the core asked of it.
#[derive(Debug, Clone, Default)]
pub struct RecordingTimer {
    /// Most recent arm request, cleared by `disarm`
    pub armed: Option<Seconds>,
    /// Total number of arm requests
    pub arm_count: u32,
}

impl RecordingTimer {
    /// Creates an idle timer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlarmTimer for RecordingTimer {
    fn arm(&mut self, seconds: Seconds) {
        self.armed = Some(seconds);
        self.arm_count += 1;
    }

    fn disarm(&mut self) {
        self.armed = None;
    }
}

/// Sleep controller that replays a scripted sequence of wake events.
///
/// Panics when the script runs dry - in a test that means the executor
/// slept more often than the scenario allowed.
#[derive(Debug, Clone)]
pub struct ScriptedSleep<'a> {
    events: &'a [WakeEvent],
    pos: usize,
    /// Modes the core requested, most recent last
    pub modes: heapless::Vec<SleepMode, 16>,
}

impl<'a> ScriptedSleep<'a> {
    /// Creates a controller over a wake-event script.
    pub fn new(events: &'a [WakeEvent]) -> Self {
        Self {
            events,
            pos: 0,
            modes: heapless::Vec::new(),
        }
    }

    /// Number of sleep periods entered so far.
    pub fn sleeps(&self) -> usize {
        self.pos
    }
}

impl SleepController for ScriptedSleep<'_> {
    fn enter(&mut self, mode: SleepMode) -> WakeEvent {
        let _ = self.modes.push(mode);
        let event = self.events[self.pos];
        self.pos += 1;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_energy_repeats_last_sample() {
        let samples = [1.0, 2.0];
        let mut source = ScriptedEnergy::new(&samples);

        assert_eq!(source.read(), 1.0);
        assert_eq!(source.read(), 2.0);
        assert_eq!(source.read(), 2.0);
        assert_eq!(source.consumed(), 3);
    }

    #[test]
    fn recording_timer_tracks_requests() {
        let mut timer = RecordingTimer::new();
        timer.arm(600);
        timer.arm(300);

        assert_eq!(timer.armed, Some(300));
        assert_eq!(timer.arm_count, 2);

        timer.disarm();
        assert_eq!(timer.armed, None);
    }

    #[test]
    fn sleep_mode_round_trips_and_saturates() {
        assert_eq!(SleepMode::from_bits(SleepMode::Deep.bits()), SleepMode::Deep);
        assert_eq!(SleepMode::from_bits(0xFF), SleepMode::Stop);
    }
}
