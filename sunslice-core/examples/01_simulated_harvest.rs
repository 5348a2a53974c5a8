//! Simulated Harvest Example
//!
//! This example runs the weighted multi-day predictor over three simulated
//! days of solar harvest: two ordinary days followed by one bright day.
//!
//! ## What You'll Learn
//!
//! - Creating and seeding a WCMA predictor
//! - How one duty-cycle slot subdivides into slices as harvest grows
//! - Reading the sunny/cloudy quotient and the slot forecast
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_simulated_harvest
//! ```

use sunslice_core::hal::{EnergySource, RecordingTimer};
use sunslice_core::{Config, SlicePredictor, Wcma};

const SLOTS_PER_DAY: usize = 8;

/// A half-sine "sun" profile, positioned by the simulation loop.
///
/// Every read within one slot returns the same harvest value, the way a
/// panel current barely moves across one slot's slices.
struct SimulatedSun {
    day: usize,
    slot: usize,
    day_scale: [f32; 3],
}

impl SimulatedSun {
    fn new() -> Self {
        Self {
            day: 0,
            slot: 0,
            // Two ordinary days, then a bright one.
            day_scale: [1.0, 1.0, 2.0],
        }
    }

    fn set_position(&mut self, day: usize, slot: usize) {
        self.day = day;
        self.slot = slot;
    }
}

impl EnergySource for SimulatedSun {
    fn read(&mut self) -> f32 {
        let phase = self.slot as f32 / SLOTS_PER_DAY as f32;

        // Harvest peaks mid-day; the floor keeps night slots nonzero.
        let sun = (std::f32::consts::PI * phase).sin();
        0.02 + 0.2 * sun * self.day_scale[self.day.min(self.day_scale.len() - 1)]
    }
}

fn main() {
    println!("Sunslice Simulated Harvest Example");
    println!("==================================\n");

    let config = Config {
        seconds_per_day: 14_400,
        min_duty_cycle: 1_800, // 8 slots per day
        energy_per_storage_cycle: 0.05,
        ..Config::default()
    };

    // Three days of retained history, eight slots, three-sample window.
    let mut predictor: Wcma<3, 8, 3> = Wcma::new(&config);
    let mut sun = SimulatedSun::new();
    let mut timer = RecordingTimer::new();

    predictor.initialize(&mut sun);
    println!("Predictor seeded; one slice per slot to start.\n");

    for day in 0..3 {
        println!("Day {}:", day + 1);
        println!("  slot  energy   slices  sleep  quotient  forecast");

        for slot in 0..SLOTS_PER_DAY {
            sun.set_position(day, slot);

            // One full slot: every slice wakes the node once; only the
            // last wake replans. Drive all of them like the executor would.
            let slices = predictor.adaptive_slices();
            let mut energy = 0.0;
            for _ in 0..slices {
                energy = predictor.tick(&mut sun, &mut timer);
            }

            let quotient = predictor.past_days_quotient();
            println!(
                "  {:4}  {:6.3}  {:6}  {:5}  {:8.2}  {:8.3}",
                slot,
                energy,
                slices,
                predictor.sleep_time(),
                quotient[quotient.len() - 1],
                predictor.last_forecast(),
            );
        }

        println!();
    }

    println!(
        "Final alarm request: {} s ({} arm requests total)",
        timer.armed.unwrap_or(0),
        timer.arm_count
    );
}
