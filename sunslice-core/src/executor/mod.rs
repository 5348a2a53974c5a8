//! Interrupt-Driven State-Machine Executor
//!
//! ## Overview
//!
//! The executor owns a table of state handlers and a table of interrupt
//! bindings, and drives the node's life: invoke the current state, sleep
//! if the state asked for it, resume strictly when a bound hardware
//! interrupt fires, dispatch its handler, and loop on whatever state the
//! handler selected. There is no terminal state - the machine runs until
//! the node loses power or is reset.
//!
//! ## Execution model
//!
//! One logical thread of control plus preemptive interrupt contexts. The
//! main loop is the only code path that suspends, and it suspends in
//! exactly one place: the sleep request between state invocations. State
//! handlers may run the predictor; interrupt handlers may only touch the
//! shared [`StatusBlock`].
//!
//! ```text
//!   ┌────────────────────────────────────────────────┐
//!   │  dispatch table[status.next_state]             │
//!   │      handler mutates status, arms alarm        │
//!   │  want_to_sleep?                                │
//!   │      yes → enter(sleep_mode) ── interrupt ──┐  │
//!   │            service bound handler ←──────────┘  │
//!   │            anchor && still sleepy? → re-enter  │
//!   └────────────────────────────────────────────────┘
//! ```
//!
//! ## Wake semantics
//!
//! A wake from a *non-anchor* binding always proceeds to the next state,
//! whether or not the handler touched the sleep flag - a timer alarm means
//! the slot is due, full stop. *Anchor* bindings are serviced on the
//! executor's stack before the sleep decision and may keep the node asleep
//! by leaving `want_to_sleep` set; that is how a byte-level serial
//! protocol accumulates a frame across many interrupts without ever waking
//! the application states.
//!
//! Wakes from sources with no binding are treated as spurious and the node
//! goes straight back to sleep.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

#[cfg(feature = "std")]
use std::boxed::Box;

use heapless::Vec;

use crate::errors::ExecutorError;
use crate::hal::{InterruptSource, SleepController};

mod status;

pub use status::StatusBlock;

/// Maximum number of application states the table holds.
pub const MAX_STATES: usize = 8;

/// Maximum number of interrupt bindings the table holds.
pub const MAX_BINDINGS: usize = 8;

/// Identifier of an application state; the index into the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateId(pub u8);

/// An application state handler.
///
/// `C` is the application context - predictor, sensors, radio session,
/// whatever the states share. The handler reads and mutates the status
/// record to select the next state and request sleep, and returns a
/// continuation flag: `false` halts the executor and is reserved for
/// unrecoverable configuration trouble discovered at runtime. Every state
/// in a healthy node returns `true`.
///
/// Closures `FnMut(&mut C, &StatusBlock) -> bool` implement this trait.
pub trait State<C> {
    /// Runs the state once.
    fn enter(&mut self, ctx: &mut C, status: &StatusBlock) -> bool;

    /// Name for logs and diagnostics.
    fn name(&self) -> &'static str {
        "state"
    }
}

impl<C, F> State<C> for F
where
    F: FnMut(&mut C, &StatusBlock) -> bool,
{
    fn enter(&mut self, ctx: &mut C, status: &StatusBlock) -> bool {
        self(ctx, status)
    }
}

/// An interrupt service handler.
///
/// Runs logically in interrupt context: it must complete quickly, never
/// block, and touch nothing but the status record. Its whole job is to
/// decide the next state from the interrupt source and current status,
/// and to clear `want_to_sleep` when immediate re-evaluation is required.
///
/// Closures `FnMut(&StatusBlock, u32)` implement this trait.
pub trait InterruptHandler {
    /// Services one interrupt; `data` is the source's latched word.
    fn service(&mut self, status: &StatusBlock, data: u32);
}

impl<F> InterruptHandler for F
where
    F: FnMut(&StatusBlock, u32),
{
    fn service(&mut self, status: &StatusBlock, data: u32) {
        self(status, data)
    }
}

/// One interrupt binding: source line, anchor flag, handler.
struct Binding<'h> {
    source: InterruptSource,
    anchor: bool,
    handler: Box<dyn InterruptHandler + 'h>,
}

/// The state-machine executor.
///
/// Built through [`ExecutorBuilder`], which validates the configuration
/// before anything runs. Holds the [`StatusBlock`] shared with interrupt
/// handlers.
pub struct Executor<'h, C> {
    states: Vec<Box<dyn State<C> + 'h>, MAX_STATES>,
    bindings: Vec<Binding<'h>, MAX_BINDINGS>,
    status: StatusBlock,
    initial: StateId,
}

impl<'h, C> Executor<'h, C> {
    /// Starts building an executor.
    pub fn builder() -> ExecutorBuilder<'h, C> {
        ExecutorBuilder::new()
    }

    /// The status record shared with interrupt handlers.
    pub fn status(&self) -> &StatusBlock {
        &self.status
    }

    /// Runs the machine until a handler halts it.
    ///
    /// Under normal operation this never returns; the returned value is
    /// the fault that stopped the node.
    pub fn run(&mut self, ctx: &mut C, sleep: &mut dyn SleepController) -> ExecutorError {
        loop {
            if let Err(fault) = self.step(ctx, sleep) {
                return fault;
            }
        }
    }

    /// One iteration of the machine: a single state invocation followed,
    /// if requested, by the sleep window.
    ///
    /// Exposed so hosts and tests can drive the machine a bounded number
    /// of iterations; on hardware, [`Self::run`] is the entry point.
    pub fn step(
        &mut self,
        ctx: &mut C,
        sleep: &mut dyn SleepController,
    ) -> Result<(), ExecutorError> {
        // Fresh read: an interrupt may have changed it at any point.
        let mut id = self.status.next_state();

        if id.0 as usize >= self.states.len() {
            // An interrupt handed us a state we never registered. Fall
            // back to the initial state rather than faulting mid-flight.
            log_warn!("unknown state {}, falling back to initial", id.0);
            id = self.initial;
            self.status.set_next_state(id);
        }

        let state = &mut self.states[id.0 as usize];
        log_debug!("dispatching state {} ({})", id.0, state.name());

        if !state.enter(ctx, &self.status) {
            return Err(ExecutorError::Halted { id: id.0 });
        }

        if self.status.want_to_sleep() {
            self.sleep_until_wake(sleep);
            self.status.set_want_to_sleep(false);
        }

        Ok(())
    }

    /// The single suspension point: sleeps until a wake that warrants
    /// running the next state.
    fn sleep_until_wake(&mut self, sleep: &mut dyn SleepController) {
        loop {
            let wake = sleep.enter(self.status.sleep_mode());

            match self
                .bindings
                .iter_mut()
                .find(|binding| binding.source == wake.source)
            {
                Some(binding) => {
                    binding.handler.service(&self.status, wake.data);

                    if binding.anchor && self.status.want_to_sleep() {
                        // Mid-frame anchor service; keep sleeping.
                        continue;
                    }
                    return;
                }
                None => {
                    log_warn!("spurious wake from source {}", wake.source.0);
                }
            }
        }
    }
}

/// Builder for [`Executor`]; collects tables, then validates.
///
/// States are registered in identifier order: the first
/// [`state`](Self::state) call becomes `StateId(0)`, the next `StateId(1)`,
/// and so on.
pub struct ExecutorBuilder<'h, C> {
    states: Vec<Box<dyn State<C> + 'h>, MAX_STATES>,
    bindings: Vec<Binding<'h>, MAX_BINDINGS>,
    initial: StateId,
    restore_clock_setting: bool,
    overflowed: bool,
}

impl<'h, C> ExecutorBuilder<'h, C> {
    /// Creates an empty builder; initial state defaults to `StateId(0)`.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            bindings: Vec::new(),
            initial: StateId(0),
            restore_clock_setting: true,
            overflowed: false,
        }
    }

    /// Registers the next state handler.
    pub fn state(mut self, state: impl State<C> + 'h) -> Self {
        if self.states.push(Box::new(state)).is_err() {
            self.overflowed = true;
        }
        self
    }

    /// Registers an interrupt binding.
    ///
    /// `anchor` bindings are serviced on the executor's stack before the
    /// sleep decision and may keep the node asleep; use for time-critical
    /// byte-level protocols such as serial ingestion.
    pub fn binding(
        mut self,
        source: InterruptSource,
        anchor: bool,
        handler: impl InterruptHandler + 'h,
    ) -> Self {
        let binding = Binding {
            source,
            anchor,
            handler: Box::new(handler),
        };
        if self.bindings.push(binding).is_err() {
            self.overflowed = true;
        }
        self
    }

    /// Selects the state dispatched first (and on unknown-state fallback).
    pub fn initial(mut self, id: StateId) -> Self {
        self.initial = id;
        self
    }

    /// Controls clock-tree restoration after deep sleep.
    pub fn restore_clock_setting(mut self, restore: bool) -> Self {
        self.restore_clock_setting = restore;
        self
    }

    /// Validates the configuration and produces the executor.
    ///
    /// An empty state table, an empty binding table, a table overflow or
    /// an out-of-range initial state is fatal here, before `run` can ever
    /// start.
    pub fn build(self) -> Result<Executor<'h, C>, ExecutorError> {
        if self.overflowed {
            return Err(ExecutorError::TableFull);
        }
        if self.states.is_empty() {
            return Err(ExecutorError::NoStates);
        }
        if self.bindings.is_empty() {
            return Err(ExecutorError::NoBindings);
        }
        if self.initial.0 as usize >= self.states.len() {
            return Err(ExecutorError::UnknownInitialState { id: self.initial.0 });
        }

        let status = StatusBlock::new(self.initial);
        status.set_interrupt_count(self.bindings.len() as u8);
        status.set_restore_clock_setting(self.restore_clock_setting);

        Ok(Executor {
            states: self.states,
            bindings: self.bindings,
            status,
            initial: self.initial,
        })
    }
}

impl<C> Default for ExecutorBuilder<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{ScriptedSleep, WakeEvent};

    const TIMER: InterruptSource = InterruptSource(0);

    fn noop_isr(_: &StatusBlock, _: u32) {}

    #[test]
    fn build_rejects_empty_state_table() {
        let result = Executor::<()>::builder()
            .binding(TIMER, false, noop_isr)
            .build();
        assert_eq!(result.err(), Some(ExecutorError::NoStates));
    }

    #[test]
    fn build_rejects_empty_binding_table() {
        let result = Executor::<()>::builder()
            .state(|_: &mut (), _: &StatusBlock| true)
            .build();
        assert_eq!(result.err(), Some(ExecutorError::NoBindings));
    }

    #[test]
    fn build_rejects_out_of_range_initial_state() {
        let result = Executor::<()>::builder()
            .state(|_: &mut (), _: &StatusBlock| true)
            .binding(TIMER, false, noop_isr)
            .initial(StateId(4))
            .build();
        assert_eq!(
            result.err(),
            Some(ExecutorError::UnknownInitialState { id: 4 })
        );
    }

    #[test]
    fn interrupt_count_reflects_bindings() {
        let executor = Executor::<()>::builder()
            .state(|_: &mut (), _: &StatusBlock| true)
            .binding(TIMER, false, noop_isr)
            .binding(InterruptSource(1), false, noop_isr)
            .build()
            .unwrap();

        assert_eq!(executor.status().interrupt_count(), 2);
    }

    #[test]
    fn halting_state_stops_the_machine() {
        let mut executor = Executor::<()>::builder()
            .state(|_: &mut (), _: &StatusBlock| false)
            .binding(TIMER, false, noop_isr)
            .build()
            .unwrap();

        let mut sleep = ScriptedSleep::new(&[]);
        assert_eq!(
            executor.step(&mut (), &mut sleep),
            Err(ExecutorError::Halted { id: 0 })
        );
    }

    #[test]
    fn unknown_next_state_falls_back_to_initial() {
        let mut visits = 0_u32;
        let mut executor = Executor::builder()
            .state(|count: &mut u32, _: &StatusBlock| {
                *count += 1;
                true
            })
            .binding(TIMER, false, noop_isr)
            .build()
            .unwrap();

        executor.status().set_next_state(StateId(7));

        let mut sleep = ScriptedSleep::new(&[]);
        executor.step(&mut visits, &mut sleep).unwrap();

        assert_eq!(visits, 1);
        assert_eq!(executor.status().next_state(), StateId(0));
    }

    #[test]
    fn spurious_wake_goes_back_to_sleep() {
        let mut executor = Executor::<()>::builder()
            .state(|_: &mut (), status: &StatusBlock| {
                status.set_want_to_sleep(true);
                true
            })
            .binding(TIMER, false, noop_isr)
            .build()
            .unwrap();

        // First wake is from an unbound line; only the second counts.
        let wakes = [
            WakeEvent {
                source: InterruptSource(9),
                data: 0,
            },
            WakeEvent {
                source: TIMER,
                data: 0,
            },
        ];
        let mut sleep = ScriptedSleep::new(&wakes);

        executor.step(&mut (), &mut sleep).unwrap();
        assert_eq!(sleep.sleeps(), 2);
    }
}
