//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern, shared by both controllers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  &'static [StateDescriptor<S, C>]                           │
//! │  ┌──────────┬───────────┬──────────┬──────────────────────┐ │
//! │  │ id: S    │ on_enter  │ on_exit  │ on_update            │ │
//! │  ├──────────┼───────────┼──────────┼──────────────────────┤ │
//! │  │ S::A     │ fn(&mut C)│ fn(&mut C)│ fn(&mut C)->Option<S>│ │
//! │  │ S::B     │ fn(&mut C)│ fn(&mut C)│ fn(&mut C)->Option<S>│ │
//! │  │ ...      │           │          │                      │ │
//! │  └──────────┴───────────┴──────────┴──────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)` with `next != current`, the engine runs
//! `on_exit` for the current state, restarts the context's state clock,
//! then runs `on_enter` for the next.  Returning the current state is a
//! self-loop and runs no entry or exit actions.
//!
//! The table is indexed by [`StateId::index`]; row `i` must describe the
//! state whose index is `i`.

use core::fmt::Debug;

use log::info;

// ---------------------------------------------------------------------------
// State identity and context hooks
// ---------------------------------------------------------------------------

/// A state enum usable as a table index.
pub trait StateId: Copy + Eq + Debug + 'static {
    /// Row of this state in the descriptor table.
    fn index(self) -> usize;
}

/// Context hook run on every real transition, before `on_enter`.
///
/// Controllers use it to restart the "time in state" mark so that entry
/// actions and updates see a fresh timer.
pub trait StateClock {
    fn mark_state_entry(&mut self);
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn<C> = fn(&mut C);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn<S, C> = fn(&mut C) -> Option<S>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor<S, C> {
    pub id: S,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<C>>,
    pub on_exit: Option<StateActionFn<C>>,
    pub on_update: StateUpdateFn<S, C>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm<S: StateId, C: 'static> {
    /// Log prefix, e.g. `"LOCK"`.
    label: &'static str,
    table: &'static [StateDescriptor<S, C>],
    current: usize,
}

impl<S: StateId, C: StateClock + 'static> Fsm<S, C> {
    /// Construct a new FSM starting in `initial`.  No entry action runs
    /// until [`start`](Self::start).
    pub fn new(label: &'static str, table: &'static [StateDescriptor<S, C>], initial: S) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id.index() == i),
            "state table rows out of order"
        );
        Self {
            label,
            table,
            current: initial.index(),
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut C) {
        info!("{}: starting in {}", self.label, self.table[self.current].name);
        ctx.mark_state_entry();
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    pub fn tick(&mut self, ctx: &mut C) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            if next_id.index() != self.current {
                self.transition(next_id, ctx);
            }
        }
    }

    /// Force an immediate transition, bypassing `on_update`.  A no-op when
    /// `next` is already the current state.
    pub fn force_transition(&mut self, next: S, ctx: &mut C) {
        if next.index() != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> S {
        self.table[self.current].id
    }

    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    fn transition(&mut self, next_id: S, ctx: &mut C) {
        let next_idx = next_id.index();

        info!(
            "{}: {} -> {}",
            self.label, self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        ctx.mark_state_entry();

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
