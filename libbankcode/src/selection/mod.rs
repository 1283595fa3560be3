//! Selection state machine
//!
//! - State: what the user has selected and what is loaded
//! - Effects: fetches and notifications a transition asks for
//! - Machine: the transitions themselves
//!
//! The machine is synchronous and performs no I/O, so every interleaving of
//! user actions and fetch completions can be replayed deterministically.

pub mod effects;
pub mod machine;
pub mod state;

pub use effects::{Completion, Effect, FetchRequest, Outcome, Query};
pub use machine::SelectionStateMachine;
pub use state::{Phase, Selection, Snapshot};
