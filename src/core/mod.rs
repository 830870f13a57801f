//! Pure core of the sequencer.
//!
//! This module contains the logic-free building blocks:
//! - Phase definitions via the `State` trait
//! - The re-entrancy guard
//! - Phase change history
//! - The sequencer's runtime record
//!
//! Nothing in here touches a surface or waits on a timer.

mod guard;
mod history;
mod macros;
mod state;

pub use guard::TransitionGuard;
pub use history::{PhaseChange, PhaseHistory};
pub use state::{Phase, PopupPhase, SequencerState, State};
