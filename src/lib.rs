//! Reelpath: a branching video/popup presentation sequencer
//!
//! Reelpath is built on Stillwater's "pure core, imperative shell" philosophy.
//! The sequence table, phases and guard are plain data with pure operations,
//! while everything that touches a surface or waits on a timer is an Effect
//! run against a [`Stage`].
//!
//! # Core Concepts
//!
//! - **Sequence Table**: which media each node plays and which popup follows
//! - **Transition Guard**: drops requests while a transition is in flight
//! - **Popup / Video Controllers**: timed show/hide and load/play effects
//! - **Sequencer**: the single owner of the runtime record
//!
//! # Example
//!
//! ```rust
//! use reelpath::stage::recording::Recorder;
//! use reelpath::{sequence_table, Phase, Sequencer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let table = sequence_table! {
//!     popups: [popup1];
//!     walk1: "assets/videos/walk1.mp4" => popup1,
//! }
//! .unwrap();
//!
//! let recorder = Recorder::new();
//! let sequencer = Sequencer::new(table, recorder.stage(["popup1"]));
//!
//! sequencer.request_transition("walk1").finished().await;
//! assert_eq!(sequencer.state().phase(), Phase::Playing);
//! # }
//! ```

pub mod config;
pub mod core;
pub mod effects;
pub mod presenter;
pub mod stage;
pub mod table;

// Re-export commonly used types
pub use config::{ConfigError, PresentationConfig, Timing};
pub use core::{Phase, PhaseHistory, PopupPhase, SequencerState, State};
pub use effects::{Dispatch, IgnoreReason, SequenceError, Sequencer};
pub use presenter::{Exit, Input, Presenter};
pub use stage::Stage;
pub use table::{MediaRef, NodeId, PopupId, SequenceNode, SequenceTable};
