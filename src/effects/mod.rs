//! Effectful sequencing built on Stillwater 0.11.0.
//!
//! This module is the "imperative shell" around the pure [`core`](crate::core)
//! and [`table`](crate::table): everything here touches the [`Stage`](crate::stage::Stage)
//! or waits on a timer.
//!
//! # Key Concepts
//!
//! - **Popup Controller**: show/hide one popup with its enter and exit timing
//! - **Video Controller**: load and play a media reference, accept its end signal
//! - **Sequencer**: owns the runtime record and chains the two controllers
//!
//! Controllers return `impl Effect` with the stage as environment; the
//! sequencer composes them and boxes only where a chain branches.

mod error;
mod popup;
mod sequencer;
mod video;

pub use error::SequenceError;
pub use popup::PopupController;
pub use sequencer::{Dispatch, IgnoreReason, Sequencer, DEFAULT_HISTORY_LIMIT};
pub use video::VideoController;
