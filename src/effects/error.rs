//! Errors raised by sequencing effects.

use crate::table::{MediaRef, PopupId};
use thiserror::Error;

/// Errors produced while driving the stage.
///
/// None of these are fatal: the sequencer logs them and carries on as if the
/// step had succeeded with no visible effect.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SequenceError {
    #[error("Playback of '{media}' was rejected: {reason}")]
    PlaybackRejected { media: MediaRef, reason: String },

    #[error("No surface registered for popup '{0}'")]
    MissingPopupSurface(PopupId),
}
