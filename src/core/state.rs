//! Phase trait and the sequencer's runtime record.
//!
//! Phases are plain values describing where the presentation is in its
//! lifecycle. `SequencerState` is the one mutable record the sequencer owns.

use crate::core::guard::TransitionGuard;
use crate::table::{NodeId, PopupId};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for lifecycle phases.
///
/// All methods are pure. Phases are small copyable values that can be
/// recorded in a [`PhaseHistory`](crate::core::PhaseHistory) and logged.
///
/// # Example
///
/// ```rust
/// use reelpath::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Curtain {
///     Closed,
///     Opening,
///     Open,
/// }
///
/// impl State for Curtain {
///     fn name(&self) -> &str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Opening => "Opening",
///             Self::Open => "Open",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Open)
///     }
/// }
///
/// assert!(Curtain::Open.is_final());
/// assert!(!Curtain::Opening.is_error());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Whether nothing further happens from this phase without outside help.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Whether this phase is a degraded outcome.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}

crate::phase_enum! {
    /// Where the sequencer is between two steady states.
    ///
    /// ```text
    /// Idle -> ExitingPopup -> Loading -> Playing | Stalled
    /// Playing -> Frozen -> Blurred -> RevealingPopup -> AwaitingInput
    ///                             \-> DeadEnd
    /// ```
    pub enum Phase {
        /// Nothing is playing and no popup is up.
        Idle,
        /// The active popup is running its exit animation.
        ExitingPopup,
        /// A source was assigned and playback start is pending.
        Loading,
        /// Playback started.
        Playing,
        /// The host refused to start playback.
        Stalled,
        /// Playback ended and the surface is paused on its last frame.
        Frozen,
        /// The overlay is applied to the video surface.
        Blurred,
        /// The follow-up popup is entering.
        RevealingPopup,
        /// The follow-up popup is fully shown.
        AwaitingInput,
        /// The finished node has no follow-up popup.
        DeadEnd,
    }
    initial: Idle
    final: [DeadEnd]
    error: [Stalled]
}

crate::phase_enum! {
    /// Visual lifecycle of a single popup surface.
    pub enum PopupPhase {
        Hidden,
        Entering,
        Active,
        Exiting,
    }
    initial: Hidden
}

impl Phase {
    /// Whether the follow-up chain after a media end is still running.
    ///
    /// Transition requests are dropped in these phases so the popup that is
    /// about to enter is never orphaned.
    pub fn is_revealing(self) -> bool {
        matches!(self, Self::Frozen | Self::Blurred | Self::RevealingPopup)
    }
}

/// The sequencer's single mutable runtime record.
///
/// `active_popup` is only ever set while that popup is fully shown, and the
/// guard stays engaged from the moment a transition is accepted until the
/// next steady state is reached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequencerState {
    current_node: Option<NodeId>,
    guard: TransitionGuard,
    active_popup: Option<PopupId>,
    phase: Phase,
}

impl SequencerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node most recently loaded, `None` before the first load.
    pub fn current_node(&self) -> Option<&NodeId> {
        self.current_node.as_ref()
    }

    /// Whether a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.guard.is_engaged()
    }

    /// Popup currently fully shown.
    pub fn active_popup(&self) -> Option<&PopupId> {
        self.active_popup.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn try_begin(&mut self) -> bool {
        self.guard.try_engage()
    }

    pub(crate) fn finish(&mut self) {
        self.guard.release();
    }

    pub(crate) fn load(&mut self, node: NodeId) {
        self.current_node = Some(node);
    }

    pub(crate) fn set_active_popup(&mut self, popup: PopupId) {
        self.active_popup = Some(popup);
    }

    pub(crate) fn clear_active_popup(&mut self) -> Option<PopupId> {
        self.active_popup.take()
    }

    /// Move to `phase`, returning the phase left behind.
    pub(crate) fn enter(&mut self, phase: Phase) -> Phase {
        std::mem::replace(&mut self.phase, phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_match_variants() {
        assert_eq!(Phase::Idle.name(), "Idle");
        assert_eq!(Phase::ExitingPopup.name(), "ExitingPopup");
        assert_eq!(Phase::AwaitingInput.name(), "AwaitingInput");
        assert_eq!(PopupPhase::Exiting.name(), "Exiting");
    }

    #[test]
    fn dead_end_is_the_only_final_phase() {
        assert!(Phase::DeadEnd.is_final());
        assert!(!Phase::AwaitingInput.is_final());
        assert!(!Phase::Stalled.is_final());
    }

    #[test]
    fn stalled_is_an_error_phase() {
        assert!(Phase::Stalled.is_error());
        assert!(!Phase::Playing.is_error());
        assert!(!PopupPhase::Hidden.is_error());
    }

    #[test]
    fn follow_up_phases_are_revealing() {
        let revealing: Vec<_> = Phase::ALL
            .iter()
            .copied()
            .filter(|phase| phase.is_revealing())
            .collect();
        assert_eq!(
            revealing,
            vec![Phase::Frozen, Phase::Blurred, Phase::RevealingPopup]
        );
        assert_eq!(Phase::default(), Phase::Idle);
        assert_eq!(PopupPhase::default(), PopupPhase::Hidden);
    }

    #[test]
    fn new_state_is_idle_and_empty() {
        let state = SequencerState::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.current_node().is_none());
        assert!(state.active_popup().is_none());
        assert!(!state.is_transitioning());
    }

    #[test]
    fn begin_is_refused_while_transitioning() {
        let mut state = SequencerState::new();
        assert!(state.try_begin());
        assert!(!state.try_begin());
        state.finish();
        assert!(state.try_begin());
    }

    #[test]
    fn enter_returns_previous_phase() {
        let mut state = SequencerState::new();
        assert_eq!(state.enter(Phase::Loading), Phase::Idle);
        assert_eq!(state.enter(Phase::Playing), Phase::Loading);
        assert_eq!(state.phase(), Phase::Playing);
    }

    #[test]
    fn clearing_active_popup_hands_it_back() {
        let mut state = SequencerState::new();
        state.set_active_popup(PopupId::new("popup1"));
        assert_eq!(state.clear_active_popup(), Some(PopupId::new("popup1")));
        assert!(state.active_popup().is_none());
    }

    #[test]
    fn phase_serializes_by_name() {
        let json = serde_json::to_string(&Phase::RevealingPopup).unwrap();
        assert_eq!(json, "\"RevealingPopup\"");
        let back: Phase = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Phase::RevealingPopup);
    }
}
