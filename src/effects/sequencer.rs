//! The sequencer: sole owner of [`SequencerState`].
//!
//! Every visible change goes through here. A transition request is checked
//! against the table and the guard synchronously, then the rest of the chain
//! (popup exit, load, playback start) runs as one spawned effect, so the
//! ordering `exit popup -> load -> play` is the order of the code below.
//!
//! After playback ends the follow-up chain `freeze -> blur -> reveal popup`
//! runs the same way, paced by [`Timing`](crate::config::Timing).

use crate::core::{Phase, PhaseChange, PhaseHistory, SequencerState, State};
use crate::effects::error::SequenceError;
use crate::effects::popup::PopupController;
use crate::effects::video::VideoController;
use crate::stage::Stage;
use crate::table::{MediaRef, NodeId, PopupId, SequenceNode, SequenceTable};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use stillwater::effect::Effect;
use stillwater::prelude::*;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Phase changes a new sequencer keeps before dropping the oldest.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Why a transition request was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The target is not in the sequence table.
    UnknownNode,
    /// Another transition is still in flight.
    Busy,
    /// The follow-up popup of the finished node is still on its way in.
    Revealing,
}

/// Outcome of [`Sequencer::request_transition`].
#[derive(Debug)]
pub enum Dispatch {
    /// Nothing happened.
    Ignored(IgnoreReason),
    /// The transition completed before the call returned.
    Settled,
    /// The rest of the transition runs on `task`.
    InFlight { id: Uuid, task: JoinHandle<()> },
}

impl Dispatch {
    /// Whether the request engaged the guard.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }

    /// Wait for the transition to reach its steady state.
    pub async fn finished(self) {
        if let Self::InFlight { id, task } = self {
            if let Err(err) = task.await {
                warn!(transition = %id, error = %err, "transition task did not complete");
            }
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: SequencerState,
    history: PhaseHistory<Phase>,
    blurred: bool,
}

impl Shared {
    fn enter(&mut self, phase: Phase) {
        let from = self.state.enter(phase);
        if from == phase {
            return;
        }
        trace!(from = from.name(), to = phase.name(), "phase");
        self.history.record(PhaseChange {
            from,
            to: phase,
            node: self.state.current_node().cloned(),
            timestamp: Utc::now(),
        });
    }
}

/// Orchestrates the popup and video controllers against a [`SequenceTable`].
///
/// Clones share one state record, so a clone can be handed to whatever
/// delivers input and end-of-media signals.
///
/// Must be driven from inside a tokio runtime.
#[derive(Clone, Debug)]
pub struct Sequencer {
    table: Arc<SequenceTable>,
    stage: Stage,
    popups: PopupController,
    video: VideoController,
    shared: Arc<Mutex<Shared>>,
}

impl Sequencer {
    pub fn new(table: SequenceTable, stage: Stage) -> Self {
        Self {
            table: Arc::new(table),
            stage,
            popups: PopupController::new(),
            video: VideoController::new(),
            shared: Arc::new(Mutex::new(Shared {
                history: PhaseHistory::bounded(DEFAULT_HISTORY_LIMIT),
                ..Shared::default()
            })),
        }
    }

    /// Keep at most `limit` phase changes in [`Sequencer::history`].
    pub fn with_history_limit(self, limit: usize) -> Self {
        {
            let mut shared = self.lock();
            let history = std::mem::take(&mut shared.history);
            shared.history = history.with_limit(limit);
        }
        self
    }

    /// Snapshot of the runtime record.
    pub fn state(&self) -> SequencerState {
        self.lock().state.clone()
    }

    /// Phase changes so far, oldest first.
    pub fn history(&self) -> PhaseHistory<Phase> {
        self.lock().history.clone()
    }

    pub fn is_transitioning(&self) -> bool {
        self.lock().state.is_transitioning()
    }

    pub fn table(&self) -> &SequenceTable {
        &self.table
    }

    pub fn popups(&self) -> &PopupController {
        &self.popups
    }

    pub fn video(&self) -> &VideoController {
        &self.video
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Move to `target`.
    ///
    /// Unknown targets, requests made while another transition is in flight
    /// and requests made between a media end and its popup becoming active
    /// are dropped without touching anything. Otherwise the active
    /// popup (if any) exits first, then the node is loaded. A node without
    /// media settles immediately; one with media settles once playback has
    /// started or been refused.
    pub fn request_transition(&self, target: &str) -> Dispatch {
        let Some(node) = self.table.get(target).cloned() else {
            debug!(node = target, "ignoring transition to unknown node");
            return Dispatch::Ignored(IgnoreReason::UnknownNode);
        };

        let mut shared = self.lock();
        let phase = shared.state.phase();
        if phase.is_revealing() {
            debug!(node = target, phase = %phase, "follow-up popup not shown yet, dropping request");
            return Dispatch::Ignored(IgnoreReason::Revealing);
        }
        if !shared.state.try_begin() {
            debug!(node = target, "transition in flight, dropping request");
            return Dispatch::Ignored(IgnoreReason::Busy);
        }

        let id = Uuid::new_v4();
        info!(transition = %id, node = %node.id, "transition accepted");

        if let Some(popup) = shared.state.clear_active_popup() {
            shared.enter(Phase::ExitingPopup);
            drop(shared);
            let task = self.spawn(self.exit_then_load(id, popup, node));
            return Dispatch::InFlight { id, task };
        }
        drop(shared);

        match self.load(id, &node) {
            Some(media) => Dispatch::InFlight {
                id,
                task: self.spawn(self.playback(id, media)),
            },
            None => Dispatch::Settled,
        }
    }

    /// Handle the end-of-media signal.
    ///
    /// Freezes on the final frame right away, then blurs the surface after
    /// `blur_delay` and shows the finished node's popup after a further
    /// `popup_reveal`. Returns `None` when no playthrough is waiting for its
    /// end, e.g. for a repeated signal.
    pub fn on_playback_ended(&self) -> Option<JoinHandle<()>> {
        let Some(media) = self.video.finish_playthrough() else {
            debug!("end of media without a running playthrough, ignoring");
            return None;
        };

        self.video.freeze(&self.stage);
        self.lock().enter(Phase::Frozen);
        debug!(media = %media, "playback ended, frozen on last frame");

        Some(self.spawn(self.follow_up()))
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn<E>(&self, effect: E) -> JoinHandle<()>
    where
        E: Effect<Output = (), Error = SequenceError, Env = Stage> + 'static,
    {
        let stage = self.stage.clone();
        tokio::spawn(async move {
            if let Err(err) = effect.run(&stage).await {
                warn!(error = %err, "sequencing chain stopped early");
            }
        })
    }

    /// Record `node` as current and clear the overlay. Yields the media to
    /// play, or settles the transition when there is none.
    fn load(&self, id: Uuid, node: &SequenceNode) -> Option<MediaRef> {
        let was_blurred = {
            let mut shared = self.lock();
            shared.state.load(node.id.clone());
            std::mem::take(&mut shared.blurred)
        };
        if was_blurred {
            self.stage.backdrop().set_blurred(false);
        }

        let Some(media) = node.media.clone() else {
            self.settle(Phase::Idle);
            info!(transition = %id, node = %node.id, "transition settled, node has no media");
            return None;
        };

        self.lock().enter(Phase::Loading);
        Some(media)
    }

    fn settle(&self, phase: Phase) {
        let mut shared = self.lock();
        shared.state.finish();
        shared.enter(phase);
    }

    fn exit_then_load(
        &self,
        id: Uuid,
        popup: PopupId,
        node: SequenceNode,
    ) -> impl Effect<Output = (), Error = SequenceError, Env = Stage> {
        let this = self.clone();
        self.popups
            .hide(popup)
            .or_else(move |err| {
                debug!(transition = %id, error = %err, "nothing to hide, loading directly");
                pure::<(), SequenceError, Stage>(())
            })
            .and_then(move |()| match this.load(id, &node) {
                Some(media) => this.playback(id, media).boxed(),
                None => pure::<(), SequenceError, Stage>(()).boxed(),
            })
    }

    fn playback(
        &self,
        id: Uuid,
        media: MediaRef,
    ) -> impl Effect<Output = (), Error = SequenceError, Env = Stage> {
        let started = self.clone();
        let refused = self.clone();
        self.video
            .load_and_play(media)
            .map(move |media| {
                started.settle(Phase::Playing);
                info!(transition = %id, media = %media, "playback started");
            })
            .or_else(move |err| {
                // Same as success for the guard; the surface just stays blank.
                refused.settle(Phase::Stalled);
                warn!(transition = %id, error = %err, "playback did not start");
                pure::<(), SequenceError, Stage>(())
            })
    }

    fn follow_up(&self) -> impl Effect<Output = (), Error = SequenceError, Env = Stage> {
        let blurring = self.clone();
        let revealing = self.clone();
        from_async(move |stage: &Stage| {
            let delay = stage.timing().blur_delay;
            let backdrop = Arc::clone(stage.backdrop());
            async move {
                sleep(delay).await;
                backdrop.set_blurred(true);
                Ok::<_, SequenceError>(blurring.blur())
            }
        })
        .and_then(move |popup| match popup {
            Some(popup) => revealing.reveal(popup).boxed(),
            None => {
                revealing.lock().enter(Phase::DeadEnd);
                info!("dead end reached, waiting for restart");
                pure::<(), SequenceError, Stage>(()).boxed()
            }
        })
    }

    /// Mark the overlay applied and look up the finished node's popup.
    fn blur(&self) -> Option<PopupId> {
        let mut shared = self.lock();
        shared.blurred = true;
        shared.enter(Phase::Blurred);
        let node = shared.state.current_node().map(NodeId::as_str)?;
        self.table.get(node)?.on_complete_popup.clone()
    }

    fn reveal(&self, popup: PopupId) -> impl Effect<Output = (), Error = SequenceError, Env = Stage> {
        let entering = self.clone();
        let shown = self.clone();
        let missing = self.clone();
        let popups = self.popups.clone();
        from_async(move |stage: &Stage| {
            let delay = stage.timing().popup_reveal;
            async move {
                sleep(delay).await;
                entering.lock().enter(Phase::RevealingPopup);
                Ok::<_, SequenceError>(popup)
            }
        })
        .and_then(move |popup| popups.show(popup))
        .map(move |popup| {
            let mut shared = shown.lock();
            shared.state.set_active_popup(popup.clone());
            shared.enter(Phase::AwaitingInput);
            debug!(popup = %popup, "awaiting input");
        })
        .or_else(move |err| {
            warn!(error = %err, "follow-up popup could not be shown");
            missing.lock().enter(Phase::DeadEnd);
            pure::<(), SequenceError, Stage>(())
        })
    }
}
