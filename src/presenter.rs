//! The presenter: turns page input into sequencer calls.
//!
//! Everything around the sequencing core lives here: the landing gate in
//! front of the first clip, background and effect audio, preloading, and the
//! restart and download buttons. None of it affects the sequencer's
//! invariants; the presenter only decides *when* transitions are requested.

use crate::config::{ConfigError, PresentationConfig};
use crate::effects::{Dispatch, Sequencer};
use crate::stage::{AudioTrack, Host, Stage};
use crate::table::NodeId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info};

/// One piece of user or surface input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// The landing page's start button.
    Start,
    /// A popup's forward button, carrying its target.
    Continue(NodeId),
    /// A popup's back button, carrying its target.
    Back(NodeId),
    /// The video surface finished its media.
    MediaEnded,
    Restart,
    Download,
}

/// Why the presenter stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// The page was asked to reload.
    Restart,
    /// The input channel closed.
    Closed,
}

pub struct Presenter {
    config: PresentationConfig,
    sequencer: Sequencer,
    host: Arc<dyn Host>,
    started: bool,
}

impl Presenter {
    /// Validate `config` and bind a sequencer to `stage`, using the
    /// configured timing and history limit.
    pub fn new(
        config: PresentationConfig,
        stage: Stage,
        host: Arc<dyn Host>,
    ) -> Result<Self, ConfigError> {
        let table = config.table()?;
        let stage = stage.with_timing(config.timing.clone());
        Ok(Self {
            sequencer: Sequencer::new(table, stage).with_history_limit(config.history_limit),
            config,
            host,
            started: false,
        })
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    /// Whether the landing gate has been passed.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Warm every media reference in the table. Returns how many were requested.
    pub fn preload(&self) -> usize {
        let mut count = 0;
        for media in self.sequencer.table().media_refs() {
            self.host.preload(media);
            count += 1;
        }
        debug!(count, "media preloaded");
        count
    }

    /// Apply one input. Returns `Some` when the presenter should stop.
    pub fn handle(&mut self, input: Input) -> Option<Exit> {
        match input {
            Input::Start => self.start(),
            Input::Continue(node) | Input::Back(node) => self.navigate(&node),
            Input::MediaEnded => {
                self.sequencer.on_playback_ended();
            }
            Input::Restart => {
                info!("restart requested");
                self.host.reload();
                return Some(Exit::Restart);
            }
            Input::Download => {
                debug!(file = %self.config.download.filename, "download requested");
                self.host.download(&self.config.download);
            }
        }
        None
    }

    /// Consume inputs until a restart or until every sender is gone.
    pub async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<Input>) -> Exit {
        while let Some(input) = inputs.recv().await {
            if let Some(exit) = self.handle(input) {
                return exit;
            }
        }
        debug!("input channel closed");
        Exit::Closed
    }

    fn start(&mut self) {
        if self.started {
            debug!("landing already passed, ignoring start");
            return;
        }
        self.started = true;
        info!(entry = %self.config.entry, "landing passed");

        let timing = self.config.timing.clone();
        self.host.set_volume(
            AudioTrack::Background,
            self.config.background_volume.clamp(0.0, 1.0),
        );
        self.play_audio_after(AudioTrack::Background, None);
        self.play_audio_after(AudioTrack::Effect, Some(timing.effect_audio_delay));

        self.sequencer.request_transition(self.config.entry.as_str());

        self.host.fade_landing();
        let host = Arc::clone(&self.host);
        tokio::spawn(async move {
            sleep(timing.landing_fade).await;
            host.dismiss_landing();
        });
    }

    fn play_audio_after(&self, track: AudioTrack, delay: Option<std::time::Duration>) {
        let host = Arc::clone(&self.host);
        tokio::spawn(async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            if let Err(err) = host.play_audio(track).await {
                debug!(track = ?track, error = %err, "audio did not start");
            }
        });
    }

    fn navigate(&self, node: &NodeId) {
        if let Dispatch::Ignored(reason) = self.sequencer.request_transition(node.as_str()) {
            debug!(node = %node, reason = ?reason, "navigation dropped");
        }
    }
}
