//! In-memory stage that records every surface call.
//!
//! `Recorder` implements all collaborator traits and keeps an ordered,
//! timestamped log of what was asked of it, plus the resulting look of each
//! popup. Timestamps come from `tokio::time`, so they follow paused test time.

use crate::config::DownloadAsset;
use crate::stage::{
    AudioTrack, Backdrop, Host, PlaybackRejected, PopupSurface, Stage, VideoSurface,
};
use crate::table::{MediaRef, PopupId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

/// One call made against the stage.
#[derive(Clone, Debug, PartialEq)]
pub enum StageEvent {
    SourceAssigned(MediaRef),
    VideoReloaded,
    PlayRequested,
    Paused,
    Blurred(bool),
    PopupUnhidden(PopupId),
    PopupActivated(PopupId),
    PopupExiting(PopupId),
    PopupHidden(PopupId),
    Preloaded(MediaRef),
    LandingFaded,
    LandingDismissed,
    VolumeSet(AudioTrack, f32),
    AudioStarted(AudioTrack),
    Downloaded(String),
    PageReloaded,
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub at: Instant,
    pub event: StageEvent,
}

/// Visual state of a popup element as the page would render it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopupLook {
    pub in_layout: bool,
    pub active: bool,
    pub exiting: bool,
}

#[derive(Debug, Default)]
struct Log {
    events: Vec<Recorded>,
    looks: BTreeMap<PopupId, PopupLook>,
    blurred: bool,
}

/// Recording implementation of every stage collaborator.
///
/// Clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    log: Arc<Mutex<Log>>,
    reject_playback: Arc<AtomicBool>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `play` call fail, as a browser does without a prior gesture.
    pub fn reject_playback(&self, reject: bool) {
        self.reject_playback.store(reject, Ordering::SeqCst);
    }

    /// A stage whose video, backdrop and the given popups all record here.
    pub fn stage<I, P>(&self, popups: I) -> Stage
    where
        I: IntoIterator<Item = P>,
        P: Into<PopupId>,
    {
        let mut stage = Stage::new(Arc::new(self.clone()), Arc::new(self.clone()));
        for popup in popups {
            let popup = popup.into();
            stage = stage.with_popup(popup.clone(), self.popup_surface(popup));
        }
        stage
    }

    pub fn popup_surface(&self, popup: impl Into<PopupId>) -> Arc<dyn PopupSurface> {
        Arc::new(RecordingPopup {
            popup: popup.into(),
            recorder: self.clone(),
        })
    }

    pub fn events(&self) -> Vec<StageEvent> {
        self.log().events.iter().map(|r| r.event.clone()).collect()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.log().events.clone()
    }

    /// Index of the first occurrence of `event`.
    pub fn position(&self, event: &StageEvent) -> Option<usize> {
        self.log().events.iter().position(|r| &r.event == event)
    }

    /// When `event` first happened.
    pub fn first_at(&self, event: &StageEvent) -> Option<Instant> {
        self.log()
            .events
            .iter()
            .find(|r| &r.event == event)
            .map(|r| r.at)
    }

    pub fn count(&self, event: &StageEvent) -> usize {
        self.log().events.iter().filter(|r| &r.event == event).count()
    }

    pub fn is_empty(&self) -> bool {
        self.log().events.is_empty()
    }

    pub fn look(&self, popup: &str) -> PopupLook {
        self.log().looks.get(popup).copied().unwrap_or_default()
    }

    pub fn is_blurred(&self) -> bool {
        self.log().blurred
    }

    /// Forget recorded events, keeping the current looks.
    pub fn clear(&self) {
        self.log().events.clear();
    }

    fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: StageEvent) {
        let mut log = self.log();
        match &event {
            StageEvent::Blurred(blurred) => log.blurred = *blurred,
            StageEvent::PopupUnhidden(popup) => {
                log.looks.entry(popup.clone()).or_default().in_layout = true;
            }
            StageEvent::PopupActivated(popup) => {
                let look = log.looks.entry(popup.clone()).or_default();
                look.active = true;
                look.exiting = false;
            }
            StageEvent::PopupExiting(popup) => {
                let look = log.looks.entry(popup.clone()).or_default();
                look.exiting = true;
                look.active = false;
            }
            StageEvent::PopupHidden(popup) => {
                let look = log.looks.entry(popup.clone()).or_default();
                look.in_layout = false;
                look.exiting = false;
            }
            _ => {}
        }
        log.events.push(Recorded {
            at: Instant::now(),
            event,
        });
    }

    fn try_play(&self) -> Result<(), PlaybackRejected> {
        if self.reject_playback.load(Ordering::SeqCst) {
            Err(PlaybackRejected::new("play() is not allowed before a user gesture"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VideoSurface for Recorder {
    fn set_source(&self, media: &MediaRef) {
        self.push(StageEvent::SourceAssigned(media.clone()));
    }

    fn load(&self) {
        self.push(StageEvent::VideoReloaded);
    }

    async fn play(&self) -> Result<(), PlaybackRejected> {
        self.push(StageEvent::PlayRequested);
        tokio::task::yield_now().await;
        self.try_play()
    }

    fn pause(&self) {
        self.push(StageEvent::Paused);
    }
}

impl Backdrop for Recorder {
    fn set_blurred(&self, blurred: bool) {
        self.push(StageEvent::Blurred(blurred));
    }
}

#[async_trait]
impl Host for Recorder {
    fn preload(&self, media: &MediaRef) {
        self.push(StageEvent::Preloaded(media.clone()));
    }

    fn fade_landing(&self) {
        self.push(StageEvent::LandingFaded);
    }

    fn dismiss_landing(&self) {
        self.push(StageEvent::LandingDismissed);
    }

    fn set_volume(&self, track: AudioTrack, volume: f32) {
        self.push(StageEvent::VolumeSet(track, volume));
    }

    async fn play_audio(&self, track: AudioTrack) -> Result<(), PlaybackRejected> {
        self.try_play()?;
        self.push(StageEvent::AudioStarted(track));
        Ok(())
    }

    fn download(&self, asset: &DownloadAsset) {
        self.push(StageEvent::Downloaded(asset.filename.clone()));
    }

    fn reload(&self) {
        self.push(StageEvent::PageReloaded);
    }
}

struct RecordingPopup {
    popup: PopupId,
    recorder: Recorder,
}

impl PopupSurface for RecordingPopup {
    fn unhide(&self) {
        self.recorder
            .push(StageEvent::PopupUnhidden(self.popup.clone()));
    }

    fn activate(&self) {
        self.recorder
            .push(StageEvent::PopupActivated(self.popup.clone()));
    }

    fn begin_exit(&self) {
        self.recorder
            .push(StageEvent::PopupExiting(self.popup.clone()));
    }

    fn hide(&self) {
        self.recorder.push(StageEvent::PopupHidden(self.popup.clone()));
    }
}
