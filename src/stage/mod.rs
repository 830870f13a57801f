//! The surfaces and host services the sequencer drives but does not own.
//!
//! A [`Stage`] bundles the video surface, the backdrop overlay, the popup
//! surfaces and the [`Timing`] in effect. It is the environment every effect
//! in [`crate::effects`] runs against, so a test can swap in
//! [`recording::Recorder`] without touching the sequencing logic.

pub mod recording;

use crate::config::{DownloadAsset, Timing};
use crate::table::{MediaRef, PopupId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The host refused to start playback (e.g. no prior user gesture).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PlaybackRejected {
    pub reason: String,
}

impl PlaybackRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The single playable-media surface.
#[async_trait]
pub trait VideoSurface: Send + Sync {
    fn set_source(&self, media: &MediaRef);

    /// Force the surface to reload its source.
    fn load(&self);

    /// Start playback; resolves once the host acknowledges or refuses.
    async fn play(&self) -> Result<(), PlaybackRejected>;

    fn pause(&self);
}

/// One popup element.
///
/// Calls arrive in lifecycle order: `unhide`, `activate`, `begin_exit`, `hide`.
pub trait PopupSurface: Send + Sync {
    /// Make the element take part in layout without showing it yet.
    fn unhide(&self);

    /// Mark the element active, starting its enter animation.
    fn activate(&self);

    /// Mark the element exiting, starting its exit animation.
    fn begin_exit(&self);

    /// Take the element out of layout and clear the exiting mark.
    fn hide(&self);
}

/// Blur/overlay applied over the video surface between clips.
pub trait Backdrop: Send + Sync {
    fn set_blurred(&self, blurred: bool);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioTrack {
    Background,
    Effect,
}

/// Page-level services used by the presenter, outside the sequencing core.
#[async_trait]
pub trait Host: Send + Sync {
    /// Warm a media reference into cache.
    fn preload(&self, media: &MediaRef);

    fn fade_landing(&self);

    fn dismiss_landing(&self);

    fn set_volume(&self, track: AudioTrack, volume: f32);

    async fn play_audio(&self, track: AudioTrack) -> Result<(), PlaybackRejected>;

    fn download(&self, asset: &DownloadAsset);

    /// Reset the whole page.
    fn reload(&self);
}

/// Environment handed to every sequencing effect.
#[derive(Clone)]
pub struct Stage {
    video: Arc<dyn VideoSurface>,
    backdrop: Arc<dyn Backdrop>,
    popups: Arc<HashMap<PopupId, Arc<dyn PopupSurface>>>,
    timing: Timing,
}

impl Stage {
    pub fn new(video: Arc<dyn VideoSurface>, backdrop: Arc<dyn Backdrop>) -> Self {
        Self {
            video,
            backdrop,
            popups: Arc::new(HashMap::new()),
            timing: Timing::default(),
        }
    }

    /// Register the surface for a popup, replacing any earlier one.
    pub fn with_popup(mut self, popup: impl Into<PopupId>, surface: Arc<dyn PopupSurface>) -> Self {
        Arc::make_mut(&mut self.popups).insert(popup.into(), surface);
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn video(&self) -> &Arc<dyn VideoSurface> {
        &self.video
    }

    pub fn backdrop(&self) -> &Arc<dyn Backdrop> {
        &self.backdrop
    }

    /// Surface for `popup`, if the page has one.
    pub fn popup(&self, popup: &str) -> Option<Arc<dyn PopupSurface>> {
        self.popups.get(popup).cloned()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut popups: Vec<_> = self.popups.keys().map(PopupId::as_str).collect();
        popups.sort_unstable();
        f.debug_struct("Stage")
            .field("popups", &popups)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
