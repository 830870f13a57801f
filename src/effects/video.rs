//! Video controller: drives the single playable-media surface.

use crate::effects::error::SequenceError;
use crate::stage::Stage;
use crate::table::MediaRef;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use stillwater::effect::Effect;
use stillwater::prelude::*;
use tracing::debug;

#[derive(Debug, Default)]
struct Playthrough {
    media: Option<MediaRef>,
    ended: bool,
}

/// Loads and plays media references, one playthrough at a time.
///
/// Clones share the same playthrough record.
#[derive(Clone, Debug, Default)]
pub struct VideoController {
    playthrough: Arc<Mutex<Playthrough>>,
}

impl VideoController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Media whose playback most recently started.
    pub fn current_media(&self) -> Option<MediaRef> {
        self.playthrough().media.clone()
    }

    /// Assign `media`, force a reload and start playback.
    ///
    /// Resolves with the media once the host acknowledges playback, or fails
    /// with [`SequenceError::PlaybackRejected`] when it refuses.
    pub fn load_and_play(
        &self,
        media: MediaRef,
    ) -> impl Effect<Output = MediaRef, Error = SequenceError, Env = Stage> {
        let playthrough = Arc::clone(&self.playthrough);
        from_async(move |stage: &Stage| {
            let video = Arc::clone(stage.video());
            async move {
                video.set_source(&media);
                video.load();
                debug!(media = %media, "source assigned");

                if let Err(rejected) = video.play().await {
                    return Err(SequenceError::PlaybackRejected {
                        media,
                        reason: rejected.reason,
                    });
                }

                let mut playthrough = playthrough.lock().unwrap_or_else(PoisonError::into_inner);
                playthrough.media = Some(media.clone());
                playthrough.ended = false;
                Ok(media)
            }
        })
    }

    /// Accept the end-of-media signal for the current playthrough.
    ///
    /// Yields the finished media the first time it is called after playback
    /// started, and `None` for any repeated signal.
    pub fn finish_playthrough(&self) -> Option<MediaRef> {
        let mut playthrough = self.playthrough();
        if playthrough.ended {
            return None;
        }
        let media = playthrough.media.clone()?;
        playthrough.ended = true;
        Some(media)
    }

    /// Hold the surface on its final frame.
    pub fn freeze(&self, stage: &Stage) {
        stage.video().pause();
    }

    fn playthrough(&self) -> MutexGuard<'_, Playthrough> {
        self.playthrough
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
