//! Popup controller: shows and hides one popup at a time.

use crate::core::{PopupPhase, State};
use crate::effects::error::SequenceError;
use crate::stage::Stage;
use crate::table::PopupId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use stillwater::effect::Effect;
use stillwater::prelude::*;
use tokio::time::sleep;
use tracing::{debug, trace};

/// Drives popup surfaces through `Hidden -> Entering -> Active -> Exiting -> Hidden`.
///
/// Clones share the same phase table.
#[derive(Clone, Debug, Default)]
pub struct PopupController {
    phases: Arc<Mutex<HashMap<PopupId, PopupPhase>>>,
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle phase of `popup`; popups never touched are `Hidden`.
    pub fn phase_of(&self, popup: &str) -> PopupPhase {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(popup)
            .copied()
            .unwrap_or_default()
    }

    /// Show `popup`. Resolves once it is fully active and yields its id.
    ///
    /// Fails with [`SequenceError::MissingPopupSurface`] without touching
    /// anything when the stage has no surface for it.
    pub fn show(
        &self,
        popup: PopupId,
    ) -> impl Effect<Output = PopupId, Error = SequenceError, Env = Stage> {
        let phases = Arc::clone(&self.phases);
        from_async(move |stage: &Stage| {
            let surface = stage.popup(popup.as_str());
            let enter = stage.timing().popup_enter;
            async move {
                let Some(surface) = surface else {
                    return Err(SequenceError::MissingPopupSurface(popup));
                };

                surface.unhide();
                set_phase(&phases, &popup, PopupPhase::Entering);

                // Let the unhidden state land before the enter animation starts.
                sleep(enter).await;

                surface.activate();
                set_phase(&phases, &popup, PopupPhase::Active);
                debug!(popup = %popup, "popup shown");
                Ok(popup)
            }
        })
    }

    /// Hide `popup`. Resolves exactly once, after the exit animation.
    ///
    /// Fails with [`SequenceError::MissingPopupSurface`] immediately when the
    /// stage has no surface for it.
    pub fn hide(&self, popup: PopupId) -> impl Effect<Output = (), Error = SequenceError, Env = Stage> {
        let phases = Arc::clone(&self.phases);
        from_async(move |stage: &Stage| {
            let surface = stage.popup(popup.as_str());
            let exit = stage.timing().popup_exit;
            async move {
                let Some(surface) = surface else {
                    return Err(SequenceError::MissingPopupSurface(popup));
                };

                surface.begin_exit();
                set_phase(&phases, &popup, PopupPhase::Exiting);

                sleep(exit).await;

                surface.hide();
                set_phase(&phases, &popup, PopupPhase::Hidden);
                debug!(popup = %popup, "popup hidden");
                Ok(())
            }
        })
    }
}

fn set_phase(phases: &Mutex<HashMap<PopupId, PopupPhase>>, popup: &PopupId, phase: PopupPhase) {
    let mut phases = phases.lock().unwrap_or_else(PoisonError::into_inner);
    let previous = phases.insert(popup.clone(), phase).unwrap_or_default();
    trace!(popup = %popup, from = previous.name(), to = phase.name(), "popup phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::recording::{PopupLook, Recorder, StageEvent};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn show_unhides_then_activates() {
        let recorder = Recorder::new();
        let stage = recorder.stage(["popup1"]);
        let popups = PopupController::new();

        let shown = popups.show(PopupId::new("popup1")).run(&stage).await.unwrap();

        assert_eq!(shown, PopupId::new("popup1"));
        assert_eq!(popups.phase_of("popup1"), PopupPhase::Active);
        assert_eq!(
            recorder.events(),
            vec![
                StageEvent::PopupUnhidden("popup1".into()),
                StageEvent::PopupActivated("popup1".into()),
            ]
        );

        let unhidden = recorder
            .first_at(&StageEvent::PopupUnhidden("popup1".into()))
            .unwrap();
        let activated = recorder
            .first_at(&StageEvent::PopupActivated("popup1".into()))
            .unwrap();
        let entering = activated - unhidden;
        assert!(entering >= Duration::from_millis(10) && entering < Duration::from_millis(15));
    }

    #[tokio::test(start_paused = true)]
    async fn hide_waits_for_exit_animation() {
        let recorder = Recorder::new();
        let stage = recorder.stage(["popup1"]);
        let popups = PopupController::new();
        popups.show("popup1".into()).run(&stage).await.unwrap();

        let started = tokio::time::Instant::now();
        popups.hide("popup1".into()).run(&stage).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(800) && elapsed < Duration::from_millis(805));
        assert_eq!(popups.phase_of("popup1"), PopupPhase::Hidden);
        assert_eq!(recorder.look("popup1"), PopupLook::default());
    }

    #[tokio::test(start_paused = true)]
    async fn phase_is_exiting_during_animation() {
        let recorder = Recorder::new();
        let stage = recorder.stage(["popup1"]);
        let popups = PopupController::new();
        popups.show("popup1".into()).run(&stage).await.unwrap();

        let hiding = tokio::spawn({
            let popups = popups.clone();
            let stage = stage.clone();
            async move { popups.hide("popup1".into()).run(&stage).await }
        });

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(popups.phase_of("popup1"), PopupPhase::Exiting);
        assert!(recorder.look("popup1").exiting);

        hiding.await.unwrap().unwrap();
        assert_eq!(popups.phase_of("popup1"), PopupPhase::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_surface_fails_without_waiting() {
        let recorder = Recorder::new();
        let stage = recorder.stage(Vec::<PopupId>::new());
        let popups = PopupController::new();

        let started = tokio::time::Instant::now();
        let hidden = popups.hide("popup9".into()).run(&stage).await;
        let shown = popups.show("popup9".into()).run(&stage).await;

        assert_eq!(
            hidden,
            Err(SequenceError::MissingPopupSurface("popup9".into()))
        );
        assert!(shown.is_err());
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(recorder.is_empty());
        assert_eq!(popups.phase_of("popup9"), PopupPhase::Hidden);
    }
}
