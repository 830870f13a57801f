//! Property-based tests for the sequencer and its table.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use proptest::prelude::*;
use reelpath::core::{Phase, PhaseChange, PhaseHistory, State};
use reelpath::effects::{Dispatch, IgnoreReason, Sequencer};
use reelpath::stage::recording::Recorder;
use reelpath::table::{BuildError, SequenceNode, SequenceTable, TableViolation};
use reelpath::PresentationConfig;
use std::future::Future;

const KNOWN: [&str; 11] = [
    "walk1", "walk2", "walk3", "walk4", "walk5", "walk6", "reverse1", "reverse2", "reverse3",
    "reverse4", "reverse5",
];

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
        .block_on(future)
}

fn canonical(recorder: &Recorder) -> Sequencer {
    let config = PresentationConfig::default();
    let stage = recorder.stage(config.popups.clone());
    Sequencer::new(config.table().unwrap(), stage)
}

prop_compose! {
    fn unknown_target()(id in "[a-z]{0,8}[0-9]{0,2}") -> String {
        id
    }
}

prop_compose! {
    fn any_target()(known in prop::sample::select(KNOWN.to_vec()), unknown in unknown_target(), pick in any::<bool>()) -> String {
        if pick { known.to_string() } else { unknown }
    }
}

proptest! {
    #[test]
    fn unknown_target_leaves_state_unchanged(
        target in unknown_target().prop_filter("must not be in the table", |id| !KNOWN.contains(&id.as_str())),
        warm_up in any::<bool>(),
    ) {
        block_on(async {
            let recorder = Recorder::new();
            let sequencer = canonical(&recorder);
            if warm_up {
                sequencer.request_transition("walk1").finished().await;
            }
            let before = sequencer.state();
            let events = recorder.events().len();

            let dispatch = sequencer.request_transition(&target);

            prop_assert!(matches!(dispatch, Dispatch::Ignored(IgnoreReason::UnknownNode)));
            prop_assert_eq!(sequencer.state(), before);
            prop_assert_eq!(recorder.events().len(), events);
            Ok(())
        })?;
    }

    #[test]
    fn requests_are_dropped_while_transitioning(
        targets in prop::collection::vec(any_target(), 1..8)
    ) {
        block_on(async {
            let recorder = Recorder::new();
            let sequencer = canonical(&recorder);
            let first = sequencer.request_transition("walk3");
            prop_assert!(first.is_accepted());

            for target in &targets {
                prop_assert!(!sequencer.request_transition(target).is_accepted());
            }

            first.finished().await;
            let state = sequencer.state();
            prop_assert_eq!(state.current_node().map(|node| node.as_str()), Some("walk3"));
            prop_assert!(!sequencer.is_transitioning());
            Ok(())
        })?;
    }

    #[test]
    fn released_guard_accepts_any_known_target(
        target in prop::sample::select(KNOWN.to_vec())
    ) {
        block_on(async {
            let recorder = Recorder::new();
            let sequencer = canonical(&recorder);
            sequencer.request_transition("walk1").finished().await;

            let dispatch = sequencer.request_transition(target);
            prop_assert!(dispatch.is_accepted());
            dispatch.finished().await;

            prop_assert!(!sequencer.is_transitioning());
            let state = sequencer.state();
            prop_assert_eq!(state.current_node().map(|node| node.as_str()), Some(target));
            Ok(())
        })?;
    }

    #[test]
    fn undeclared_popups_are_all_reported(
        links in prop::collection::vec(0..6usize, 1..10)
    ) {
        let nodes = links.iter().enumerate().map(|(i, popup)| {
            SequenceNode::new(format!("node{i}"))
                .with_media(format!("node{i}.mp4"))
                .with_popup(format!("popup{popup}"))
        });
        let result = SequenceTable::builder()
            .popups(["popup0", "popup1", "popup2"])
            .nodes(nodes)
            .build();

        let undeclared = links.iter().filter(|popup| **popup >= 3).count();
        match result {
            Ok(table) => {
                prop_assert_eq!(undeclared, 0);
                prop_assert_eq!(table.len(), links.len());
            }
            Err(BuildError::Violations(violations)) => {
                prop_assert_eq!(violations.len(), undeclared);
                let all_unknown = violations
                    .iter()
                    .all(|violation| matches!(violation, TableViolation::UnknownPopup { .. }));
                prop_assert!(all_unknown);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn phase_name_is_stable(phase in prop::sample::select(Phase::ALL.to_vec())) {
        prop_assert_eq!(phase.name(), phase.name());
        prop_assert_eq!(phase.name(), format!("{phase:?}"));
    }

    #[test]
    fn history_preserves_order(
        phases in prop::collection::vec(prop::sample::select(Phase::ALL.to_vec()), 1..10)
    ) {
        let mut history = PhaseHistory::new();
        let mut expected = vec![Phase::Idle];
        let mut from = Phase::Idle;

        for to in &phases {
            history.record(PhaseChange {
                from,
                to: *to,
                node: None,
                timestamp: Utc::now(),
            });
            expected.push(*to);
            from = *to;
        }

        let path = history.get_path();
        prop_assert_eq!(path.len(), expected.len());
        for (recorded, phase) in path.iter().zip(&expected) {
            prop_assert_eq!(*recorded, phase);
        }
    }

    #[test]
    fn bounded_history_keeps_the_newest_changes(
        phases in prop::collection::vec(prop::sample::select(Phase::ALL.to_vec()), 1..40),
        limit in 1..10usize,
    ) {
        let mut history = PhaseHistory::bounded(limit);
        let mut from = Phase::Idle;
        for to in &phases {
            history.record(PhaseChange { from, to: *to, node: None, timestamp: Utc::now() });
            from = *to;
        }

        prop_assert_eq!(history.len(), phases.len().min(limit));
        prop_assert_eq!(history.last().map(|change| change.to), phases.last().copied());
    }

    #[test]
    fn phase_roundtrip_serialization(phase in prop::sample::select(Phase::ALL.to_vec())) {
        let json = serde_json::to_string(&phase).unwrap();
        let deserialized: Phase = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(phase, deserialized);
    }
}
