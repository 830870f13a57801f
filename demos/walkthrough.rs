//! Walkthrough of the canonical presentation
//!
//! This example drives the full presenter against the recording stage:
//! landing gate, the first two forward clips, a step back, a download and
//! finally a restart. Every call the page would have received is printed at
//! the end.
//!
//! Key concepts:
//! - Inputs arrive over an mpsc channel, like button clicks would
//! - Requests made while a transition is in flight are dropped
//! - Timing comes from the config (shortened here so the demo is quick)
//!
//! Run with: RUST_LOG=reelpath=debug cargo run --example walkthrough

use reelpath::stage::recording::Recorder;
use reelpath::{Exit, Input, NodeId, PresentationConfig, Presenter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

const FAST_TIMING: &str = r#"{
    "timing": {
        "popup_enter": 10,
        "popup_exit": 200,
        "blur_delay": 25,
        "popup_reveal": 75,
        "landing_fade": 200,
        "effect_audio_delay": 500
    }
}"#;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelpath=info")),
        )
        .init();

    println!("=== Reelpath Walkthrough ===\n");

    let config = PresentationConfig::from_json_str(FAST_TIMING).unwrap();
    let recorder = Recorder::new();
    let stage = recorder.stage(config.popups.clone());
    let presenter = Presenter::new(config, stage, Arc::new(recorder.clone())).unwrap();

    println!("Preloaded {} media references", presenter.preload());
    let sequencer = presenter.sequencer().clone();

    let (inputs, receiver) = mpsc::unbounded_channel();
    let running = tokio::spawn(presenter.run(receiver));

    let steps = [
        (Input::Start, 0),
        // Dropped: walk1 is still starting.
        (Input::Continue(NodeId::new("walk3")), 400),
        (Input::MediaEnded, 400),
        (Input::Continue(NodeId::new("walk2")), 400),
        (Input::MediaEnded, 400),
        (Input::Back(NodeId::new("reverse2")), 400),
        (Input::MediaEnded, 400),
        (Input::Download, 0),
        (Input::Restart, 0),
    ];

    for (input, pause) in steps {
        println!("-> {input:?}");
        inputs.send(input).unwrap();
        if pause == 0 {
            continue;
        }
        sleep(Duration::from_millis(pause)).await;

        let state = sequencer.state();
        println!(
            "   node: {:?}, phase: {:?}, popup: {:?}",
            state.current_node().map(NodeId::as_str),
            state.phase(),
            state.active_popup().map(|popup| popup.as_str()),
        );
    }

    let exit = running.await.unwrap();
    assert_eq!(exit, Exit::Restart);

    println!("\nRecorded page calls:");
    for recorded in recorder.events() {
        println!("  {recorded:?}");
    }

    println!("\nPhase path:");
    for phase in sequencer.history().get_path() {
        println!("  {phase:?}");
    }

    println!("\n=== Example Complete ===");
}
