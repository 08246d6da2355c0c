//! End-to-end workflows through the umbrella crate.
//!
//! Exercises the re-exported API the way an embedding application would:
//! build an engine over a sink, capture a sequence, and drive playback from
//! a frame loop.

use arpline::{ArpEngine, ArpMode, BufferSink, TransportState};
use std::time::{Duration, Instant};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_capture_then_play_full_session() {
    init_tracing();
    let mut engine = ArpEngine::new(BufferSink::new());
    let lead = engine.add_channel("Lead").unwrap();
    assert_eq!(engine.state(), TransportState::Recording);

    for note in [60, 64, 67] {
        engine.key_pressed(lead, note, 100).unwrap();
        engine.key_released(lead, note).unwrap();
    }
    engine.channel_mut(lead).unwrap().set_mode(ArpMode::Up);
    engine.set_tempo(120.0);
    engine.sink_mut().clear();

    engine.play();
    assert_eq!(engine.state(), TransportState::Playing);

    // Simulate a 60 fps frame loop for just over two steps
    let t0 = Instant::now();
    let frame = Duration::from_micros(16_667);
    for i in 0..65 {
        engine.tick(t0 + frame * i);
    }

    let ons: Vec<u8> = engine
        .sink()
        .messages()
        .iter()
        .filter(|m| m.is_note_on())
        .map(|m| m.note)
        .collect();
    assert_eq!(ons, vec![60, 64, 67], "three steps in ~1.08s at 120 BPM");

    engine.shutdown();
    assert_eq!(engine.held_count(), 0);
}

#[test]
fn test_stop_is_silent_and_sticky() {
    init_tracing();
    let mut engine = ArpEngine::new(BufferSink::new());
    let lead = engine.add_channel("Lead").unwrap();
    engine.key_pressed(lead, 60, 100).unwrap();
    engine.key_released(lead, 60).unwrap();

    engine.play();
    let t0 = Instant::now();
    engine.tick(t0);
    engine.play(); // stop
    assert_eq!(engine.state(), TransportState::Stopped);
    engine.sink_mut().clear();

    for i in 1..10 {
        engine.tick(t0 + Duration::from_millis(500) * i);
    }
    assert!(engine.sink().messages().is_empty());
}
