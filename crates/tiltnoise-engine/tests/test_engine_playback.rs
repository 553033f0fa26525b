//! End-to-end tests: control thread builds loops, audio thread plays them.

use std::thread;
use std::time::{Duration, Instant};

use tiltnoise_engine::{ControlLoop, NoiseEngine, NoiseError, NoteEvent};
use tiltnoise_spec::NoiseConfig;

fn config(channels: usize) -> NoiseConfig {
    NoiseConfig::default()
        .with_loop_seconds(0.05)
        .with_seam_window(128)
        .with_channels(channels)
        .with_seed(314)
}

// ============================================================================
// Note Gating Tests
// ============================================================================

#[test]
fn test_double_note_off_leaves_channel_silent() {
    let (mut engine, mut renderer) = NoiseEngine::create(config(1)).unwrap();
    engine.set_sample_rate_and_length(48_000.0).unwrap();

    renderer.note_on(0);
    renderer.note_off(0);
    renderer.note_off(0);

    assert_eq!(renderer.held_notes(0), 0);
    assert_eq!(renderer.render(0, 256), vec![0.0; 256]);
    assert_eq!(renderer.stats().note_underflows(), 1);

    // A later note-on is heard right away
    renderer.note_on(0);
    assert!(renderer.render(0, 256).iter().any(|&s| s != 0.0));

    engine.maintain();
}

#[test]
fn test_overlapping_notes_keep_gate_open() {
    let (mut engine, mut renderer) = NoiseEngine::create(config(1)).unwrap();
    engine.set_sample_rate_and_length(48_000.0).unwrap();

    renderer.note_on(0);
    renderer.note_on(0);
    renderer.note_off(0);
    assert!(renderer.is_active(0));
    assert!(renderer.render(0, 64).iter().any(|&s| s != 0.0));
}

// ============================================================================
// Looping Tests
// ============================================================================

#[test]
fn test_loop_repeats_exactly() {
    let (mut engine, mut renderer) = NoiseEngine::create(config(1)).unwrap();
    let report = engine.set_sample_rate_and_length(48_000.0).unwrap();
    renderer.note_on(0);

    let first = renderer.render(0, report.length);
    let second = renderer.render(0, report.length);
    assert_eq!(first, second);
    assert!(first.iter().all(|s| s.abs() <= 1.0));
}

#[test]
fn test_block_size_does_not_change_output() {
    let (mut engine, mut renderer) = NoiseEngine::create(config(1)).unwrap();
    engine.set_sample_rate_and_length(48_000.0).unwrap();
    renderer.note_on(0);
    let whole = renderer.render(0, 5_000);

    let (mut engine, mut renderer) = NoiseEngine::create(config(1)).unwrap();
    engine.set_sample_rate_and_length(48_000.0).unwrap();
    renderer.note_on(0);
    let mut pieces = Vec::new();
    for block in [1, 31, 512, 2_400, 2_056] {
        let mut out = vec![0.0; block];
        renderer.render_into(0, &mut out);
        pieces.extend_from_slice(&out);
    }

    assert_eq!(whole, pieces);
}

#[test]
fn test_same_seed_same_audio() {
    let render = || {
        let (mut engine, mut renderer) = NoiseEngine::create(config(1)).unwrap();
        engine.set_sample_rate_and_length(44_100.0).unwrap();
        engine.set_tilt(4.0).unwrap();
        renderer.note_on(0);
        renderer.render(0, 1_000)
    };
    assert_eq!(render(), render());
}

#[test]
fn test_sample_rate_change_swaps_length() {
    let (mut engine, mut renderer) = NoiseEngine::create(config(2)).unwrap();
    engine.set_sample_rate_and_length(48_000.0).unwrap();
    renderer.poll_published();
    assert_eq!(renderer.player(0).map(|p| p.len()), Some(2_400));

    let report = engine.set_sample_rate_and_length(96_000.0).unwrap();
    assert_eq!(report.length, 4_800);
    renderer.poll_published();
    assert_eq!(renderer.player(0).map(|p| p.len()), Some(4_800));
    assert_eq!(renderer.player(1).map(|p| p.len()), Some(4_800));
    assert_eq!(renderer.player(0).map(|p| p.cursor()), Some(0));

    // The startup set was freed while the 96 kHz loop was built
    assert_eq!(engine.maintain(), 1);
}

#[test]
fn test_invalid_setup_keeps_playing_previous_loop() {
    let (mut engine, mut renderer) = NoiseEngine::create(config(1)).unwrap();
    engine.set_sample_rate_and_length(48_000.0).unwrap();
    renderer.note_on(0);
    let before = renderer.render(0, 2_400);

    // 0.05 s at 2 kHz is 100 samples, narrower than the window
    let err = engine.set_sample_rate_and_length(2_000.0).unwrap_err();
    assert!(err.is_config_error());
    assert!(!renderer.poll_published());

    let after = renderer.render(0, 2_400);
    assert_eq!(before, after);
}

// ============================================================================
// Block Processing Tests
// ============================================================================

#[test]
fn test_process_gates_each_channel_at_event_frames() {
    let (mut engine, mut renderer) = NoiseEngine::create(config(2)).unwrap();
    engine.set_sample_rate_and_length(48_000.0).unwrap();

    let mut left = vec![1.0_f32; 128];
    let mut right = vec![1.0_f32; 128];
    {
        let mut outputs = vec![left.as_mut_slice(), right.as_mut_slice()];
        renderer.process(
            &mut outputs,
            &[NoteEvent::on(32, 0), NoteEvent::on(64, 1), NoteEvent::off(96, 0)],
        );
    }

    assert!(left[..32].iter().all(|&s| s == 0.0));
    assert!(left[32..96].iter().any(|&s| s != 0.0));
    assert!(left[96..].iter().all(|&s| s == 0.0));

    assert!(right[..64].iter().all(|&s| s == 0.0));
    assert!(right[64..].iter().any(|&s| s != 0.0));

    // Both channels carry the same loop at the same position
    assert_eq!(&left[64..96], &right[64..96]);
}

// ============================================================================
// Threaded Tests
// ============================================================================

#[test]
fn test_control_loop_feeds_audio_thread() {
    let (engine, mut renderer) = NoiseEngine::create(config(1)).unwrap();
    let handle = ControlLoop::spawn(engine);
    handle.set_sample_rate_and_length(48_000.0).unwrap();
    handle.set_tilt(-6.0).unwrap();

    let audio = thread::spawn(move || {
        renderer.note_on(0);
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut block = [0.0_f32; 256];
        let mut heard = false;
        while Instant::now() < deadline {
            renderer.render_into(0, &mut block);
            heard |= block.iter().any(|&s| s != 0.0);
            if heard && renderer.stats().sets_installed() > 0 {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        (heard, renderer)
    });

    let (heard, renderer) = audio.join().unwrap();
    assert!(heard);

    let engine = handle.shutdown().unwrap();
    let report = engine.last_report().unwrap();
    assert_eq!(report.tilt, -6.0);
    assert!(renderer.stats().installed_generation().is_some());
}

#[test]
fn test_control_loop_reports_rejected_sample_rate() {
    let (engine, _renderer) = NoiseEngine::create(config(1)).unwrap();
    let handle = ControlLoop::spawn(engine);
    handle.set_sample_rate_and_length(0.0).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut errors = Vec::new();
    while errors.is_empty() && Instant::now() < deadline {
        errors = handle.drain_errors();
        thread::sleep(Duration::from_millis(1));
    }

    assert!(matches!(errors.as_slice(), [NoiseError::InvalidConfig(_)]));
    let engine = handle.shutdown().unwrap();
    assert_eq!(engine.sample_rate(), None);
}
