//! Audio thread and control threads running against the same engine.

mod helpers;

use beatsync::prelude::*;
use helpers::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_control_while_processing() {
    init_tracing();
    let engine = Arc::new(test_engine(true));
    let mut processor = engine.take_processor().unwrap();
    let clicks = generate_click_train(120.0, TEST_SAMPLE_RATE, 10.0);
    let done = Arc::new(AtomicBool::new(false));

    let audio = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            feed_stereo(&mut processor, &clicks, TEST_BLOCK_SIZE);
            done.store(true, Ordering::Release);
            processor
        })
    };

    let reader = {
        let control = engine.control();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut reads = 0u64;
            while !done.load(Ordering::Acquire) {
                let bpm = control.tempo_estimate();
                assert!(bpm == 0.0 || (60.0..=200.0).contains(&bpm), "bpm = {bpm}");
                reads += 1;
                thread::yield_now();
            }
            reads
        })
    };

    let mut toggles = 0;
    while !done.load(Ordering::Acquire) {
        engine.set_tempo_sync(toggles % 2 == 0);
        toggles += 1;
        thread::yield_now();
    }

    let processor = audio.join().unwrap();
    assert!(reader.join().unwrap() > 0);

    let stats = engine.stats();
    assert_eq!(stats.failures, 0);
    assert_eq!(stats.frames, processor.frames_completed());
    assert!(stats.publishes <= stats.beats);
    assert_eq!(engine.session().commit_count(), stats.publishes);
}

#[test]
fn test_session_listener_races_audio_thread() {
    let engine = Arc::new(test_engine(true));
    let mut processor = engine.take_processor().unwrap();
    let clicks = generate_click_train(120.0, TEST_SAMPLE_RATE, 6.0);
    let session = Arc::clone(engine.session());

    let audio = thread::spawn(move || {
        feed_stereo(&mut processor, &clicks, TEST_BLOCK_SIZE);
        processor
    });

    for i in 0..200 {
        session.request_tempo(100.0 + (i % 10) as f64);
        thread::yield_now();
    }

    let _processor = audio.join().unwrap();
    let stats = engine.stats();
    assert_eq!(stats.failures, 0);
    assert_eq!(
        engine.session().commit_count(),
        stats.publishes + stats.forwarded
    );
}
