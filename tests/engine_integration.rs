// tests/engine_integration.rs
//! Integration tests for the streaming acquisition engine

use framegrab_core::config::constants::acquisition;
use framegrab_core::config::EngineConfig;
use framegrab_core::hal::simulator::{SimulatedCamera, SimulatorConfig};
use framegrab_core::{AcquisitionEngine, EngineError, EngineState};
use serial_test::serial;
use std::thread;
use std::time::{Duration, Instant};

fn fast_config(pool_capacity: usize) -> EngineConfig {
    EngineConfig {
        pool_capacity,
        fill_timeout_ms: 50,
        checkout_timeout_ms: 100,
        checkout_retries: 3,
        retry_backoff_ms: 1,
    }
}

fn camera(config: SimulatorConfig) -> SimulatedCamera {
    SimulatedCamera::new(SimulatorConfig {
        width: 16,
        height: 8,
        ..config
    })
    .expect("failed to create simulated camera")
}

#[test]
fn test_capacity_two_target_five_delivers_in_order() {
    let engine =
        AcquisitionEngine::new(camera(SimulatorConfig::default()), fast_config(2)).unwrap();

    engine.start_acquisition(Some(5)).unwrap();

    let mut sequences = Vec::new();
    while let Some(result) = engine.retrieve(Duration::from_secs(2)).unwrap() {
        assert!(result.succeeded(), "frame {} failed", result.sequence());
        sequences.push(result.sequence());
    }

    assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(engine.produced(), 5);

    // End-of-stream stays observable.
    assert!(engine.retrieve(Duration::from_millis(10)).unwrap().is_none());
}

#[test]
fn test_timeout_on_third_fill_only() {
    let sim = SimulatorConfig {
        timeout_on: vec![2],
        ..SimulatorConfig::default()
    };
    let engine = AcquisitionEngine::new(camera(sim), fast_config(2)).unwrap();

    engine.start_acquisition(Some(5)).unwrap();

    // Record outcomes and drop each handle so its buffer flows back into the
    // capacity-2 pool.
    let mut outcomes = Vec::new();
    while let Some(result) = engine.retrieve(Duration::from_secs(2)).unwrap() {
        assert_eq!(result.data().is_some(), result.succeeded());
        outcomes.push((
            result.sequence(),
            result.succeeded(),
            result.error().map(|e| e.code),
        ));
    }

    assert_eq!(
        outcomes,
        vec![
            (0, true, None),
            (1, true, None),
            (2, false, Some(acquisition::FILL_TIMEOUT_ERROR_CODE)),
            (3, true, None),
            (4, true, None),
        ]
    );
}

#[test]
fn test_device_fault_is_delivered_not_fatal() {
    let sim = SimulatorConfig {
        fail_on: vec![1],
        fault_code: 0xBEEF,
        ..SimulatorConfig::default()
    };
    let engine = AcquisitionEngine::new(camera(sim), fast_config(2)).unwrap();

    engine.start_acquisition(Some(4)).unwrap();

    let mut delivered = 0;
    while let Some(result) = engine.retrieve(Duration::from_secs(2)).unwrap() {
        if result.sequence() == 1 {
            assert_eq!(result.error().map(|e| e.code), Some(0xBEEF));
        } else {
            assert!(result.succeeded());
        }
        delivered += 1;
    }
    assert_eq!(delivered, 4);

    // Every buffer came home once the handles were dropped.
    let metrics = engine.pool_metrics();
    assert_eq!(metrics.outstanding, 0);
    assert_eq!(metrics.available, metrics.capacity);
}

#[test]
#[serial]
fn test_zero_timeout_retrieve_fails_immediately() {
    let sim = SimulatorConfig {
        fill_latency_ms: 40,
        ..SimulatorConfig::default()
    };
    let config = EngineConfig {
        fill_timeout_ms: 500,
        ..fast_config(2)
    };
    let engine = AcquisitionEngine::new(camera(sim), config).unwrap();

    engine.start_acquisition(Some(1)).unwrap();

    let start = Instant::now();
    let outcome = engine.retrieve(Duration::ZERO);
    assert!(matches!(outcome, Err(EngineError::RetrieveTimeout { .. })));
    assert!(start.elapsed() < Duration::from_millis(30));

    engine.stop();
}

#[test]
#[serial]
fn test_stop_is_race_free() {
    let sim = SimulatorConfig {
        fill_latency_ms: 5,
        ..SimulatorConfig::default()
    };
    let config = EngineConfig {
        fill_timeout_ms: 500,
        ..fast_config(2)
    };
    let engine = AcquisitionEngine::new(camera(sim), config).unwrap();

    // Unbounded session.
    engine.start_acquisition(None).unwrap();

    let first = engine.retrieve(Duration::from_secs(2)).unwrap();
    assert!(first.is_some());
    drop(first);

    engine.stop();
    assert_eq!(engine.state(), EngineState::Stopped);

    // No further fill starts after stop() has returned.
    let produced_at_stop = engine.produced();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(engine.produced(), produced_at_stop);

    // Queued results remain retrievable, then end-of-stream.
    loop {
        match engine.retrieve(Duration::from_millis(10)) {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(err) => panic!("unexpected error while draining: {err}"),
        }
    }

    // Stop is idempotent.
    engine.stop();
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[test]
fn test_fifo_order_under_slow_consumer() {
    let engine =
        AcquisitionEngine::new(camera(SimulatorConfig::default()), fast_config(2)).unwrap();

    engine.start_acquisition(Some(6)).unwrap();

    let mut expected = 0u64;
    while let Some(result) = engine.retrieve(Duration::from_secs(2)).unwrap() {
        assert_eq!(result.sequence(), expected);
        expected += 1;
        // Let the pool drain back-pressure the producer.
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(expected, 6);
}

#[test]
fn test_start_while_running_leaves_session_intact() {
    let engine =
        AcquisitionEngine::new(camera(SimulatorConfig::default()), fast_config(2)).unwrap();

    engine.start_acquisition(Some(3)).unwrap();
    assert!(matches!(
        engine.start_acquisition(Some(3)),
        Err(EngineError::AlreadyRunning)
    ));

    // The running session still completes normally.
    let mut delivered = 0;
    while let Some(result) = engine.retrieve(Duration::from_secs(2)).unwrap() {
        assert!(result.succeeded());
        delivered += 1;
    }
    assert_eq!(delivered, 3);
}

#[test]
fn test_diagnostics_match_pattern() {
    let engine =
        AcquisitionEngine::new(camera(SimulatorConfig::default()), fast_config(2)).unwrap();

    engine.start_acquisition(Some(2)).unwrap();

    while let Some(result) = engine.retrieve(Duration::from_secs(2)).unwrap() {
        let meta = result.meta().expect("successful frame must carry metadata");
        assert_eq!(meta.width, 16);
        assert_eq!(meta.height, 8);

        let data = result.data().expect("successful frame must expose data");
        assert_eq!(data.len(), 16 * 8);
        // Gradient pattern: first pixel equals the sequence number mod 251.
        assert_eq!(data[0], (result.sequence() % 251) as u8);
    }
}
