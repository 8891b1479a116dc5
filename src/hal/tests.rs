// src/hal/tests.rs
//! Unit tests for the simulated camera source

use crate::acquisition::BufferPool;
use crate::config::constants::acquisition;
use crate::hal::simulator::{SimulatedCamera, SimulatorConfig};
use crate::hal::{FillStatus, FrameSource, PixelFormat};
use std::sync::Arc;
use std::time::Duration;

fn small_config() -> SimulatorConfig {
    SimulatorConfig {
        width: 8,
        height: 4,
        pixel_format: PixelFormat::Mono8,
        ..Default::default()
    }
}

fn pool_for(camera: &SimulatedCamera) -> Arc<BufferPool> {
    Arc::new(BufferPool::new(2, camera.frame_layout().byte_len()).unwrap())
}

#[test]
fn test_fill_writes_pattern_and_meta() {
    let mut camera = SimulatedCamera::new(small_config()).unwrap();
    camera.open().unwrap();

    let pool = pool_for(&camera);
    let mut buffer = pool.checkout(Duration::from_millis(10)).unwrap();

    match camera.fill(&mut buffer, Duration::from_millis(100)) {
        FillStatus::Success(meta) => {
            assert_eq!(meta.width, 8);
            assert_eq!(meta.height, 4);
            assert_eq!(meta.pixel_format, PixelFormat::Mono8);
            assert!(meta.timestamp_ns > 0);
        }
        other => panic!("expected success, got {other:?}"),
    }

    // First pixel of sequence 0 follows the gradient pattern.
    assert_eq!(buffer.data()[0], 0);
    assert_eq!(buffer.data()[1], 1);

    pool.give_back(buffer).unwrap();
}

#[test]
fn test_fill_before_open_reports_device_fault() {
    let mut camera = SimulatedCamera::new(small_config()).unwrap();
    let pool = pool_for(&camera);
    let mut buffer = pool.checkout(Duration::from_millis(10)).unwrap();

    match camera.fill(&mut buffer, Duration::from_millis(10)) {
        FillStatus::DeviceError(err) => {
            assert_eq!(err.code, acquisition::SOURCE_NOT_OPEN_ERROR_CODE);
        }
        other => panic!("expected device fault, got {other:?}"),
    }

    pool.give_back(buffer).unwrap();
}

#[test]
fn test_injected_timeout_and_fault() {
    let config = SimulatorConfig {
        timeout_on: vec![0],
        fail_on: vec![1],
        fault_code: 0xDEAD,
        ..small_config()
    };
    let mut camera = SimulatedCamera::new(config).unwrap();
    camera.open().unwrap();

    let pool = pool_for(&camera);

    let mut first = pool.checkout(Duration::from_millis(10)).unwrap();
    assert_eq!(first.sequence(), 0);
    assert_eq!(
        camera.fill(&mut first, Duration::from_millis(5)),
        FillStatus::TimedOut
    );
    pool.give_back(first).unwrap();

    let mut second = pool.checkout(Duration::from_millis(10)).unwrap();
    assert_eq!(second.sequence(), 1);
    match camera.fill(&mut second, Duration::from_millis(5)) {
        FillStatus::DeviceError(err) => assert_eq!(err.code, 0xDEAD),
        other => panic!("expected device fault, got {other:?}"),
    }
    pool.give_back(second).unwrap();

    assert_eq!(camera.fill_count(), 2);
}

#[test]
fn test_open_close_lifecycle() {
    let mut camera = SimulatedCamera::new(small_config()).unwrap();
    assert!(!camera.is_open());

    camera.open().unwrap();
    assert!(camera.is_open());

    camera.close().unwrap();
    assert!(!camera.is_open());
}

#[test]
fn test_config_validation() {
    let mut config = small_config();
    assert!(config.validate().is_ok());

    config.width = 0;
    assert!(config.validate().is_err());

    config.width = 8;
    config.noise_level = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_device_info_is_stable() {
    let camera = SimulatedCamera::new(small_config()).unwrap();
    let info = camera.device_info();
    assert_eq!(info.model, "SimCam 2000");
    assert_eq!(info, camera.device_info());
}
