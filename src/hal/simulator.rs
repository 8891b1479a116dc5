// src/hal/simulator.rs
//! Simulated camera source for tests, benches and the demo binaries
//!
//! Generates a deterministic gradient pattern per frame and supports scripted
//! fault injection keyed on the buffer's checkout sequence number, so timeout
//! and device-fault paths can be exercised without hardware.

use crate::acquisition::Buffer;
use crate::config::constants::{acquisition, frame};
use crate::hal::{DeviceInfo, FillStatus, FrameLayout, FrameMeta, FrameSource, PixelFormat, SourceError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Simulated camera configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Frame width in pixels
    #[serde(default = "defaults::width")]
    pub width: u32,

    /// Frame height in pixels
    #[serde(default = "defaults::height")]
    pub height: u32,

    /// Pixel layout of generated frames
    #[serde(default)]
    pub pixel_format: PixelFormat,

    /// Reported model name
    #[serde(default = "defaults::model")]
    pub model: String,

    /// Synthetic exposure latency per fill, milliseconds
    #[serde(default)]
    pub fill_latency_ms: u64,

    /// Additive pixel noise amplitude, 0.0..=1.0
    #[serde(default)]
    pub noise_level: f32,

    /// Sequence numbers whose fill reports `TimedOut`
    #[serde(default)]
    pub timeout_on: Vec<u64>,

    /// Sequence numbers whose fill reports a device fault
    #[serde(default)]
    pub fail_on: Vec<u64>,

    /// Error code carried by injected device faults
    #[serde(default = "defaults::fault_code")]
    pub fault_code: u32,
}

mod defaults {
    use crate::config::constants::frame;

    pub fn width() -> u32 {
        frame::DEFAULT_WIDTH
    }
    pub fn height() -> u32 {
        frame::DEFAULT_HEIGHT
    }
    pub fn model() -> String {
        "SimCam 2000".to_string()
    }
    pub fn fault_code() -> u32 {
        crate::config::constants::acquisition::INJECTED_FAULT_ERROR_CODE
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            width: defaults::width(),
            height: defaults::height(),
            pixel_format: PixelFormat::default(),
            model: defaults::model(),
            fill_latency_ms: 0,
            noise_level: 0.0,
            timeout_on: Vec::new(),
            fail_on: Vec::new(),
            fault_code: defaults::fault_code(),
        }
    }
}

impl SimulatorConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimulatorError::InvalidConfig(format!(
                "frame dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > frame::MAX_DIMENSION || self.height > frame::MAX_DIMENSION {
            return Err(SimulatorError::InvalidConfig(format!(
                "frame dimensions exceed {} pixels: {}x{}",
                frame::MAX_DIMENSION,
                self.width,
                self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.noise_level) {
            return Err(SimulatorError::InvalidConfig(format!(
                "noise_level must be within 0.0..=1.0, got {}",
                self.noise_level
            )));
        }
        Ok(())
    }
}

/// Simulator lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulatorError {
    /// Rejected configuration value
    #[error("invalid simulator configuration: {0}")]
    InvalidConfig(String),
}

/// Software camera implementing [`FrameSource`].
pub struct SimulatedCamera {
    config: SimulatorConfig,
    opened: bool,
    fills: u64,
}

impl SimulatedCamera {
    /// Create a simulated camera after validating its configuration.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        Ok(Self {
            config,
            opened: false,
            fills: 0,
        })
    }

    /// Total fill requests served, including injected faults.
    pub fn fill_count(&self) -> u64 {
        self.fills
    }

    /// Whether `open` has been called without a matching `close`.
    pub fn is_open(&self) -> bool {
        self.opened
    }

    fn write_pattern(&self, buffer: &mut Buffer, sequence: u64) {
        for (i, byte) in buffer.data_mut().iter_mut().enumerate() {
            *byte = ((i as u64 + sequence) % 251) as u8;
        }

        if self.config.noise_level > 0.0 {
            let span = (self.config.noise_level * 255.0) as u8;
            if span > 0 {
                let mut rng = rand::thread_rng();
                for byte in buffer.data_mut().iter_mut() {
                    *byte = byte.wrapping_add(rng.gen_range(0..=span));
                }
            }
        }
    }
}

fn timestamp_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

impl FrameSource for SimulatedCamera {
    type Error = SimulatorError;

    fn open(&mut self) -> Result<(), Self::Error> {
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.opened = false;
        Ok(())
    }

    fn fill(&mut self, buffer: &mut Buffer, timeout: Duration) -> FillStatus {
        self.fills += 1;
        let sequence = buffer.sequence();

        if !self.opened {
            return FillStatus::DeviceError(SourceError {
                code: acquisition::SOURCE_NOT_OPEN_ERROR_CODE,
                description: "simulated camera is not open".to_string(),
            });
        }

        if self.config.timeout_on.contains(&sequence) {
            thread::sleep(timeout);
            return FillStatus::TimedOut;
        }

        if self.config.fail_on.contains(&sequence) {
            return FillStatus::DeviceError(SourceError {
                code: self.config.fault_code,
                description: format!("injected device fault at frame {sequence}"),
            });
        }

        if self.config.fill_latency_ms > 0 {
            let latency = Duration::from_millis(self.config.fill_latency_ms);
            if latency >= timeout {
                thread::sleep(timeout);
                return FillStatus::TimedOut;
            }
            thread::sleep(latency);
        }

        self.write_pattern(buffer, sequence);

        FillStatus::Success(FrameMeta {
            width: self.config.width,
            height: self.config.height,
            pixel_format: self.config.pixel_format,
            timestamp_ns: timestamp_ns(),
        })
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            model: self.config.model.clone(),
            vendor: "Framegrab".to_string(),
            serial_number: format!("SIM-{:08X}", self.config.width ^ self.config.height.rotate_left(16)),
        }
    }

    fn frame_layout(&self) -> FrameLayout {
        FrameLayout {
            width: self.config.width,
            height: self.config.height,
            pixel_format: self.config.pixel_format,
        }
    }
}
