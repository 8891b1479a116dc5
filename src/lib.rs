//! framegrab-core: streaming frame acquisition with pooled buffers
//!
//! This library provides a self-contained streaming acquisition engine: a
//! producer thread continuously fills reusable buffers from a frame source
//! while a consumer drains completed results with a timeout. It features:
//!
//! - Fixed-capacity buffer pool with blocking checkout and back-pressure
//! - Single-producer acquisition loop with FIFO result delivery
//! - Move-only result handles that return their buffer on drop
//! - Generic cancellable periodic worker
//! - Simulated camera source for tests and demos
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use framegrab_core::config::EngineConfig;
//! use framegrab_core::hal::simulator::{SimulatedCamera, SimulatorConfig};
//! use framegrab_core::AcquisitionEngine;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let camera = SimulatedCamera::new(SimulatorConfig::default())?;
//!     let engine = AcquisitionEngine::new(camera, EngineConfig::default())?;
//!     println!("Using device {}", engine.device_info().model);
//!
//!     engine.start_acquisition(Some(10))?;
//!     while let Some(result) = engine.retrieve(Duration::from_secs(5))? {
//!         if let Some(meta) = result.meta() {
//!             println!("frame {}: {}x{}", result.sequence(), meta.width, meta.height);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod hal;
pub mod worker;

// Re-export commonly used types for convenience
pub use acquisition::{AcquisitionEngine, Buffer, BufferPool, EngineState, FrameResult, PoolError, PoolMetrics};
pub use error::EngineError;
pub use hal::{DeviceInfo, FillStatus, FrameLayout, FrameMeta, FrameSource, PixelFormat, SourceError};
pub use worker::{CancellableWorker, WorkerError, WorkerState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
