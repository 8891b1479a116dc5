// src/acquisition/mod.rs
//! Buffer pooling and the streaming acquisition engine

pub mod buffer_pool;
pub mod engine;
pub mod result;

pub use buffer_pool::{Buffer, BufferPool, PoolError, PoolMetrics};
pub use engine::{AcquisitionEngine, EngineState};
pub use result::FrameResult;
