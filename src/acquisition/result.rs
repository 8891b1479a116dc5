// src/acquisition/result.rs
//! Move-only delivery handle for one acquired frame
//!
//! A `FrameResult` is the sole path by which a buffer re-enters the pool:
//! dropping the handle (or calling [`FrameResult::release`]) gives the buffer
//! back exactly once, however the consumer's scope exits.

use crate::acquisition::buffer_pool::{Buffer, BufferPool, PoolError};
use crate::hal::{FrameMeta, SourceError};
use std::sync::Arc;
use tracing::error;

/// One filled (or failed) frame on its way to the consumer.
///
/// Not `Clone`: two owners would mean two returns of the same buffer.
pub struct FrameResult {
    buffer: Option<Buffer>,
    pool: Arc<BufferPool>,
    sequence: u64,
    outcome: Result<FrameMeta, SourceError>,
}

impl FrameResult {
    pub(crate) fn completed(buffer: Buffer, meta: FrameMeta, pool: Arc<BufferPool>) -> Self {
        let sequence = buffer.sequence();
        Self {
            buffer: Some(buffer),
            pool,
            sequence,
            outcome: Ok(meta),
        }
    }

    pub(crate) fn failed(buffer: Buffer, error: SourceError, pool: Arc<BufferPool>) -> Self {
        let sequence = buffer.sequence();
        Self {
            buffer: Some(buffer),
            pool,
            sequence,
            outcome: Err(error),
        }
    }

    /// True if the fill completed and [`data`](Self::data) holds a frame.
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Checkout sequence number of the underlying buffer; results arrive at
    /// the consumer in this order.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Frame metadata for a successful fill.
    pub fn meta(&self) -> Option<FrameMeta> {
        self.outcome.as_ref().ok().copied()
    }

    /// The fault carried by a failed fill.
    pub fn error(&self) -> Option<&SourceError> {
        self.outcome.as_ref().err()
    }

    /// Pixel bytes of a successful fill. `None` for failed fills and after
    /// an explicit release.
    pub fn data(&self) -> Option<&[u8]> {
        if self.outcome.is_err() {
            return None;
        }
        self.buffer.as_ref().map(|buffer| buffer.data())
    }

    /// Return the buffer to its pool immediately, leaving the handle empty.
    pub fn release(mut self) -> Result<(), PoolError> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<(), PoolError> {
        match self.buffer.take() {
            Some(buffer) => self.pool.give_back(buffer),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for FrameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameResult")
            .field("sequence", &self.sequence)
            .field("succeeded", &self.succeeded())
            .field("released", &self.buffer.is_none())
            .finish()
    }
}

impl Drop for FrameResult {
    fn drop(&mut self) {
        if let Err(err) = self.release_inner() {
            error!(sequence = self.sequence, %err, "buffer give-back failed on drop");
        }
    }
}
