// src/acquisition/buffer_pool.rs
//! Fixed-capacity pool of reusable frame buffers
//!
//! The pool is the deliberate throttle of the acquisition pipeline: it never
//! grows, so a consumer that falls behind back-pressures the producer through
//! checkout timeouts instead of unbounded allocation.

use crate::config::constants::pool;
use crate::hal::FrameMeta;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Buffer pool error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// No buffer became available within the checkout timeout. Transient;
    /// the producer retries this under its bounded retry policy.
    #[error("buffer pool exhausted: no buffer available within {waited_ms} ms (capacity {capacity})")]
    Exhausted {
        /// Configured pool capacity
        capacity: usize,
        /// How long the caller waited before giving up
        waited_ms: u64,
    },

    /// A buffer was handed back that this pool does not currently consider
    /// checked out. Programming error; loud in debug builds.
    #[error("buffer {buffer_id} rejected by pool: {reason}")]
    Misuse {
        /// Identifier of the offending buffer
        buffer_id: usize,
        /// Why the pool rejected it
        reason: &'static str,
    },

    /// Capacity outside the supported range.
    #[error("invalid pool capacity {0} (must be 1..={max})", max = pool::MAX_CAPACITY)]
    InvalidCapacity(usize),
}

/// One reusable frame buffer.
///
/// Owned by the pool while available, by the in-flight fill while checked
/// out, and by the [`FrameResult`](crate::FrameResult) that delivers it to
/// the consumer. The checkout sequence number tags delivery order.
#[derive(Debug)]
pub struct Buffer {
    id: usize,
    sequence: u64,
    data: Vec<u8>,
    meta: Option<FrameMeta>,
}

impl Buffer {
    fn new(id: usize, len: usize) -> Self {
        Self {
            id,
            sequence: 0,
            data: vec![0u8; len],
            meta: None,
        }
    }

    /// Pool-local identifier, stable across checkouts.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Monotonically increasing sequence number assigned at checkout.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Byte length of the backing storage.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the backing storage has zero length.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Frame bytes. Only meaningful once a fill succeeded.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable frame bytes for the source to write into.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Metadata of the last successful fill, if any.
    pub fn meta(&self) -> Option<&FrameMeta> {
        self.meta.as_ref()
    }

    pub(crate) fn set_meta(&mut self, meta: FrameMeta) {
        self.meta = Some(meta);
    }
}

struct PoolState {
    free: Vec<Buffer>,
    checked_out: Vec<bool>,
}

/// Snapshot of pool activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Configured capacity
    pub capacity: usize,
    /// Buffers currently available for checkout
    pub available: usize,
    /// Buffers currently checked out
    pub outstanding: usize,
    /// Total successful checkouts since construction
    pub checkouts: u64,
    /// Checkout attempts that timed out waiting for a buffer
    pub exhaustions: u64,
}

/// Bounded set of reusable buffers with blocking checkout.
///
/// Safe for one producer performing checkouts concurrently with any number
/// of returns arriving through [`FrameResult`](crate::FrameResult) drops.
pub struct BufferPool {
    state: Mutex<PoolState>,
    available: Condvar,
    capacity: usize,
    buffer_len: usize,
    next_sequence: AtomicU64,
    checkouts: AtomicU64,
    exhaustions: AtomicU64,
}

impl BufferPool {
    /// Create a pool of `capacity` buffers of `buffer_len` bytes each.
    pub fn new(capacity: usize, buffer_len: usize) -> Result<Self, PoolError> {
        if capacity == 0 || capacity > pool::MAX_CAPACITY {
            return Err(PoolError::InvalidCapacity(capacity));
        }

        let free = (0..capacity).map(|id| Buffer::new(id, buffer_len)).collect();

        Ok(Self {
            state: Mutex::new(PoolState {
                free,
                checked_out: vec![false; capacity],
            }),
            available: Condvar::new(),
            capacity,
            buffer_len,
            next_sequence: AtomicU64::new(0),
            checkouts: AtomicU64::new(0),
            exhaustions: AtomicU64::new(0),
        })
    }

    /// Check out a buffer, blocking up to `timeout` for one to free up.
    ///
    /// The returned buffer carries a fresh sequence number; delivery order
    /// downstream must follow these sequence numbers.
    pub fn checkout(&self, timeout: Duration) -> Result<Buffer, PoolError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        loop {
            if let Some(mut buffer) = state.free.pop() {
                state.checked_out[buffer.id] = true;
                buffer.sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
                buffer.meta = None;
                self.checkouts.fetch_add(1, Ordering::Relaxed);
                return Ok(buffer);
            }

            if self.available.wait_until(&mut state, deadline).timed_out() {
                self.exhaustions.fetch_add(1, Ordering::Relaxed);
                return Err(PoolError::Exhausted {
                    capacity: self.capacity,
                    waited_ms: timeout.as_millis() as u64,
                });
            }
        }
    }

    /// Make a previously checked-out buffer available again.
    ///
    /// Rejects buffers the pool does not consider checked out; that is a
    /// programming error and trips a `debug_assert`.
    pub fn give_back(&self, mut buffer: Buffer) -> Result<(), PoolError> {
        let mut state = self.state.lock();

        if buffer.id >= self.capacity || buffer.data.len() != self.buffer_len {
            debug_assert!(false, "buffer {} does not belong to this pool", buffer.id);
            return Err(PoolError::Misuse {
                buffer_id: buffer.id,
                reason: "buffer does not belong to this pool",
            });
        }

        if !state.checked_out[buffer.id] {
            debug_assert!(false, "buffer {} is not checked out", buffer.id);
            return Err(PoolError::Misuse {
                buffer_id: buffer.id,
                reason: "buffer is not checked out",
            });
        }

        state.checked_out[buffer.id] = false;
        buffer.meta = None;
        state.free.push(buffer);
        drop(state);

        self.available.notify_one();
        Ok(())
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Byte length of each buffer.
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Buffers currently available for checkout.
    pub fn available(&self) -> usize {
        self.state.lock().free.len()
    }

    /// Buffers currently checked out.
    pub fn outstanding(&self) -> usize {
        self.capacity - self.available()
    }

    /// Current activity snapshot.
    pub fn metrics(&self) -> PoolMetrics {
        let available = self.available();
        PoolMetrics {
            capacity: self.capacity,
            available,
            outstanding: self.capacity - available,
            checkouts: self.checkouts.load(Ordering::Relaxed),
            exhaustions: self.exhaustions.load(Ordering::Relaxed),
        }
    }
}
