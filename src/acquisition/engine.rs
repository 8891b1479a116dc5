// src/acquisition/engine.rs
//! Streaming acquisition engine
//!
//! One producer thread per session: checkout a pool buffer, ask the source to
//! fill it, publish the outcome to a bounded result queue. The consumer drains
//! the queue from its own thread through [`AcquisitionEngine::retrieve`].
//! Results always arrive in buffer checkout order; the single producer
//! serializes this naturally.

use crate::acquisition::buffer_pool::{Buffer, BufferPool, PoolError, PoolMetrics};
use crate::acquisition::result::FrameResult;
use crate::config::constants::acquisition;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::hal::{DeviceInfo, FillStatus, FrameSource, SourceError};
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lifecycle state of an [`AcquisitionEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    /// Constructed, no session started yet
    Idle = 0,
    /// Producer loop is running
    Running = 1,
    /// Cancellation requested, producer winding down
    Stopping = 2,
    /// Session ended; a new one may be started
    Stopped = 3,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => EngineState::Idle,
            1 => EngineState::Running,
            2 => EngineState::Stopping,
            _ => EngineState::Stopped,
        }
    }
}

/// State shared between the engine handle and its producer thread.
struct Shared {
    state: AtomicU8,
    cancel: AtomicBool,
    produced: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(EngineState::Idle as u8),
            cancel: AtomicBool::new(false),
            produced: AtomicU64::new(0),
        }
    }

    fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: EngineState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn try_set_state(&self, from: EngineState, to: EngineState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

struct ProducerSlot {
    handle: Option<JoinHandle<()>>,
    results: Option<Receiver<FrameResult>>,
}

struct ProducerContext<S: FrameSource> {
    source: Arc<Mutex<S>>,
    pool: Arc<BufferPool>,
    config: EngineConfig,
    shared: Arc<Shared>,
    sender: Sender<FrameResult>,
    target: Option<u64>,
}

/// Producer/consumer engine around one [`FrameSource`].
///
/// The source is opened at construction and closed on drop; the device
/// identification is queried once at that point for diagnostic display.
pub struct AcquisitionEngine<S: FrameSource> {
    source: Arc<Mutex<S>>,
    pool: Arc<BufferPool>,
    config: EngineConfig,
    device_info: DeviceInfo,
    shared: Arc<Shared>,
    producer: Mutex<ProducerSlot>,
}

impl<S: FrameSource> AcquisitionEngine<S> {
    /// Open `source` and build the engine with a pool sized from the source's
    /// frame layout.
    pub fn new(mut source: S, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        source.open().map_err(|e| EngineError::Source(e.to_string()))?;
        let device_info = source.device_info();
        let layout = source.frame_layout();

        let pool = Arc::new(BufferPool::new(config.pool_capacity, layout.byte_len())?);
        info!(
            model = %device_info.model,
            frame_bytes = layout.byte_len(),
            pool_capacity = config.pool_capacity,
            "acquisition source opened"
        );

        Ok(Self {
            source: Arc::new(Mutex::new(source)),
            pool,
            config,
            device_info,
            shared: Arc::new(Shared::new()),
            producer: Mutex::new(ProducerSlot {
                handle: None,
                results: None,
            }),
        })
    }

    /// Start a session producing `target_count` results, or an unbounded one
    /// when `target_count` is `None`.
    ///
    /// Fails with [`EngineError::AlreadyRunning`] unless the engine is Idle
    /// or Stopped.
    pub fn start_acquisition(&self, target_count: Option<u64>) -> Result<(), EngineError> {
        loop {
            let current = self.shared.state();
            match current {
                EngineState::Idle | EngineState::Stopped => {
                    if self.shared.try_set_state(current, EngineState::Running) {
                        break;
                    }
                }
                EngineState::Running | EngineState::Stopping => {
                    return Err(EngineError::AlreadyRunning);
                }
            }
        }

        let mut slot = self.producer.lock();

        // A session that reached its target without an explicit stop leaves a
        // finished thread behind; reap it before spawning the next one.
        if let Some(handle) = slot.handle.take() {
            if handle.join().is_err() {
                error!("previous producer thread panicked");
            }
        }

        self.shared.cancel.store(false, Ordering::Release);
        self.shared.produced.store(0, Ordering::Release);

        let (sender, receiver) = bounded(self.config.pool_capacity);
        slot.results = Some(receiver);

        let ctx = ProducerContext {
            source: self.source.clone(),
            pool: self.pool.clone(),
            config: self.config.clone(),
            shared: self.shared.clone(),
            sender,
            target: target_count,
        };

        match thread::Builder::new()
            .name("framegrab-producer".to_string())
            .spawn(move || run_producer(ctx))
        {
            Ok(handle) => {
                slot.handle = Some(handle);
                info!(?target_count, "acquisition started");
                Ok(())
            }
            Err(err) => {
                slot.results = None;
                self.shared.set_state(EngineState::Stopped);
                Err(EngineError::Spawn(err.to_string()))
            }
        }
    }

    /// Pop the next result, blocking up to `timeout`.
    ///
    /// `Ok(None)` is the end-of-stream signal: the session ended and the
    /// queue is drained. An empty queue on a live session fails with
    /// [`EngineError::RetrieveTimeout`]. Intended for a single logical
    /// consumer; concurrent retrievers get no ordering guarantee.
    pub fn retrieve(&self, timeout: Duration) -> Result<Option<FrameResult>, EngineError> {
        let receiver = {
            let slot = self.producer.lock();
            match &slot.results {
                Some(receiver) => receiver.clone(),
                None => {
                    return Err(EngineError::InvalidState {
                        operation: "retrieve",
                        state: self.shared.state(),
                    })
                }
            }
        };

        match receiver.recv_timeout(timeout) {
            Ok(result) => Ok(Some(result)),
            Err(RecvTimeoutError::Timeout) => Err(EngineError::RetrieveTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    /// Request cancellation and join the producer thread. Idempotent.
    ///
    /// An in-flight fill is allowed to finish or hit its own timeout; the
    /// flag is observed at the next iteration boundary. Queued results stay
    /// retrievable afterwards. Must not be called from the producer's own
    /// thread (it would join itself).
    pub fn stop(&self) {
        self.shared.cancel.store(true, Ordering::Release);
        self.shared
            .try_set_state(EngineState::Running, EngineState::Stopping);

        let handle = self.producer.lock().handle.take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("producer thread panicked");
            }
        }

        self.shared.set_state(EngineState::Stopped);
        info!(produced = self.produced(), "acquisition stopped");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    /// True while a producer loop is running.
    pub fn is_acquiring(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// Results produced by the current or most recent session.
    pub fn produced(&self) -> u64 {
        self.shared.produced.load(Ordering::Acquire)
    }

    /// Identification of the underlying source, queried once at startup.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Activity snapshot of the underlying buffer pool.
    pub fn pool_metrics(&self) -> PoolMetrics {
        self.pool.metrics()
    }
}

impl<S: FrameSource> Drop for AcquisitionEngine<S> {
    fn drop(&mut self) {
        self.stop();
        if let Err(err) = self.source.lock().close() {
            warn!(error = %err, "failed to close acquisition source");
        }
    }
}

enum CheckoutFailure {
    Cancelled,
    Exhausted,
}

fn checkout_with_retry(
    pool: &BufferPool,
    config: &EngineConfig,
    shared: &Shared,
) -> Result<Buffer, CheckoutFailure> {
    let attempts = config.checkout_retries.saturating_add(1);

    for attempt in 0..attempts {
        if shared.cancel.load(Ordering::Acquire) {
            return Err(CheckoutFailure::Cancelled);
        }

        match pool.checkout(config.checkout_timeout()) {
            Ok(buffer) => return Ok(buffer),
            Err(PoolError::Exhausted { .. }) => {
                warn!(attempt, "buffer pool exhausted, retrying checkout");
                if attempt + 1 < attempts {
                    thread::sleep(config.retry_backoff().saturating_mul(attempt + 1));
                }
            }
            Err(err) => {
                error!(%err, "unexpected pool error during checkout");
                return Err(CheckoutFailure::Exhausted);
            }
        }
    }

    Err(CheckoutFailure::Exhausted)
}

/// Push one result, polling the cancellation flag while the queue is full so
/// `stop()` can never deadlock against a stalled consumer.
fn push_result(sender: &Sender<FrameResult>, shared: &Shared, result: FrameResult) -> bool {
    let mut result = result;
    loop {
        match sender.send_timeout(result, Duration::from_millis(acquisition::PUSH_POLL_MS)) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => {
                if shared.cancel.load(Ordering::Acquire) {
                    return false;
                }
                result = returned;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

fn run_producer<S: FrameSource>(ctx: ProducerContext<S>) {
    let ProducerContext {
        source,
        pool,
        config,
        shared,
        sender,
        target,
    } = ctx;

    let fill_timeout = config.fill_timeout();
    let mut produced: u64 = 0;

    loop {
        if shared.cancel.load(Ordering::Acquire) {
            debug!("cancellation observed, ending producer loop");
            break;
        }
        if let Some(target) = target {
            if produced >= target {
                info!(produced, "target count reached");
                break;
            }
        }

        let mut buffer = match checkout_with_retry(&pool, &config, &shared) {
            Ok(buffer) => buffer,
            Err(CheckoutFailure::Cancelled) => break,
            Err(CheckoutFailure::Exhausted) => {
                error!("buffer pool stayed exhausted through every retry, ending session");
                break;
            }
        };

        let sequence = buffer.sequence();
        let status = source.lock().fill(&mut buffer, fill_timeout);

        let result = match status {
            FillStatus::Success(meta) => {
                buffer.set_meta(meta);
                debug!(sequence, width = meta.width, height = meta.height, "frame acquired");
                FrameResult::completed(buffer, meta, pool.clone())
            }
            FillStatus::TimedOut => {
                warn!(sequence, timeout_ms = config.fill_timeout_ms, "fill timed out");
                FrameResult::failed(
                    buffer,
                    SourceError::fill_timeout(config.fill_timeout_ms),
                    pool.clone(),
                )
            }
            FillStatus::DeviceError(fault) => {
                warn!(sequence, code = fault.code, "source reported device fault");
                FrameResult::failed(buffer, fault, pool.clone())
            }
        };

        if !push_result(&sender, &shared, result) {
            break;
        }

        produced += 1;
        shared.produced.store(produced, Ordering::Release);
    }

    // Stopped must be observable before the consumer can see end-of-stream,
    // so the state store happens ahead of the sender drop.
    shared.set_state(EngineState::Stopped);
    drop(sender);
    info!(produced, "producer loop exited");
}
