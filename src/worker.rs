// src/worker.rs
//! Cancellable periodic background worker
//!
//! Generic companion to the acquisition engine: one thread running a
//! pluggable tick on an interval, with cooperative stop. The sleep is a wait
//! on a cancellation channel, so `stop()` wakes the worker immediately
//! instead of waiting out the interval, and is guaranteed to return only
//! after the thread has exited.

use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// Lifecycle state of a [`CancellableWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, not yet started
    Created,
    /// Tick thread is running
    Running,
    /// Stopped; a worker does not restart
    Stopped,
}

/// Worker lifecycle errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    /// `start` was called more than once, or after `stop`.
    #[error("worker cannot start from state {0:?}")]
    AlreadyStarted(WorkerState),

    /// The tick thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

/// Periodic background task with cooperative start/stop.
///
/// The tick closure is supplied at construction and runs on the worker's own
/// thread: tick, then sleep the interval, until cancelled. No tick starts
/// after [`stop`](Self::stop) returns. Dropping a running worker stops and
/// joins it.
pub struct CancellableWorker {
    interval: Duration,
    tick: Option<Box<dyn FnMut() + Send>>,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    state: WorkerState,
}

impl CancellableWorker {
    /// Create a worker that will run `tick` every `interval` once started.
    pub fn new(interval: Duration, tick: impl FnMut() + Send + 'static) -> Self {
        Self {
            interval,
            tick: Some(Box::new(tick)),
            cancel: None,
            handle: None,
            state: WorkerState::Created,
        }
    }

    /// Spawn the tick thread. Valid once, from the Created state.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        if self.state != WorkerState::Created {
            return Err(WorkerError::AlreadyStarted(self.state));
        }

        // Present whenever state is Created.
        let Some(mut tick) = self.tick.take() else {
            return Err(WorkerError::AlreadyStarted(self.state));
        };

        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("framegrab-worker".to_string())
            .spawn(move || {
                loop {
                    tick();
                    match cancel_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        // Cancelled by message or by the sender dropping.
                        _ => break,
                    }
                }
                debug!("worker loop exited");
            })
            .map_err(|err| WorkerError::Spawn(err.to_string()))?;

        self.cancel = Some(cancel_tx);
        self.handle = Some(handle);
        self.state = WorkerState::Running;
        Ok(())
    }

    /// Request cancellation and join the tick thread. Idempotent.
    ///
    /// Guarantees no tick executes after this returns. A tick already in
    /// progress is allowed to finish.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
        self.state = WorkerState::Stopped;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Configured tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for CancellableWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
