// src/bin/worker.rs
//! Standalone periodic worker alongside a main-thread loop.
//!
//! Runs a `CancellableWorker` printing on each tick while the main thread
//! does its own work, until an external cancellation signal (Ctrl-C) is
//! observed. Exits 0 after a clean cooperative shutdown.

use clap::Parser;
use framegrab_core::CancellableWorker;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "worker", about = "Run a cancellable periodic worker until Ctrl-C")]
struct Args {
    /// Worker tick interval in milliseconds
    #[arg(long, default_value_t = framegrab_core::config::constants::worker::DEFAULT_INTERVAL_MS)]
    interval_ms: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("An error occurred.");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut worker = CancellableWorker::new(Duration::from_millis(args.interval_ms), || {
        println!("Thread is running...");
    });
    worker.start()?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })?;

    println!("Press Ctrl-C to exit.");
    while running.load(Ordering::SeqCst) {
        println!("Working from main");
        thread::sleep(Duration::from_millis(1000));
    }

    worker.stop();
    Ok(())
}
