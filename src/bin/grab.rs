// src/bin/grab.rs
//! N-frame acquisition session with per-frame diagnostics.
//!
//! Grabs frames from the simulated camera through the streaming engine and
//! prints width/height/first-pixel diagnostics for each one. Exits 0 on a
//! clean session, non-zero on any unhandled session error.

use clap::Parser;
use framegrab_core::config::{ConfigLoader, SystemConfig};
use framegrab_core::hal::simulator::SimulatedCamera;
use framegrab_core::AcquisitionEngine;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "grab", about = "Grab N frames from the simulated camera")]
struct Args {
    /// Number of frames to grab
    #[arg(short = 'n', long, default_value_t = 100)]
    frames: u64,

    /// Configuration file (TOML); defaults to the standard search paths
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-retrieve timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    retrieve_timeout_ms: u64,
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
    let config = match &args.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::new().load()?,
    };
    let SystemConfig { engine, simulator } = config;

    let camera = SimulatedCamera::new(simulator.unwrap_or_default())?;
    let engine = AcquisitionEngine::new(camera, engine)?;

    println!("Using device {}", engine.device_info().model);

    engine.start_acquisition(Some(args.frames))?;

    let timeout = Duration::from_millis(args.retrieve_timeout_ms);
    while let Some(result) = engine.retrieve(timeout)? {
        if result.succeeded() {
            if let (Some(meta), Some(data)) = (result.meta(), result.data()) {
                let (mean, min, max) = frame_stats(data);
                println!("SizeX: {}", meta.width);
                println!("SizeY: {}", meta.height);
                println!(
                    "Gray value of first pixel: {}",
                    data.first().copied().unwrap_or(0)
                );
                println!("Intensity mean/min/max: {mean:.1}/{min}/{max}");
                println!();
            }
        } else if let Some(err) = result.error() {
            println!("Error: {:#06x} {}", err.code, err.description);
        }
    }

    engine.stop();
    Ok(())
}

fn frame_stats(data: &[u8]) -> (f64, u8, u8) {
    if data.is_empty() {
        return (0.0, 0, 0);
    }

    let sum: u64 = data.iter().map(|&v| v as u64).sum();
    let mean = sum as f64 / data.len() as f64;
    let min = *data.iter().min().unwrap_or(&0);
    let max = *data.iter().max().unwrap_or(&0);

    (mean, min, max)
}
