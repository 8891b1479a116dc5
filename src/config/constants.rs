// src/config/constants.rs
//! System-wide configuration constants

/// Buffer pool constants
pub mod pool {
    /// Default number of reusable buffers per pool
    pub const DEFAULT_CAPACITY: usize = 5;
    /// Upper bound on pool capacity
    pub const MAX_CAPACITY: usize = 1024;
    /// Default time a checkout waits for a free buffer
    pub const DEFAULT_CHECKOUT_TIMEOUT_MS: u64 = 1_000;
}

/// Acquisition engine constants
pub mod acquisition {
    /// Default per-fill timeout handed to the source
    pub const DEFAULT_FILL_TIMEOUT_MS: u64 = 5_000;
    /// Default number of checkout retries after an exhausted pool
    pub const DEFAULT_CHECKOUT_RETRIES: u32 = 3;
    /// Base delay between checkout retries; scales linearly per attempt
    pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 10;
    /// Poll period for the cancellation flag while the result queue is full
    pub const PUSH_POLL_MS: u64 = 100;

    /// Error code carried by results whose fill timed out
    pub const FILL_TIMEOUT_ERROR_CODE: u32 = 0xA001;
    /// Error code reported when a source is asked to fill before `open`
    pub const SOURCE_NOT_OPEN_ERROR_CODE: u32 = 0xA002;
    /// Default error code for faults injected by the simulated camera
    pub const INJECTED_FAULT_ERROR_CODE: u32 = 0xA0FF;
}

/// Frame geometry constants
pub mod frame {
    /// Default frame width in pixels
    pub const DEFAULT_WIDTH: u32 = 640;
    /// Default frame height in pixels
    pub const DEFAULT_HEIGHT: u32 = 480;
    /// Upper bound on either frame dimension
    pub const MAX_DIMENSION: u32 = 16_384;
}

/// Background worker constants
pub mod worker {
    /// Default tick interval for the demo worker
    pub const DEFAULT_INTERVAL_MS: u64 = 2_000;
}

/// Configuration file locations
pub mod paths {
    /// Environment variable overriding the configuration file path
    pub const ENV_CONFIG_PATH: &str = "FRAMEGRAB_CONFIG";
    /// Configuration file looked up in the working directory
    pub const DEFAULT_CONFIG_FILE: &str = "framegrab.toml";
    /// System-wide configuration file
    pub const SYSTEM_CONFIG_FILE: &str = "/etc/framegrab/framegrab.toml";
}
