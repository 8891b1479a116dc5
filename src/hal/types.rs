// src/hal/types.rs
//! Core types for the acquisition source abstraction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit grayscale
    Mono8,
    /// 16-bit grayscale, little-endian
    Mono16,
    /// 8-bit RGB, interleaved
    Rgb8,
}

impl PixelFormat {
    /// Bytes occupied by a single pixel in this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Mono8 => 1,
            PixelFormat::Mono16 => 2,
            PixelFormat::Rgb8 => 3,
        }
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::Mono8
    }
}

/// Fixed geometry of the frames a source produces.
///
/// The engine sizes its pool buffers from this, so it is queried once at
/// construction and must not change while the source is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLayout {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel layout
    pub pixel_format: PixelFormat,
}

impl FrameLayout {
    /// Total byte length of one frame in this layout.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.pixel_format.bytes_per_pixel()
    }
}

/// Metadata attached to a successfully filled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMeta {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel layout of the frame data
    pub pixel_format: PixelFormat,
    /// Source-assigned capture timestamp, nanoseconds since the Unix epoch
    pub timestamp_ns: u64,
}

/// Device identification, queried once at startup for diagnostic display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable model name
    pub model: String,
    /// Vendor string
    pub vendor: String,
    /// Device serial number
    pub serial_number: String,
}

/// Structured fault reported by a source for a single fill request.
///
/// These travel as data inside a failed [`FrameResult`](crate::FrameResult);
/// they never abort a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    /// Device- or transport-specific error code
    pub code: u32,
    /// Human-readable description of the fault
    pub description: String,
}

impl SourceError {
    /// Fault describing a fill that did not complete within its timeout.
    pub fn fill_timeout(timeout_ms: u64) -> Self {
        Self {
            code: crate::config::constants::acquisition::FILL_TIMEOUT_ERROR_CODE,
            description: format!("fill did not complete within {timeout_ms} ms"),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}: {}", self.code, self.description)
    }
}

/// Outcome of a single fill request.
#[derive(Debug, Clone, PartialEq)]
pub enum FillStatus {
    /// The buffer now holds one complete frame described by the metadata.
    Success(FrameMeta),
    /// The source could not produce a frame within the requested timeout.
    TimedOut,
    /// The source reported a transport- or device-level fault.
    DeviceError(SourceError),
}
