// src/hal/traits.rs
//! Core trait for acquisition source abstraction

use crate::acquisition::Buffer;
use crate::hal::types::{DeviceInfo, FillStatus, FrameLayout};
use std::error::Error;
use std::time::Duration;

/// A device or transport capable of filling buffers with frame data.
///
/// The engine drives exactly one source from its producer thread, so
/// implementations only need `Send`. Per-frame faults are reported through
/// [`FillStatus`], not through `Self::Error`; the error type covers the
/// open/close lifecycle only.
pub trait FrameSource: Send + 'static {
    /// Lifecycle error type
    type Error: Error + Send + Sync + 'static;

    /// Open the device for acquisition
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Close the device, releasing any transport resources
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Fill `buffer` with one frame, blocking at most `timeout`.
    ///
    /// All three outcomes are ordinary data: a timeout or device fault must
    /// not leave the source in a state that prevents further fill requests.
    fn fill(&mut self, buffer: &mut Buffer, timeout: Duration) -> FillStatus;

    /// Identification for diagnostic display
    fn device_info(&self) -> DeviceInfo;

    /// Geometry of the frames this source produces
    fn frame_layout(&self) -> FrameLayout;
}
