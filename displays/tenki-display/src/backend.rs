//! Display backend trait
//!
//! Defines the interface for the panel a composed frame is pushed to.

use embedded_graphics::geometry::Size;

use crate::framebuffer::FrameBuffer;

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// Communication error with the panel
    #[error("display communication failed")]
    Communication,
    /// Panel not initialized
    #[error("display not initialized")]
    NotInitialized,
    /// A layer's off-screen surface could not be allocated
    #[error("cannot allocate {width}x{height} surface")]
    AllocationFailed { width: u32, height: u32 },
    /// Frame and panel disagree on dimensions
    #[error("frame is {frame_width}x{frame_height}, panel is {panel_width}x{panel_height}")]
    SizeMismatch {
        frame_width: u32,
        frame_height: u32,
        panel_width: u32,
        panel_height: u32,
    },
}

/// Display backend trait
///
/// Implementations own the actual panel (framebuffer device, simulator,
/// video output) and receive whole frames.
pub trait DisplayBackend {
    /// Panel dimensions in pixels
    fn dimensions(&self) -> Size;

    /// Push a complete frame to the panel
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError>;

    /// Check if the panel is ready
    fn is_ready(&self) -> bool {
        true
    }
}
