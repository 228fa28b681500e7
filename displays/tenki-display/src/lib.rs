//! Display pipeline for the Tenki presenter
//!
//! This crate provides:
//! - `DisplayBackend` trait for the panel a frame is pushed to
//! - `FrameBuffer`, the persistent RGB565 frame
//! - `Surface`, a transient off-screen layer allocated per composition pass
//! - `RunLengthCompositor`, the scanline sink GIF frames are drawn through
//! - `Animation`, a looping GIF player streaming from an asset
//! - `RenderPipeline`, the `WeatherView` the presenter renders through
//!
//! # Architecture
//!
//! ```text
//!  title strip ─┐
//!  data panel  ─┼─ Surface ──blit──▶ FrameBuffer ──present──▶ DisplayBackend
//!  icon (GIF)  ─┘     ▲
//!                     └── RunLengthCompositor ◀── Animation ◀── AssetStore
//! ```
//!
//! Each layer is drawn into its own surface, blitted at a fixed offset and
//! released, so only one layer's worth of scratch memory is live at a time.

#![deny(unsafe_code)]

pub mod animation;
pub mod backend;
pub mod framebuffer;
pub mod layout;
pub mod panel;
pub mod pipeline;
pub mod scanline;
pub mod surface;

// Re-export key types
pub use animation::{Animation, AnimationError};
pub use backend::{DisplayBackend, DisplayError};
pub use framebuffer::FrameBuffer;
pub use layout::{Layout, Region};
pub use pipeline::RenderPipeline;
pub use scanline::{Disposal, RunLengthCompositor, Scanline, ScanlineSink};
pub use surface::Surface;
