//! Scanline compositing for decoded GIF frames
//!
//! The decoder hands over one row of palette indices at a time. The
//! compositor clips the row to its destination, resolves transparency and
//! writes opaque pixels in as few block writes as possible.

use embedded_graphics::geometry::Point;
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

use crate::surface::Surface;

/// Widest scanline the compositor accepts
pub const MAX_SCANLINE_WIDTH: usize = 320;

/// What happens to a frame's area before the next frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal {
    /// Leave the frame in place
    Keep,
    /// Restore the background colour
    Background,
    /// Restore what was there before the frame
    Previous,
}

impl From<gif::DisposalMethod> for Disposal {
    fn from(method: gif::DisposalMethod) -> Self {
        match method {
            gif::DisposalMethod::Background => Disposal::Background,
            gif::DisposalMethod::Previous => Disposal::Previous,
            gif::DisposalMethod::Any | gif::DisposalMethod::Keep => Disposal::Keep,
        }
    }
}

/// One decoded row, in palette indices
#[derive(Debug, Clone, Copy)]
pub struct Scanline<'a> {
    /// Destination column of the first index
    pub x: u32,
    /// Destination row
    pub y: u32,
    pub indices: &'a [u8],
    /// RGB565 palette the indices refer to
    pub palette: &'a [Rgb565],
    pub transparent: Option<u8>,
    pub background: u8,
    pub disposal: Disposal,
}

impl Scanline<'_> {
    fn color(&self, index: u8) -> Rgb565 {
        self.palette
            .get(usize::from(index))
            .copied()
            .unwrap_or(Rgb565::BLACK)
    }

    /// Transparent index still in effect after disposal handling
    ///
    /// Background disposal paints transparent pixels with the background
    /// entry, which makes the whole line opaque.
    fn effective_transparent(&self) -> Option<u8> {
        match self.disposal {
            Disposal::Background => None,
            _ => self.transparent,
        }
    }

    fn resolve(&self, index: u8) -> u8 {
        match (self.disposal, self.transparent) {
            (Disposal::Background, Some(t)) if index == t => self.background,
            _ => index,
        }
    }
}

/// Receiver of decoded rows
pub trait ScanlineSink {
    fn draw(&mut self, line: &Scanline<'_>);
}

/// Run-length compositor writing into a [`Surface`]
pub struct RunLengthCompositor<'s> {
    surface: &'s mut Surface,
    width: u32,
}

impl<'s> RunLengthCompositor<'s> {
    /// Composite into `surface`, clipping every row to `width` columns
    pub fn new(surface: &'s mut Surface, width: u32) -> Self {
        Self { surface, width }
    }
}

impl ScanlineSink for RunLengthCompositor<'_> {
    fn draw(&mut self, line: &Scanline<'_>) {
        let room = self.width.saturating_sub(line.x) as usize;
        let count = line.indices.len().min(room).min(MAX_SCANLINE_WIDTH);
        let indices = &line.indices[..count];
        let at = |i: usize| Point::new((line.x as usize + i) as i32, line.y as i32);

        let Some(transparent) = line.effective_transparent() else {
            if count > 0 {
                self.surface
                    .push_pixels(at(0), indices.iter().map(|&i| line.color(line.resolve(i))));
            }
            return;
        };

        let mut i = 0;
        while i < count {
            let start = i;
            while i < count && indices[i] != transparent {
                i += 1;
            }
            if i > start {
                self.surface
                    .push_pixels(at(start), indices[start..i].iter().map(|&index| line.color(index)));
            }
            while i < count && indices[i] == transparent {
                i += 1;
            }
        }
    }
}
