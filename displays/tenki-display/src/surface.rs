//! Transient off-screen layers

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::Pixel;

use crate::backend::DisplayError;

/// One layer's pixels, painted then blitted onto the [`FrameBuffer`]
///
/// Allocated fallibly for each composition pass and dropped right after
/// the blit.
///
/// [`FrameBuffer`]: crate::framebuffer::FrameBuffer
#[derive(Debug)]
pub struct Surface {
    size: Size,
    pixels: Vec<Rgb565>,
    block_writes: u32,
}

impl Surface {
    /// Allocate a surface filled with `background`
    pub fn allocate(size: Size, background: Rgb565) -> Result<Self, DisplayError> {
        let failed = DisplayError::AllocationFailed {
            width: size.width,
            height: size.height,
        };
        let len = (size.width as usize)
            .checked_mul(size.height as usize)
            .ok_or(failed)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| failed)?;
        pixels.resize(len, background);
        Ok(Self {
            size,
            pixels,
            block_writes: 0,
        })
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        self.index(point.x, point.y).map(|i| self.pixels[i])
    }

    /// Number of [`push_pixels`](Self::push_pixels) calls so far
    pub fn block_writes(&self) -> u32 {
        self.block_writes
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        (x < self.size.width && y < self.size.height)
            .then(|| y as usize * self.size.width as usize + x as usize)
    }

    /// Write a horizontal run starting at `origin` as one block
    ///
    /// Pixels past the right edge are discarded.
    pub fn push_pixels<I>(&mut self, origin: Point, colors: I)
    where
        I: IntoIterator<Item = Rgb565>,
    {
        self.block_writes += 1;
        for (dx, color) in colors.into_iter().enumerate() {
            match self.index(origin.x + dx as i32, origin.y) {
                Some(i) => self.pixels[i] = color,
                None if origin.x + (dx as i32) < 0 => continue,
                None => break,
            }
        }
    }
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Surface {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point.x, point.y) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }
}
