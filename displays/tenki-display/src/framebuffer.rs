//! Persistent RGB565 frame

use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565;

use crate::surface::Surface;

/// The whole screen, kept between composition passes
///
/// Layers are blitted into it; the backend receives it on `present`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    size: Size,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    pub fn new(size: Size, fill: Rgb565) -> Self {
        Self {
            size,
            pixels: vec![fill; size.width as usize * size.height as usize],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        (x < self.size.width && y < self.size.height)
            .then(|| y as usize * self.size.width as usize + x as usize)
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        self.index(point.x, point.y).map(|i| self.pixels[i])
    }

    /// Paint a rectangle, clipped to the screen
    pub fn fill(&mut self, origin: Point, size: Size, color: Rgb565) {
        for y in origin.y..origin.y + size.height as i32 {
            for x in origin.x..origin.x + size.width as i32 {
                if let Some(i) = self.index(x, y) {
                    self.pixels[i] = color;
                }
            }
        }
    }

    /// Copy a layer onto the frame with its top-left corner at `origin`
    ///
    /// Parts falling outside the screen are dropped.
    pub fn blit(&mut self, surface: &Surface, origin: Point) {
        let size = surface.size();
        for (row, line) in surface.pixels().chunks(size.width.max(1) as usize).enumerate() {
            let y = origin.y + row as i32;
            for (col, &color) in line.iter().enumerate() {
                if let Some(i) = self.index(origin.x + col as i32, y) {
                    self.pixels[i] = color;
                }
            }
        }
    }

    /// Frame as little-endian RGB565 words, row major
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&c| RawU16::from(c).into_inner().to_le_bytes())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn test_blit_clips_to_screen() {
        let mut frame = FrameBuffer::new(Size::new(4, 3), Rgb565::BLACK);
        let surface = Surface::allocate(Size::new(3, 2), Rgb565::RED).unwrap();
        frame.blit(&surface, Point::new(2, 2));

        assert_eq!(frame.pixel(Point::new(2, 2)), Some(Rgb565::RED));
        assert_eq!(frame.pixel(Point::new(3, 2)), Some(Rgb565::RED));
        assert_eq!(frame.pixel(Point::new(1, 2)), Some(Rgb565::BLACK));
        assert_eq!(frame.pixel(Point::new(2, 1)), Some(Rgb565::BLACK));
        assert_eq!(frame.pixel(Point::new(4, 2)), None);
        assert_eq!(
            frame.pixels().iter().filter(|&&c| c == Rgb565::RED).count(),
            2
        );
    }

    #[test]
    fn test_negative_origin() {
        let mut frame = FrameBuffer::new(Size::new(2, 2), Rgb565::BLACK);
        let surface = Surface::allocate(Size::new(2, 2), Rgb565::GREEN).unwrap();
        frame.blit(&surface, Point::new(-1, -1));
        assert_eq!(frame.pixel(Point::new(0, 0)), Some(Rgb565::GREEN));
        assert_eq!(frame.pixel(Point::new(1, 1)), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_le_bytes() {
        let mut frame = FrameBuffer::new(Size::new(2, 1), Rgb565::WHITE);
        frame.fill(Point::new(1, 0), Size::new(5, 5), Rgb565::from(RawU16::new(0x10cd)));
        assert_eq!(frame.to_le_bytes(), [0xff, 0xff, 0xcd, 0x10]);
    }
}
