//! Screen layout and colours

use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;

/// Convert a raw RGB565 word
pub fn rgb565(raw: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(raw))
}

/// A layer's placement on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub origin: Point,
    pub size: Size,
    pub background: Rgb565,
}

/// Background colours of the sensor rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowColors {
    pub temperature: Rgb565,
    pub humidity: Rgb565,
    pub pressure: Rgb565,
}

/// Positions and colours of the three layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub screen: Size,
    pub background: Rgb565,
    pub text: Rgb565,
    pub title: Region,
    pub data: Region,
    pub icon: Region,
    pub rows: RowColors,
    /// Vertical pitch of a small text row
    pub line_height: i32,
}

impl Default for Layout {
    fn default() -> Self {
        let background = rgb565(0x10cd);
        let reading = rgb565(0x1c43);
        Self {
            screen: Size::new(256, 240),
            background,
            text: rgb565(0xffff),
            title: Region {
                origin: Point::new(2, 9),
                size: Size::new(239, 32),
                background: rgb565(0x0019),
            },
            data: Region {
                origin: Point::new(2, 140),
                size: Size::new(174, 96),
                background,
            },
            icon: Region {
                origin: Point::new(180, 140),
                size: Size::new(72, 96),
                background,
            },
            rows: RowColors {
                temperature: reading,
                humidity: reading,
                pressure: reading,
            },
            line_height: 16,
        }
    }
}

impl Layout {
    /// Check that every layer lies on screen
    pub fn fits(&self) -> bool {
        [self.title, self.data, self.icon].iter().all(|region| {
            region.origin.x >= 0
                && region.origin.y >= 0
                && region.origin.x as u32 + region.size.width <= self.screen.width
                && region.origin.y as u32 + region.size.height <= self.screen.height
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::raw::RawData;

    #[test]
    fn test_default_layout_fits() {
        assert!(Layout::default().fits());
    }

    #[test]
    fn test_raw_colour_roundtrip() {
        assert_eq!(RawU16::from(rgb565(0x10cd)).into_inner(), 0x10cd);
        assert_eq!(rgb565(0xffff), Rgb565::new(31, 63, 31));
    }

    #[test]
    fn test_offscreen_region_rejected() {
        let mut layout = Layout::default();
        layout.icon.origin = Point::new(200, 140);
        assert!(!layout.fits());
    }
}
