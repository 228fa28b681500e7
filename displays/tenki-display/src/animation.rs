//! Looping GIF player streaming from an asset
//!
//! Frames are decoded one row at a time and handed to a [`ScanlineSink`];
//! no whole frame is ever buffered.

use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::Rgb565;
use log::{debug, trace};
use tenki_core::traits::{AssetError, AssetStore, ByteSource};

use crate::scanline::{Disposal, Scanline, ScanlineSink};

/// Errors playing an animation
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("gif: {0}")]
    Decode(#[from] gif::DecodingError),
    #[error("animation i/o: {0}")]
    Io(#[from] io::Error),
    #[error("`{0}` contains no frames")]
    Empty(String),
}

/// Interlaced row order: (first row, step) per pass
const INTERLACE_PASSES: [(u32, u32); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Display row of the `index`th row in an interlaced stream
pub fn interlaced_row(index: u32, height: u32) -> u32 {
    let mut remaining = index;
    for (first, step) in INTERLACE_PASSES {
        let rows = height.saturating_sub(first).div_ceil(step);
        if remaining < rows {
            return first + remaining * step;
        }
        remaining -= rows;
    }
    index
}

/// Convert an RGB888 palette to RGB565
fn palette565(rgb: &[u8]) -> Vec<Rgb565> {
    rgb.chunks_exact(3)
        .map(|c| Rgb565::new(c[0] >> 3, c[1] >> 2, c[2] >> 3))
        .collect()
}

/// Shares the open source between the decoder and the rewind logic
struct SharedReader<S>(Rc<RefCell<S>>);

impl<S: ByteSource> Read for SharedReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        ByteSource::read(&mut *self.0.borrow_mut(), buf)
    }
}

/// Placement and transparency of the frame being decoded
struct FrameInfo {
    left: u32,
    top: u32,
    width: usize,
    height: u32,
    interlaced: bool,
    transparent: Option<u8>,
    disposal: Disposal,
    palette: Option<Vec<Rgb565>>,
}

/// An open GIF animation
///
/// Advances one frame per [`play_frame`](Self::play_frame) and starts over
/// after the last frame. Dropping it closes the asset.
pub struct Animation<S: ByteSource> {
    name: String,
    source: Rc<RefCell<S>>,
    decoder: gif::Decoder<SharedReader<S>>,
    global_palette: Vec<Rgb565>,
    background: u8,
    line: Vec<u8>,
    frames: u64,
    loops: u32,
}

impl<S: ByteSource> Animation<S> {
    /// Open `name` from `assets` and read the GIF header
    pub fn open<A>(assets: &A, name: &str) -> Result<Self, AnimationError>
    where
        A: AssetStore<Source = S>,
    {
        let source = Rc::new(RefCell::new(assets.open(name)?));
        let decoder = Self::decoder(&source)?;
        debug!(
            "opened {} ({}x{}, {} bytes)",
            name,
            decoder.width(),
            decoder.height(),
            source.borrow().size()
        );
        Ok(Self {
            name: name.to_owned(),
            global_palette: decoder.global_palette().map(palette565).unwrap_or_default(),
            background: decoder.bg_color().and_then(|i| u8::try_from(i).ok()).unwrap_or(0),
            source,
            decoder,
            line: Vec::new(),
            frames: 0,
            loops: 0,
        })
    }

    fn decoder(source: &Rc<RefCell<S>>) -> Result<gif::Decoder<SharedReader<S>>, AnimationError> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);
        Ok(options.read_info(SharedReader(Rc::clone(source)))?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical screen size declared by the file
    pub fn size(&self) -> Size {
        Size::new(u32::from(self.decoder.width()), u32::from(self.decoder.height()))
    }

    /// Frames played since opening
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Times the animation wrapped around
    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Seek back to the start of the file and reread the header
    pub fn rewind(&mut self) -> Result<(), AnimationError> {
        self.source.borrow_mut().seek(0)?;
        self.decoder = Self::decoder(&self.source)?;
        self.loops = self.loops.wrapping_add(1);
        trace!("{}: rewound", self.name);
        Ok(())
    }

    /// Close the animation and its asset
    pub fn close(self) {
        debug!("closed {} after {} frames", self.name, self.frames);
    }

    fn next_frame(&mut self) -> Result<Option<FrameInfo>, AnimationError> {
        Ok(self.decoder.next_frame_info()?.map(|frame| FrameInfo {
            left: u32::from(frame.left),
            top: u32::from(frame.top),
            width: usize::from(frame.width),
            height: u32::from(frame.height),
            interlaced: frame.interlaced,
            transparent: frame.transparent,
            disposal: frame.dispose.into(),
            palette: frame.palette.as_deref().map(palette565),
        }))
    }

    /// Decode the next frame into `sink`, looping at the end of the file
    pub fn play_frame<K: ScanlineSink + ?Sized>(&mut self, sink: &mut K) -> Result<(), AnimationError> {
        let frame = match self.next_frame()? {
            Some(frame) => frame,
            None => {
                self.rewind()?;
                self.next_frame()?
                    .ok_or_else(|| AnimationError::Empty(self.name.clone()))?
            }
        };

        self.line.resize(frame.width, 0);
        let palette = frame.palette.as_deref().unwrap_or(&self.global_palette);
        for row in 0..frame.height {
            if !self.decoder.fill_buffer(&mut self.line)? {
                debug!("{}: frame truncated at row {}", self.name, row);
                break;
            }
            let y = if frame.interlaced {
                interlaced_row(row, frame.height)
            } else {
                row
            };
            sink.draw(&Scanline {
                x: frame.left,
                y: frame.top + y,
                indices: &self.line,
                palette,
                transparent: frame.transparent,
                background: self.background,
                disposal: frame.disposal,
            });
        }

        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scanline::RunLengthCompositor;
    use crate::surface::Surface;
    use embedded_graphics::geometry::Point;
    use embedded_graphics::pixelcolor::RgbColor;
    use std::borrow::Cow;
    use tenki_core::traits::MemoryAssetStore;

    /// black, red, green, blue
    const PALETTE: [u8; 12] = [0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255];

    /// Encode full-size frames filled with the given palette indices
    pub(crate) fn gif_of(width: u16, height: u16, fills: &[u8], transparent: Option<u8>) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut data, width, height, &PALETTE).unwrap();
            encoder.set_repeat(gif::Repeat::Infinite).unwrap();
            for &fill in fills {
                let mut frame = gif::Frame::default();
                frame.width = width;
                frame.height = height;
                frame.transparent = transparent;
                frame.buffer = Cow::Owned(vec![fill; usize::from(width) * usize::from(height)]);
                encoder.write_frame(&frame).unwrap();
            }
        }
        data
    }

    fn play(animation: &mut Animation<tenki_core::traits::MemorySource>) -> Surface {
        let mut surface = Surface::allocate(Size::new(4, 3), Rgb565::WHITE).unwrap();
        animation
            .play_frame(&mut RunLengthCompositor::new(&mut surface, 4))
            .unwrap();
        surface
    }

    #[test]
    fn test_interlaced_row_order() {
        let order: Vec<u32> = (0..8).map(|i| interlaced_row(i, 8)).collect();
        assert_eq!(order, [0, 4, 2, 6, 1, 3, 5, 7]);
        let order: Vec<u32> = (0..5).map(|i| interlaced_row(i, 5)).collect();
        assert_eq!(order, [0, 4, 2, 1, 3]);
        assert_eq!(interlaced_row(0, 1), 0);
    }

    #[test]
    fn test_frames_advance_and_loop() {
        let assets = MemoryAssetStore::new().with("/100.gif", gif_of(4, 3, &[1, 2], None));
        let mut animation = Animation::open(&assets, "/100.gif").unwrap();
        assert_eq!(animation.size(), Size::new(4, 3));

        let first = play(&mut animation);
        assert!(first.pixels().iter().all(|&c| c == Rgb565::RED));
        let second = play(&mut animation);
        assert!(second.pixels().iter().all(|&c| c == Rgb565::GREEN));
        assert_eq!(animation.loops(), 0);

        let third = play(&mut animation);
        assert!(third.pixels().iter().all(|&c| c == Rgb565::RED));
        assert_eq!(animation.loops(), 1);
        assert_eq!(animation.frames(), 3);
        animation.close();
    }

    #[test]
    fn test_transparent_frame_keeps_background() {
        let assets = MemoryAssetStore::new().with("/t.gif", gif_of(4, 3, &[0], Some(0)));
        let mut animation = Animation::open(&assets, "/t.gif").unwrap();
        let surface = play(&mut animation);
        assert_eq!(surface.pixel(Point::new(1, 1)), Some(Rgb565::WHITE));
        assert_eq!(surface.block_writes(), 0);
    }

    #[test]
    fn test_missing_and_corrupt_assets() {
        let assets = MemoryAssetStore::new().with("/bad.gif", b"not a gif".to_vec());
        assert!(matches!(
            Animation::open(&assets, "/none.gif"),
            Err(AnimationError::Asset(AssetError::NotFound(_)))
        ));
        assert!(matches!(
            Animation::open(&assets, "/bad.gif"),
            Err(AnimationError::Decode(_))
        ));
    }

    #[test]
    fn test_file_without_frames() {
        let assets = MemoryAssetStore::new().with("/empty.gif", gif_of(2, 2, &[], None));
        let mut animation = Animation::open(&assets, "/empty.gif").unwrap();
        let mut surface = Surface::allocate(Size::new(2, 2), Rgb565::WHITE).unwrap();
        assert!(matches!(
            animation.play_frame(&mut RunLengthCompositor::new(&mut surface, 2)),
            Err(AnimationError::Empty(_))
        ));
    }
}
