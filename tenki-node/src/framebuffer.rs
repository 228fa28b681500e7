//! Framebuffer device backend

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use embedded_graphics::geometry::Size;
use log::{info, warn};
use tenki_display::{DisplayBackend, DisplayError, FrameBuffer};

/// Writes whole RGB565 frames to a framebuffer device or plain file
pub struct FramebufferDevice {
    path: PathBuf,
    size: Size,
    file: File,
}

impl FramebufferDevice {
    pub fn open(path: &Path, size: Size) -> Result<Self, DisplayError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                warn!("cannot open {}: {}", path.display(), e);
                DisplayError::NotInitialized
            })?;
        info!("framebuffer {} ({}x{})", path.display(), size.width, size.height);
        Ok(Self {
            path: path.to_owned(),
            size,
            file,
        })
    }
}

impl DisplayBackend for FramebufferDevice {
    fn dimensions(&self) -> Size {
        self.size
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        if frame.size() != self.size {
            return Err(DisplayError::SizeMismatch {
                frame_width: frame.size().width,
                frame_height: frame.size().height,
                panel_width: self.size.width,
                panel_height: self.size.height,
            });
        }
        let bytes = frame.to_le_bytes();
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.write_all(&bytes))
            .and_then(|_| self.file.flush())
            .map_err(|e| {
                warn!("write to {} failed: {}", self.path.display(), e);
                DisplayError::Communication
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

    #[test]
    fn test_present_overwrites_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb0");
        let mut device = FramebufferDevice::open(&path, Size::new(4, 2)).unwrap();

        device.present(&FrameBuffer::new(Size::new(4, 2), Rgb565::WHITE)).unwrap();
        device.present(&FrameBuffer::new(Size::new(4, 2), Rgb565::BLACK)).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, vec![0u8; 16]);
    }

    #[test]
    fn test_rejects_wrong_frame_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut device = FramebufferDevice::open(&dir.path().join("fb0"), Size::new(4, 2)).unwrap();
        assert!(matches!(
            device.present(&FrameBuffer::new(Size::new(2, 2), Rgb565::BLACK)),
            Err(DisplayError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_unopenable_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("fb0");
        assert!(matches!(
            FramebufferDevice::open(&path, Size::new(4, 2)),
            Err(DisplayError::NotInitialized)
        ));
    }
}
