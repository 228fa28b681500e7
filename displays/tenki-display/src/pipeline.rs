//! Layered render pipeline behind the presenter's `WeatherView`

use log::{debug, info, warn};
use tenki_core::traits::{AssetStore, WeatherView};
use tenki_core::WeatherRecord;

use crate::animation::{Animation, AnimationError};
use crate::backend::{DisplayBackend, DisplayError};
use crate::framebuffer::FrameBuffer;
use crate::layout::{Layout, Region};
use crate::panel::{DataPanel, TitlePanel};
use crate::scanline::RunLengthCompositor;
use crate::surface::Surface;

/// Why a layer could not be composed
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Composes the title, data and icon layers into a persistent frame
pub struct RenderPipeline<B, A: AssetStore> {
    backend: B,
    assets: A,
    layout: Layout,
    station: String,
    frame: FrameBuffer,
    animation: Option<Animation<A::Source>>,
    /// Icon that failed to open; not retried until the path changes
    unavailable: Option<String>,
    presented: u64,
}

impl<B: DisplayBackend, A: AssetStore> RenderPipeline<B, A> {
    pub fn new(backend: B, assets: A, layout: Layout, station: impl Into<String>) -> Result<Self, DisplayError> {
        if !backend.is_ready() {
            return Err(DisplayError::NotInitialized);
        }
        let panel = backend.dimensions();
        if panel != layout.screen {
            return Err(DisplayError::SizeMismatch {
                frame_width: layout.screen.width,
                frame_height: layout.screen.height,
                panel_width: panel.width,
                panel_height: panel.height,
            });
        }
        info!("display {}x{} ready", panel.width, panel.height);

        Ok(Self {
            frame: FrameBuffer::new(layout.screen, layout.background),
            backend,
            assets,
            layout,
            station: station.into(),
            animation: None,
            unavailable: None,
            presented: 0,
        })
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Name of the animation currently open
    pub fn animation(&self) -> Option<&str> {
        self.animation.as_ref().map(Animation::name)
    }

    /// Frames pushed to the backend
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Allocate a layer, paint it and blit it at the region's origin
    fn compose<F>(&mut self, region: Region, paint: F) -> Result<(), ComposeError>
    where
        F: FnOnce(&mut Surface, &mut Option<Animation<A::Source>>) -> Result<(), ComposeError>,
    {
        let mut surface = Surface::allocate(region.size, region.background)?;
        paint(&mut surface, &mut self.animation)?;
        self.frame.blit(&surface, region.origin);
        Ok(())
    }

    pub fn try_compose_title(&mut self, day: &str, time: &str) -> Result<(), ComposeError> {
        let title = TitlePanel::new(&self.station, day, time);
        let layout = self.layout;
        self.compose(layout.title, |surface, _| {
            title.draw(surface, &layout).unwrap_or_else(|never| match never {});
            Ok(())
        })
    }

    pub fn try_compose_data(&mut self, record: &WeatherRecord) -> Result<(), ComposeError> {
        let panel = DataPanel::from_record(record);
        let layout = self.layout;
        self.compose(layout.data, |surface, _| {
            panel.draw(surface, &layout).unwrap_or_else(|never| match never {});
            Ok(())
        })
    }

    fn clear_icon(&mut self) {
        let icon = self.layout.icon;
        self.frame.fill(icon.origin, icon.size, icon.background);
    }

    fn close_animation(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.close();
        }
    }

    pub fn try_compose_icon(&mut self, path: &str) -> Result<(), ComposeError> {
        if path.is_empty() {
            self.close_animation();
            self.unavailable = None;
            self.clear_icon();
            return Ok(());
        }
        if self.unavailable.as_deref() == Some(path) {
            return Ok(());
        }
        if self.animation() != Some(path) {
            self.close_animation();
            self.clear_icon();
            match Animation::open(&self.assets, path) {
                Ok(animation) => {
                    self.unavailable = None;
                    self.animation = Some(animation);
                }
                Err(e) => {
                    self.unavailable = Some(path.to_owned());
                    return Err(e.into());
                }
            }
        }

        let icon = self.layout.icon;
        let result = self.compose(icon, |surface, animation| match animation {
            Some(animation) => {
                let mut compositor = RunLengthCompositor::new(surface, icon.size.width);
                Ok(animation.play_frame(&mut compositor)?)
            }
            None => Ok(()),
        });
        if result.is_err() {
            // A broken stream is not replayed every tick
            self.close_animation();
            self.unavailable = Some(path.to_owned());
            self.clear_icon();
        }
        result
    }

    pub fn try_present(&mut self) -> Result<(), DisplayError> {
        self.backend.present(&self.frame)?;
        self.presented += 1;
        Ok(())
    }
}

impl<B: DisplayBackend, A: AssetStore> WeatherView for RenderPipeline<B, A> {
    fn compose_title(&mut self, day: &str, time: &str) {
        if let Err(e) = self.try_compose_title(day, time) {
            warn!("title skipped: {}", e);
        }
    }

    fn compose_data(&mut self, record: &WeatherRecord) {
        if let Err(e) = self.try_compose_data(record) {
            warn!("data panel skipped: {}", e);
        }
    }

    fn compose_icon(&mut self, path: &str) {
        if let Err(e) = self.try_compose_icon(path) {
            warn!("icon {} unavailable: {}", path, e);
        }
    }

    fn present(&mut self) {
        match self.try_present() {
            Ok(()) => debug!("frame {} presented", self.presented),
            Err(e) => warn!("present failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tests::gif_of;
    use embedded_graphics::geometry::{Point, Size};
    use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
    use tenki_core::traits::MemoryAssetStore;

    /// Backend keeping the last presented frame
    #[derive(Default)]
    struct MemoryPanel {
        frames: Vec<FrameBuffer>,
        fail: bool,
    }

    impl DisplayBackend for MemoryPanel {
        fn dimensions(&self) -> Size {
            Size::new(256, 240)
        }

        fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Communication);
            }
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    fn assets() -> MemoryAssetStore {
        MemoryAssetStore::new()
            .with("/100.gif", gif_of(8, 8, &[1, 2], None))
            .with("/200.gif", gif_of(8, 8, &[3], None))
            .with("/broken.gif", b"GIF89a".to_vec())
    }

    fn pipeline() -> RenderPipeline<MemoryPanel, MemoryAssetStore> {
        RenderPipeline::new(MemoryPanel::default(), assets(), Layout::default(), "Osaka Weather Station")
            .unwrap()
    }

    fn icon_pixel(pipeline: &RenderPipeline<MemoryPanel, MemoryAssetStore>) -> Option<Rgb565> {
        let origin = pipeline.layout().icon.origin;
        pipeline.frame().pixel(origin + Point::new(1, 1))
    }

    #[test]
    fn test_rejects_mismatched_panel() {
        let mut layout = Layout::default();
        layout.screen = Size::new(320, 240);
        assert!(matches!(
            RenderPipeline::new(MemoryPanel::default(), assets(), layout, "x"),
            Err(DisplayError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_icon_animates_and_switches() {
        let mut pipeline = pipeline();
        pipeline.compose_icon("/100.gif");
        assert_eq!(icon_pixel(&pipeline), Some(Rgb565::RED));
        pipeline.compose_icon("/100.gif");
        assert_eq!(icon_pixel(&pipeline), Some(Rgb565::GREEN));
        pipeline.compose_icon("/100.gif");
        assert_eq!(icon_pixel(&pipeline), Some(Rgb565::RED));

        pipeline.compose_icon("/200.gif");
        assert_eq!(pipeline.animation(), Some("/200.gif"));
        assert_eq!(icon_pixel(&pipeline), Some(Rgb565::BLUE));

        pipeline.compose_icon("");
        assert_eq!(pipeline.animation(), None);
        assert_eq!(icon_pixel(&pipeline), Some(pipeline.layout().icon.background));
    }

    #[test]
    fn test_missing_icon_degrades() {
        let mut pipeline = pipeline();
        pipeline.compose_icon("/100.gif");
        assert!(matches!(
            pipeline.try_compose_icon("/777.gif"),
            Err(ComposeError::Animation(AnimationError::Asset(_)))
        ));
        assert_eq!(pipeline.animation(), None);
        assert_eq!(icon_pixel(&pipeline), Some(pipeline.layout().icon.background));
        // Not retried on the next tick
        assert!(pipeline.try_compose_icon("/777.gif").is_ok());

        pipeline.compose_data(&WeatherRecord::default());
        pipeline.present();
        assert_eq!(pipeline.presented(), 1);
    }

    #[test]
    fn test_corrupt_icon_degrades() {
        let mut pipeline = pipeline();
        assert!(pipeline.try_compose_icon("/broken.gif").is_err());
        assert_eq!(pipeline.animation(), None);
    }

    #[test]
    fn test_layers_land_in_their_regions() {
        let mut pipeline = pipeline();
        let record = WeatherRecord {
            forecast_en: "CLEAR".into(),
            temperature: 25.4,
            ..WeatherRecord::default()
        };
        pipeline.compose_title("Sun. 06 05 2022", "11:05:09");
        pipeline.compose_data(&record);
        pipeline.present();

        let layout = *pipeline.layout();
        let title = layout.title;
        let corner = title.origin + Point::new(title.size.width as i32 - 1, title.size.height as i32 - 1);
        assert_eq!(pipeline.frame().pixel(corner), Some(title.background));
        // Outside every region the screen background shows
        assert_eq!(pipeline.frame().pixel(Point::new(0, 0)), Some(layout.background));
        let band = layout.data.origin + Point::new(layout.data.size.width as i32 - 1, 3 * layout.line_height);
        assert_eq!(pipeline.frame().pixel(band), Some(layout.rows.temperature));

        let shown = &pipeline.backend().frames[0];
        assert_eq!(shown, pipeline.frame());
    }

    #[test]
    fn test_present_failure_is_reported() {
        let mut pipeline = pipeline();
        pipeline.backend.fail = true;
        assert_eq!(pipeline.try_present(), Err(DisplayError::Communication));
        pipeline.present();
        assert_eq!(pipeline.presented(), 0);
    }
}
