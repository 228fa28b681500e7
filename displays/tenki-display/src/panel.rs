//! Text content of the title strip and data panel

use core::fmt::Write;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::{Primitive, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use heapless::String;
use profont::{PROFONT_12_POINT, PROFONT_24_POINT};
use tenki_core::WeatherRecord;

use crate::layout::Layout;

/// Font of every small text row
pub const TEXT_FONT: &MonoFont = &PROFONT_12_POINT;

/// Font of the headline forecast
pub const HEADLINE_FONT: &MonoFont = &PROFONT_24_POINT;

/// Maximum bytes per line
pub const LINE_LEN: usize = 48;

type Line = String<LINE_LEN>;

/// Copy as much of `text` as fits, never splitting a character
fn fit(prefix: &str, text: &str) -> Line {
    let mut line = Line::new();
    for c in prefix.chars().chain(text.chars()) {
        if line.push(c).is_err() {
            break;
        }
    }
    line
}

fn style(font: &'static MonoFont<'static>, text: Rgb565, background: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyleBuilder::new()
        .font(font)
        .text_color(text)
        .background_color(background)
        .build()
}

fn band<D>(target: &mut D, y: i32, size: Size, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(Point::new(0, y), size)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)
}

/// Station name and clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePanel {
    station: Line,
    clock: Line,
}

impl TitlePanel {
    pub fn new(station: &str, day: &str, time: &str) -> Self {
        let mut clock = fit(day, "");
        let _ = write!(clock, " {time}");
        Self {
            station: fit(" ", station),
            clock,
        }
    }

    pub fn lines(&self) -> [&str; 2] {
        [&self.station, &self.clock]
    }

    /// Draw onto a surface the size of the title region
    pub fn draw<D>(&self, target: &mut D, layout: &Layout) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let style = style(TEXT_FONT, layout.text, layout.title.background);
        Text::with_baseline(&self.station, Point::zero(), style, Baseline::Top).draw(target)?;
        Text::with_baseline(
            &self.clock,
            Point::new(16, layout.line_height),
            style,
            Baseline::Top,
        )
        .draw(target)?;
        Ok(())
    }
}

/// Forecast text and formatted sensor readings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPanel {
    forecast_jp: Line,
    forecast_en: Line,
    degree: Line,
    humidity: Line,
    pressure: Line,
}

impl DataPanel {
    pub fn from_record(record: &WeatherRecord) -> Self {
        let mut degree = Line::new();
        let mut humidity = Line::new();
        let mut pressure = Line::new();
        let _ = write!(degree, "   Degree:{:2.1}*C", record.temperature);
        let _ = write!(humidity, " Humidity:{:2.0}%", record.humidity);
        let _ = write!(pressure, " Pressure:{:4.1}hPa", record.pressure);

        Self {
            forecast_jp: fit(" ", &record.forecast_jp),
            forecast_en: fit("  ", &record.forecast_en),
            degree,
            humidity,
            pressure,
        }
    }

    pub fn lines(&self) -> [&str; 5] {
        [
            &self.forecast_jp,
            &self.forecast_en,
            &self.degree,
            &self.humidity,
            &self.pressure,
        ]
    }

    /// Draw onto a surface the size of the data region
    ///
    /// The headline takes two rows, each reading sits on its own band.
    pub fn draw<D>(&self, target: &mut D, layout: &Layout) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let pitch = layout.line_height;
        let row = Size::new(layout.data.size.width, pitch as u32);
        let plain = style(TEXT_FONT, layout.text, layout.data.background);

        Text::with_baseline(
            &self.forecast_jp,
            Point::zero(),
            style(HEADLINE_FONT, layout.text, layout.data.background),
            Baseline::Top,
        )
        .draw(target)?;
        Text::with_baseline(&self.forecast_en, Point::new(0, 2 * pitch), plain, Baseline::Top)
            .draw(target)?;

        let readings = [
            (&self.degree, layout.rows.temperature),
            (&self.humidity, layout.rows.humidity),
            (&self.pressure, layout.rows.pressure),
        ];
        for (n, (text, background)) in readings.into_iter().enumerate() {
            let y = (3 + n as i32) * pitch;
            band(target, y, row, background)?;
            Text::with_baseline(
                text,
                Point::new(0, y),
                style(TEXT_FONT, layout.text, background),
                Baseline::Top,
            )
            .draw(target)?;
        }
        Ok(())
    }
}
