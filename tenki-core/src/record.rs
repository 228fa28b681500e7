//! Normalized weather record shared by both node roles

use log::debug;
use tenki_protocol::WeatherDocument;

use crate::document::{BoundedDocument, FieldValue, FilterError, FilterSpec, MissingField};
use crate::lookup::CodeLookupEntry;

/// Filter for the forecast provider's document
///
/// The provider returns a list of reports; only the first is read.
pub const FORECAST_FILTER: &str = r#"[{"publishingOffice":true,"reportDatetime":true,"timeSeries":[{"timeDefines":true,"areas":[{"area":true,"weatherCodes":true,"weathers":true,"winds":true,"waves":true}]}]}]"#;

/// Filter for the sensor channel's latest-entry document
pub const FEED_FILTER: &str = r#"{"created_at":true,"field1":true,"field2":true,"field3":true}"#;

/// Schema paths into the provider documents
pub mod paths {
    pub const PUBLISHING_OFFICE: &str = "[0].publishingOffice";
    pub const REPORT_DATETIME: &str = "[0].reportDatetime";
    pub const TIME_DEFINE: &str = "[0].timeSeries[0].timeDefines[0]";
    pub const AREA_NAME: &str = "[0].timeSeries[0].areas[0].area.name";
    pub const AREA_CODE: &str = "[0].timeSeries[0].areas[0].area.code";
    pub const TODAY_CODE: &str = "[0].timeSeries[0].areas[0].weatherCodes[0]";
    pub const TOMORROW_CODE: &str = "[0].timeSeries[0].areas[0].weatherCodes[1]";
    pub const WEATHER: &str = "[0].timeSeries[0].areas[0].weathers[0]";
    pub const WIND: &str = "[0].timeSeries[0].areas[0].winds[0]";
    pub const WAVE: &str = "[0].timeSeries[0].areas[0].waves[0]";

    pub const FEED_CREATED_AT: &str = "created_at";
    pub const FEED_TEMPERATURE: &str = "field1";
    pub const FEED_HUMIDITY: &str = "field2";
    pub const FEED_PRESSURE: &str = "field3";
}

/// Filter for the collector's republished document
pub fn republished_filter() -> FilterSpec {
    FilterSpec::keep_keys(WeatherDocument::KEYS)
}

/// Filter for the forecast provider's document
pub fn forecast_filter() -> Result<FilterSpec, FilterError> {
    FilterSpec::from_json(FORECAST_FILTER)
}

/// Filter for the sensor channel document
pub fn feed_filter() -> Result<FilterSpec, FilterError> {
    FilterSpec::from_json(FEED_FILTER)
}

/// One cycle's worth of normalized weather data
///
/// Every field defaults to empty text or zero, so a partially populated
/// record always renders and serializes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherRecord {
    pub publishing_office: String,
    pub report_datetime: String,
    pub time_define: String,
    pub area_name: String,
    pub area_code: String,
    pub today_code: String,
    pub tomorrow_code: String,
    pub weather: String,
    pub forecast_jp: String,
    pub forecast_en: String,
    pub wind: String,
    pub wave: String,
    /// °C
    pub temperature: f32,
    /// %
    pub humidity: f32,
    /// hPa
    pub pressure: f32,
    pub created_at: String,
    pub icon_file: String,
}

fn optional_text(doc: &BoundedDocument, path: &str) -> String {
    match doc.extract(path) {
        Ok(value) => value.as_text(),
        Err(missing) => {
            debug!("{}", missing);
            String::new()
        }
    }
}

fn optional_number(doc: &BoundedDocument, path: &str) -> f32 {
    doc.extract(path).map(|v| v.as_f32()).unwrap_or_else(|missing| {
        debug!("{}", missing);
        0.0
    })
}

impl WeatherRecord {
    /// Build a record from the two provider documents
    ///
    /// Today's weather code is mandatory; every other field falls back to
    /// its default when absent. Localized text and the icon come from the
    /// code table and are applied separately.
    pub fn from_provider(forecast: &BoundedDocument, feed: &BoundedDocument) -> Result<Self, MissingField> {
        let today_code = forecast.extract(paths::TODAY_CODE)?.as_text();

        Ok(Self {
            publishing_office: optional_text(forecast, paths::PUBLISHING_OFFICE),
            report_datetime: optional_text(forecast, paths::REPORT_DATETIME),
            time_define: optional_text(forecast, paths::TIME_DEFINE),
            area_name: optional_text(forecast, paths::AREA_NAME),
            area_code: optional_text(forecast, paths::AREA_CODE),
            today_code,
            tomorrow_code: optional_text(forecast, paths::TOMORROW_CODE),
            weather: optional_text(forecast, paths::WEATHER),
            wind: optional_text(forecast, paths::WIND),
            wave: optional_text(forecast, paths::WAVE),
            temperature: optional_number(feed, paths::FEED_TEMPERATURE),
            humidity: optional_number(feed, paths::FEED_HUMIDITY),
            pressure: optional_number(feed, paths::FEED_PRESSURE),
            created_at: optional_text(feed, paths::FEED_CREATED_AT),
            ..Self::default()
        })
    }

    /// Apply a code table entry, or clear the derived fields on a miss
    pub fn apply_lookup(&mut self, entry: Option<&CodeLookupEntry>) {
        match entry {
            Some(entry) => {
                self.forecast_jp.clone_from(&entry.text_jp);
                self.forecast_en.clone_from(&entry.text_en);
                self.icon_file.clone_from(&entry.icon_file);
            }
            None => {
                self.forecast_jp.clear();
                self.forecast_en.clear();
                self.icon_file.clear();
            }
        }
    }

    /// Build a record from a parsed republished document
    ///
    /// The `weatherCodes` key must be present; a document without it is
    /// not a republished weather document.
    pub fn from_republished(doc: &BoundedDocument) -> Result<Self, MissingField> {
        let text = |key: &str| optional_text(doc, key);
        let number = |key: &str| optional_number(doc, key);
        let today_code = doc.extract("weatherCodes").map(|v: FieldValue<'_>| v.as_text())?;

        Ok(Self {
            publishing_office: text("publishingOffice"),
            report_datetime: text("reportDatetime"),
            time_define: text("timeDefine"),
            area_name: text("areaName"),
            area_code: text("areaCode"),
            today_code,
            tomorrow_code: text("nextWeatherCodes"),
            weather: text("weathers"),
            forecast_jp: text("forecastJP"),
            forecast_en: text("forecastEN"),
            wind: text("winds"),
            wave: text("waves"),
            temperature: number("degree"),
            humidity: number("humidity"),
            pressure: number("pressure"),
            created_at: text("createdAt"),
            icon_file: text("icon"),
        })
    }

    /// Wire form of the record
    ///
    /// Non-finite readings are published as zero.
    pub fn to_document(&self) -> WeatherDocument {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        WeatherDocument {
            publishing_office: self.publishing_office.clone(),
            report_datetime: self.report_datetime.clone(),
            time_define: self.time_define.clone(),
            area_name: self.area_name.clone(),
            area_code: self.area_code.clone(),
            weather_codes: self.today_code.clone(),
            next_weather_codes: self.tomorrow_code.clone(),
            weathers: self.weather.clone(),
            forecast_jp: self.forecast_jp.clone(),
            forecast_en: self.forecast_en.clone(),
            winds: self.wind.clone(),
            waves: self.wave.clone(),
            degree: finite(self.temperature),
            humidity: finite(self.humidity),
            pressure: finite(self.pressure),
            created_at: self.created_at.clone(),
            icon: self.icon_file.clone(),
        }
    }
}
