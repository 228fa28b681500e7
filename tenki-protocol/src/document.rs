//! The republished weather document
//!
//! The collector serializes a [`WeatherDocument`] on every refresh cycle and
//! serves it on [`ENDPOINT_PATH`]. Every key is always present; fields the
//! upstream providers did not supply are empty strings or zero.

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// HTTP path the collector serves the document on
pub const ENDPOINT_PATH: &str = "/api/v1/weather.json";

/// Content type of the document
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// The only status the endpoint itself produces
pub const STATUS_OK: u16 = 200;

/// Normalized weather document exchanged between the nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherDocument {
    /// Forecast publishing office
    pub publishing_office: String,
    /// Forecast report timestamp (ISO 8601)
    pub report_datetime: String,
    /// First time definition of the forecast series
    pub time_define: String,
    /// Forecast area name
    pub area_name: String,
    /// Forecast area code
    pub area_code: String,
    /// Today's weather code
    pub weather_codes: String,
    /// Tomorrow's weather code
    pub next_weather_codes: String,
    /// Provider weather text for today
    pub weathers: String,
    /// Localized forecast (Japanese)
    #[serde(rename = "forecastJP")]
    pub forecast_jp: String,
    /// Localized forecast (English)
    #[serde(rename = "forecastEN")]
    pub forecast_en: String,
    /// Wind descriptor (may be empty)
    pub winds: String,
    /// Wave descriptor (may be empty)
    pub waves: String,
    /// Temperature in °C
    pub degree: f32,
    /// Relative humidity in %
    pub humidity: f32,
    /// Atmospheric pressure in hPa
    pub pressure: f32,
    /// Sensor channel creation timestamp
    pub created_at: String,
    /// Icon asset path, e.g. `/100.gif`
    pub icon: String,
}

impl WeatherDocument {
    /// Every key of the serialized document, in serialization order
    pub const KEYS: [&'static str; 17] = [
        "publishingOffice",
        "reportDatetime",
        "timeDefine",
        "areaName",
        "areaCode",
        "weatherCodes",
        "nextWeatherCodes",
        "weathers",
        "forecastJP",
        "forecastEN",
        "winds",
        "waves",
        "degree",
        "humidity",
        "pressure",
        "createdAt",
        "icon",
    ];
}

/// A response produced by the collector endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Content type header value
    pub content_type: &'static str,
    /// Body bytes (UTF-8 JSON)
    pub body: String,
}

impl Response {
    /// A 200 JSON response carrying `body`
    pub fn json(body: String) -> Self {
        Self {
            status: STATUS_OK,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }
}
