//! Republished document synthesis

use log::error;

use crate::record::WeatherRecord;

/// Serialize a record as the republished JSON document
///
/// Every key is present whether or not the record populated it, and all
/// text is JSON-escaped.
pub fn synthesize(record: &WeatherRecord) -> String {
    serde_json::to_string(&record.to_document()).unwrap_or_else(|e| {
        error!("document synthesis failed: {}", e);
        String::new()
    })
}
