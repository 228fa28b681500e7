//! Outbound rendering for the presenter

use crate::record::WeatherRecord;

/// A display able to show the presenter's three layers
pub trait WeatherView {
    /// Station name and `"<day> <time>"` strip
    fn compose_title(&mut self, day: &str, time: &str);

    /// Forecast text and sensor readings
    fn compose_data(&mut self, record: &WeatherRecord);

    /// Advance the icon animation at `path` by one frame
    ///
    /// An empty path clears the icon region.
    fn compose_icon(&mut self, path: &str);

    /// Push the composed frame to the panel
    fn present(&mut self);
}
