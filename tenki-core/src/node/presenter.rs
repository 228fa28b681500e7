//! Presenter role: fetch the republished document and render it

use log::debug;

use super::{CycleError, NodeRole};
use crate::clock::ClockReading;
use crate::document::{BoundedDocumentStore, FilterSpec, LogSink, TeeReader};
use crate::record::{republished_filter, WeatherRecord};
use crate::state::Output;
use crate::traits::{HttpTransport, WeatherView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenterSettings {
    /// Full URL of the collector's endpoint
    pub document_url: String,
    pub document_capacity: usize,
}

/// Renders the collector's document through a [`WeatherView`]
pub struct Presenter<T, V> {
    transport: T,
    view: V,
    settings: PresenterSettings,
    filter: FilterSpec,
    icon: String,
}

impl<T: HttpTransport, V: WeatherView> Presenter<T, V> {
    pub fn new(transport: T, view: V, settings: PresenterSettings) -> Self {
        Self {
            transport,
            view,
            settings,
            filter: republished_filter(),
            icon: String::new(),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Icon animation currently shown
    pub fn icon(&self) -> &str {
        &self.icon
    }
}

impl<T: HttpTransport, V: WeatherView> NodeRole for Presenter<T, V> {
    type Fetched = T::Body;
    const OUTPUT: Output = Output::Render;

    fn name(&self) -> &'static str {
        "presenter"
    }

    fn fetch(&mut self) -> Result<T::Body, CycleError> {
        Ok(self.transport.get(&self.settings.document_url)?)
    }

    fn parse(&mut self, body: T::Body) -> Result<WeatherRecord, CycleError> {
        let store = BoundedDocumentStore::new(self.settings.document_capacity);
        let doc = store.parse(TeeReader::new(body, LogSink::new("tenki::document")), &self.filter)?;
        Ok(WeatherRecord::from_republished(&doc)?)
    }

    fn output(&mut self, record: &WeatherRecord) {
        self.view.compose_data(record);
        if self.icon != record.icon_file {
            debug!("icon {:?} -> {:?}", self.icon, record.icon_file);
            self.icon.clone_from(&record.icon_file);
        }
        self.view.compose_icon(&self.icon);
        self.view.present();
    }

    /// The icon advances one frame per tick alongside the clock
    fn on_clock_tick(&mut self, reading: &ClockReading) {
        self.view.compose_title(&reading.day, &reading.time);
        self.view.compose_icon(&self.icon);
        self.view.present();
    }
}
