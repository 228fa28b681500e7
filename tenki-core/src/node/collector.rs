//! Collector role: normalize upstream documents and republish them

use std::io::Read;

use log::{debug, info};
use tenki_protocol::{Response, ENDPOINT_PATH};

use super::{CycleError, NodeRole};
use crate::clock::ClockReading;
use crate::document::{
    BoundedDocument, BoundedDocumentStore, FilterError, FilterSpec, LogSink, ParseError, TeeReader,
};
use crate::lookup::CodeLookupTable;
use crate::record::{self, WeatherRecord};
use crate::state::Output;
use crate::synth::synthesize;
use crate::traits::{AssetStore, EndpointServer, HttpTransport};

/// Upstream locations and capacities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorSettings {
    pub forecast_url: String,
    pub feed_url: String,
    pub forecast_capacity: usize,
    pub feed_capacity: usize,
}

/// Both upstream bodies, opened before either is parsed
pub struct CollectorFetch<B> {
    pub feed: B,
    pub forecast: B,
}

/// Fetches the sensor feed and forecast, republishes the merged record
pub struct Collector<T, A, S> {
    transport: T,
    lookup: CodeLookupTable<A>,
    server: S,
    settings: CollectorSettings,
    forecast_filter: FilterSpec,
    feed_filter: FilterSpec,
    published: String,
    clock: Option<ClockReading>,
    served: u64,
}

impl<T, A, S> Collector<T, A, S>
where
    T: HttpTransport,
    A: AssetStore,
    S: EndpointServer,
{
    pub fn new(
        transport: T,
        lookup: CodeLookupTable<A>,
        server: S,
        settings: CollectorSettings,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            transport,
            lookup,
            server,
            settings,
            forecast_filter: record::forecast_filter()?,
            feed_filter: record::feed_filter()?,
            // Served until the first cycle completes
            published: synthesize(&WeatherRecord::default()),
            clock: None,
            served: 0,
        })
    }

    /// The document currently served
    pub fn published(&self) -> &str {
        &self.published
    }

    /// Requests answered so far
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Last clock reading seen
    pub fn clock(&self) -> Option<&ClockReading> {
        self.clock.as_ref()
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    /// Answer a request for `path`
    pub fn respond(published: &str, path: &str) -> Option<Response> {
        (path == ENDPOINT_PATH).then(|| Response::json(published.to_owned()))
    }

    fn parse_stream(
        body: impl Read,
        filter: &FilterSpec,
        capacity: usize,
        target: &'static str,
    ) -> Result<BoundedDocument, ParseError> {
        let store = BoundedDocumentStore::new(capacity);
        store.parse(TeeReader::new(body, LogSink::new(target)), filter)
    }
}

impl<T, A, S> NodeRole for Collector<T, A, S>
where
    T: HttpTransport,
    A: AssetStore,
    S: EndpointServer,
{
    type Fetched = CollectorFetch<T::Body>;
    const OUTPUT: Output = Output::Synthesize;

    fn name(&self) -> &'static str {
        "collector"
    }

    fn fetch(&mut self) -> Result<Self::Fetched, CycleError> {
        let feed = self.transport.get(&self.settings.feed_url)?;
        let forecast = self.transport.get(&self.settings.forecast_url)?;
        Ok(CollectorFetch { feed, forecast })
    }

    fn parse(&mut self, fetched: Self::Fetched) -> Result<WeatherRecord, CycleError> {
        let feed = Self::parse_stream(
            fetched.feed,
            &self.feed_filter,
            self.settings.feed_capacity,
            "tenki::feed",
        )?;
        let forecast = Self::parse_stream(
            fetched.forecast,
            &self.forecast_filter,
            self.settings.forecast_capacity,
            "tenki::forecast",
        )?;

        let mut record = WeatherRecord::from_provider(&forecast, &feed)?;
        let entry = self.lookup.lookup(&record.today_code);
        record.apply_lookup(entry.as_ref());
        Ok(record)
    }

    fn output(&mut self, record: &WeatherRecord) {
        self.published = synthesize(record);
        info!("republished {} bytes", self.published.len());
        debug!("{}", self.published);
    }

    fn on_clock_tick(&mut self, reading: &ClockReading) {
        self.clock = Some(reading.clone());
    }

    fn service(&mut self) {
        let published = &self.published;
        let served = &mut self.served;
        self.server.poll(&mut |path| {
            let response = Self::respond(published, path);
            if response.is_some() {
                *served += 1;
            }
            response
        });
    }
}
