//! Node roles
//!
//! The collector normalizes upstream documents and republishes them; the
//! presenter fetches the republished document and renders it. Both run the
//! same refresh cycle through a [`Dispatcher`](crate::dispatch::Dispatcher).

mod collector;
mod presenter;

pub use collector::{Collector, CollectorFetch, CollectorSettings};
pub use presenter::{Presenter, PresenterSettings};

use crate::clock::ClockReading;
use crate::document::{MissingField, ParseError};
use crate::record::WeatherRecord;
use crate::state::{ErrorKind, Output};
use crate::traits::FetchError;

/// Why a refresh cycle was abandoned
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    MissingField(#[from] MissingField),
}

impl CycleError {
    /// State machine classification of the failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            CycleError::Fetch(FetchError::Transport(_)) => ErrorKind::Transport,
            CycleError::Fetch(FetchError::Protocol { .. }) => ErrorKind::Protocol,
            CycleError::Parse(ParseError::Malformed(_)) => ErrorKind::Malformed,
            CycleError::Parse(ParseError::CapacityExceeded { .. }) => ErrorKind::CapacityExceeded,
            CycleError::MissingField(_) => ErrorKind::MissingField,
        }
    }
}

/// The role-specific stages of a refresh cycle
pub trait NodeRole {
    /// Open upstream response bodies
    type Fetched;

    /// Output stage run after a successful parse
    const OUTPUT: Output;

    /// Role name for logs
    fn name(&self) -> &'static str;

    fn fetch(&mut self) -> Result<Self::Fetched, CycleError>;

    fn parse(&mut self, fetched: Self::Fetched) -> Result<WeatherRecord, CycleError>;

    fn output(&mut self, record: &WeatherRecord);

    fn on_clock_tick(&mut self, reading: &ClockReading);

    /// Work done on every loop iteration, e.g. answering HTTP requests
    fn service(&mut self) {}
}
