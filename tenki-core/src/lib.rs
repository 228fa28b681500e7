//! Board-agnostic core logic for the Tenki weather display nodes
//!
//! This crate contains all application logic that does not depend on a
//! concrete network stack, display or filesystem:
//!
//! - Bounded, filtered JSON documents and field extraction
//! - Weather code lookup table
//! - Republished document synthesis
//! - State machine and message dispatcher for refresh cycles
//! - Collector and presenter node roles
//! - Configuration type definitions and TOML loading
//! - Port traits (transport, assets, view, endpoint)

#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod lookup;
pub mod node;
pub mod record;
pub mod state;
pub mod synth;
pub mod traits;

pub use document::{BoundedDocument, BoundedDocumentStore, FilterSpec, ParseError};
pub use record::WeatherRecord;
