//! Tenki node-to-node protocol
//!
//! This crate defines what the collector publishes and what the presenter
//! expects to read back. Both nodes link it so that the republished document
//! cannot drift between them.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌───────────┐  GET /api/v1/weather.json   ┌───────────┐
//! │ presenter │ ──────────────────────────▶ │ collector │
//! │           │ ◀────────────────────────── │           │
//! └───────────┘  200 application/json       └───────────┘
//!                {"publishingOffice":..., "degree":25.4, ...}
//! ```
//!
//! The main loop of each node is driven by [`Message`] values posted from
//! timer context.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod document;
pub mod messages;

pub use document::{Response, WeatherDocument, CONTENT_TYPE_JSON, ENDPOINT_PATH, STATUS_OK};
pub use messages::Message;
