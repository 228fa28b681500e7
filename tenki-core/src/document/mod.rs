//! Bounded, filtered JSON documents
//!
//! Upstream documents are parsed through a [`FilterSpec`] into a
//! [`BoundedDocument`] whose retained content never exceeds the capacity of
//! the [`BoundedDocumentStore`] that produced it.

mod filter;
mod path;
mod store;
mod tee;

pub use filter::{FilterError, FilterSpec};
pub use path::{extract, FieldValue, MissingField, Segment, Segments};
pub use store::{BoundedDocument, BoundedDocumentStore, ParseError, CHUNK_SIZE};
pub use tee::{DiagnosticSink, LogSink, TeeReader, WriteSink};
