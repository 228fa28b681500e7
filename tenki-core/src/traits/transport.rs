//! Outbound HTTP

use std::io::Read;

/// Errors fetching an upstream document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Connection, TLS or read failure
    #[error("transport failure: {0}")]
    Transport(String),
    /// The server answered with a non-200 status
    #[error("unexpected HTTP status {status}")]
    Protocol { status: u16 },
}

/// Blocking HTTP GET returning the response body as a stream
pub trait HttpTransport {
    type Body: Read;

    /// Fetch `url`; only a 200 response yields a body
    fn get(&mut self, url: &str) -> Result<Self::Body, FetchError>;
}
