//! Blocking HTTP client adapter

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use tenki_core::traits::{FetchError, HttpTransport};

/// `HttpTransport` over a blocking reqwest client
///
/// A failed connect is retried once; every other failure is final.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build a client bounding connect, handshake and read by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!("tenki-node/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn send(&self, url: &str) -> Result<Response, reqwest::Error> {
        match self.client.get(url).send() {
            Err(e) if e.is_connect() => {
                warn!("connect to {} failed ({}), retrying once", host(url), e);
                self.client.get(url).send()
            }
            other => other,
        }
    }
}

/// Scheme and host of `url`, keeping query strings (and read keys) out of logs
fn host(url: &str) -> &str {
    let start = url.find("://").map_or(0, |i| i + 3);
    let end = url[start..].find('/').map_or(url.len(), |i| start + i);
    &url[..end]
}

impl HttpTransport for HttpClient {
    type Body = Response;

    fn get(&mut self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .send(url)
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Protocol {
                status: status.as_u16(),
            });
        }
        debug!(
            "GET {}: {} ({:?} bytes)",
            host(url),
            status,
            response.content_length()
        );
        Ok(response)
    }
}
