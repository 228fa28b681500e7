//! Inbound HTTP for the collector's republished document

use tenki_protocol::Response;

/// Non-blocking HTTP server serviced from the main loop
pub trait EndpointServer {
    /// Answer every request currently pending
    ///
    /// `respond` maps a request path to a response; `None` means the path
    /// is not served and the adapter answers 404.
    fn poll(&mut self, respond: &mut dyn FnMut(&str) -> Option<Response>);
}
