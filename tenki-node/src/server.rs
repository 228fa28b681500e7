//! Non-blocking HTTP endpoint for the collector

use log::{debug, info, warn};
use tenki_core::traits::EndpointServer;
use tenki_protocol::Response;
use tiny_http::{Header, Server, StatusCode};

/// `EndpointServer` over tiny_http, polled from the main loop
pub struct HttpEndpoint {
    server: Server,
}

impl HttpEndpoint {
    /// Listen on every interface at `port`
    pub fn bind(port: u16) -> Result<Self, String> {
        let server = Server::http(("0.0.0.0", port)).map_err(|e| e.to_string())?;
        info!("serving on port {}", port);
        Ok(Self { server })
    }

    /// Port actually bound, useful when binding port 0
    pub fn port(&self) -> Option<u16> {
        self.server.server_addr().to_ip().map(|addr| addr.port())
    }
}

fn to_http(response: Response) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let http = tiny_http::Response::from_string(response.body).with_status_code(StatusCode(response.status));
    match Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes()) {
        Ok(header) => http.with_header(header),
        Err(()) => http,
    }
}

impl EndpointServer for HttpEndpoint {
    fn poll(&mut self, respond: &mut dyn FnMut(&str) -> Option<Response>) {
        loop {
            let request = match self.server.try_recv() {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    break;
                }
            };

            let path = request.url().split('?').next().unwrap_or_default().to_owned();
            debug!("{} {}", request.method(), path);
            let result = match respond(&path) {
                Some(response) => request.respond(to_http(response)),
                None => request.respond(tiny_http::Response::empty(StatusCode(404))),
            };
            if let Err(e) = result {
                debug!("client went away: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread;
    use std::time::{Duration, Instant};
    use tenki_protocol::ENDPOINT_PATH;

    fn request(port: u16, path: &str) -> thread::JoinHandle<String> {
        let path = path.to_owned();
        thread::spawn(move || {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
            write!(stream, "GET {path} HTTP/1.0\r\nHost: localhost\r\n\r\n").unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).unwrap();
            reply
        })
    }

    fn serve_until_done(endpoint: &mut HttpEndpoint, client: &thread::JoinHandle<String>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !client.is_finished() && Instant::now() < deadline {
            endpoint.poll(&mut |path| {
                (path == ENDPOINT_PATH).then(|| Response::json(r#"{"degree":25.4}"#.into()))
            });
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_serves_document_and_404() {
        let mut endpoint = HttpEndpoint::bind(0).unwrap();
        let port = endpoint.port().unwrap();

        let client = request(port, "/api/v1/weather.json?t=1");
        serve_until_done(&mut endpoint, &client);
        let reply = client.join().unwrap();
        assert!(reply.starts_with("HTTP/1.0 200") || reply.starts_with("HTTP/1.1 200"));
        assert!(reply.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(reply.ends_with(r#"{"degree":25.4}"#));

        let client = request(port, "/favicon.ico");
        serve_until_done(&mut endpoint, &client);
        let reply = client.join().unwrap();
        assert!(reply.contains(" 404 "));
    }
}
