//! Mirror network streams to a diagnostic sink while they are parsed

use std::io::{self, Read, Write};

use log::{log_enabled, trace, warn, Level};

/// Receives every chunk read through a [`TeeReader`]
pub trait DiagnosticSink {
    fn mirror(&mut self, chunk: &[u8]);
}

/// Mirrors chunks to the log at trace level
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    target: &'static str,
}

impl LogSink {
    pub const fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl DiagnosticSink for LogSink {
    fn mirror(&mut self, chunk: &[u8]) {
        if log_enabled!(target: self.target, Level::Trace) {
            trace!(target: self.target, "{}", String::from_utf8_lossy(chunk));
        }
    }
}

/// Mirrors chunks to any writer, e.g. a serial console
///
/// The first write failure is logged and the sink goes quiet; diagnostics
/// never interrupt the stream being parsed.
#[derive(Debug)]
pub struct WriteSink<W> {
    writer: W,
    failed: bool,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for WriteSink<W> {
    fn mirror(&mut self, chunk: &[u8]) {
        if self.failed {
            return;
        }
        if let Err(e) = self.writer.write_all(chunk) {
            warn!("diagnostic mirror disabled: {}", e);
            self.failed = true;
        }
    }
}

/// Reader that passes each chunk to a sink as it is read
pub struct TeeReader<R, S> {
    inner: R,
    sink: S,
    mirrored: u64,
}

impl<R: Read, S: DiagnosticSink> TeeReader<R, S> {
    pub fn new(inner: R, sink: S) -> Self {
        Self {
            inner,
            sink,
            mirrored: 0,
        }
    }

    /// Total bytes mirrored so far
    pub fn mirrored(&self) -> u64 {
        self.mirrored
    }

    pub fn into_parts(self) -> (R, S) {
        (self.inner, self.sink)
    }
}

impl<R: Read, S: DiagnosticSink> Read for TeeReader<R, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.sink.mirror(&buf[..n]);
            self.mirrored += n as u64;
        }
        Ok(n)
    }
}
