//! Application handler contract.
//!
//! Handlers are synchronous: they receive a byte sink and the parsed request,
//! write the response body into the sink, and may return a
//! [`HandlerError`] to replace the normal response. The connection runs them
//! on tokio's blocking pool.

use std::io;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::http::request::Request;
use crate::http::response::HandlerError;

pub trait Handler: Send + Sync + 'static {
    /// Writes the response body for `req` into `out`.
    fn handle(&self, out: &mut dyn io::Write, req: &Request) -> Result<(), HandlerError>;

    /// Whether the body for `req` should be streamed with chunked encoding.
    fn streams_body(&self, _req: &Request) -> bool {
        false
    }

    /// Content type for a body sent as-is. `None` wraps the body in the
    /// default HTML page.
    fn raw_content_type(&self, _req: &Request) -> Option<&str> {
        None
    }
}

impl<F> Handler for F
where
    F: Fn(&mut dyn io::Write, &Request) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn handle(&self, out: &mut dyn io::Write, req: &Request) -> Result<(), HandlerError> {
        self(out, req)
    }
}

/// Sink that forwards each write to the connection over a bounded queue.
///
/// Blocks the handler thread while the queue is full. Dropping the sink
/// closes the queue, which tells the draining side the body is complete.
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }

    /// Creates a sink and the receiving end of its queue.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl io::Write for ChannelSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.tx
            .blocking_send(Bytes::copy_from_slice(buf))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response stream closed"))?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
