use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::http::chunked::ChunkedBodyWriter;
use crate::http::parser::read_request;
use crate::http::request::Request;
use crate::http::response::{HandlerError, StatusCode, chunked_headers};
use crate::http::writer::ResponseWriter;
use crate::server::handler::{ChannelSink, Handler};

/// Drives one request/response cycle over a byte stream.
///
/// The parser, its buffer and the request all live inside this value, so
/// nothing is shared with other connections.
pub struct Connection<S> {
    stream: S,
    handler: Arc<dyn Handler>,
    config: Arc<Config>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Streaming(Request),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, handler: Arc<dyn Handler>, config: Arc<Config>) -> Self {
        Self {
            stream,
            handler,
            config,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> Result<(), Error> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Some(Ok(req)) => ConnectionState::Processing(req),
                        Some(Err(writer)) => ConnectionState::Writing(writer),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(req) => {
                    self.state = if self.handler.streams_body(&req) {
                        ConnectionState::Streaming(req)
                    } else {
                        ConnectionState::Writing(self.respond(req).await)
                    };
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Streaming(req) => {
                    self.stream_response(req).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    if let Err(e) = self.stream.shutdown().await {
                        debug!(error = %e, "Shutdown after response failed");
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads one request. A parse failure turns into a ready-made 400
    /// response; transport failures abort the connection.
    async fn read_request(&mut self) -> Result<Option<Result<Request, ResponseWriter>>, Error> {
        let result = read_request(
            &mut self.stream,
            self.config.read_chunk_size,
            self.config.initial_buffer_capacity,
        )
        .await;

        match result {
            Ok(Some(req)) => {
                info!(
                    method = req.method(),
                    target = req.target(),
                    body_len = req.body.len(),
                    "Request received"
                );
                Ok(Some(Ok(req)))
            }
            Ok(None) => {
                debug!("Client closed connection before sending a request");
                Ok(None)
            }
            Err(Error::Parse(e)) => {
                warn!(error = %e, "Rejecting malformed request");
                let err = HandlerError::bad_request(e.to_string());
                Ok(Some(Err(ResponseWriter::from_handler_error(&err))))
            }
            Err(e) => Err(e),
        }
    }

    /// Runs the handler to completion and builds a fixed-length response.
    async fn respond(&self, req: Request) -> ResponseWriter {
        let handler = Arc::clone(&self.handler);
        let content_type = handler.raw_content_type(&req).map(str::to_string);

        let outcome = tokio::task::spawn_blocking(move || {
            let mut body = Vec::new();
            let result = handler.handle(&mut body, &req);
            (body, result)
        })
        .await;

        match outcome {
            Ok((body, Ok(()))) => {
                debug!(status = 200, bytes = body.len(), "Handler finished");
                match content_type {
                    Some(content_type) => ResponseWriter::raw(StatusCode::OK, &body, &content_type),
                    None => ResponseWriter::html(StatusCode::OK, &body),
                }
            }
            Ok((_, Err(err))) => {
                debug!(status = err.status.as_u16(), "Handler returned an error");
                ResponseWriter::from_handler_error(&err)
            }
            Err(e) => {
                error!(error = %e, "Handler task failed");
                ResponseWriter::from_handler_error(&HandlerError::internal_error(
                    "handler failed",
                ))
            }
        }
    }

    /// Sends the head, then relays handler output as chunks while the
    /// handler is still running.
    async fn stream_response(&mut self, req: Request) -> Result<(), Error> {
        let mut head = ResponseWriter::new();
        head.write_status_line(StatusCode::OK);
        head.write_headers(&chunked_headers());
        head.write_to_stream(&mut self.stream).await?;

        let (mut sink, mut rx) = ChannelSink::channel(self.config.chunk_queue_capacity);
        let handler = Arc::clone(&self.handler);
        let producer = tokio::task::spawn_blocking(move || handler.handle(&mut sink, &req));

        let mut body = ChunkedBodyWriter::new(&mut self.stream);
        while let Some(chunk) = rx.recv().await {
            body.write_chunk(&chunk).await?;
        }

        let chunks = body.chunks();
        let trailers = body.finish().await?;
        debug!(
            chunks,
            bytes = trailers.get("x-content-length").unwrap_or("0"),
            "Chunked body complete"
        );

        match producer.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "Handler failed after response head was sent"),
            Err(e) => error!(error = %e, "Handler task failed"),
        }

        Ok(())
    }
}
