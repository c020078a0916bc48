use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Error;
use crate::http::buffer::ByteAccumulator;
use crate::http::headers::Headers;
use crate::http::request::{ParseState, Request, RequestLine};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("unsupported http version: {0}")]
    UnsupportedVersion(String),
    #[error("malformed header")]
    MalformedHeader,
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
    #[error("invalid content-length: {0}")]
    InvalidContentLength(String),
    #[error("body is longer than content-length ({declared} bytes)")]
    BodyOverflow { declared: usize },
    #[error("stream ended before the request was complete")]
    Incomplete,
}

/// Incremental request parser owned by a single connection.
///
/// Bytes are fed in as they arrive; the parser keeps whatever it cannot use
/// yet in its own accumulator and advances its state as far as the available
/// input allows. A [`Request`] only exists once parsing is done.
#[derive(Debug)]
pub struct RequestParser {
    buffer: ByteAccumulator,
    line: Option<RequestLine>,
    headers: Headers,
    body: Vec<u8>,
    state: ParseState,
    content_length: usize,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::with_capacity(8)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: ByteAccumulator::with_capacity(capacity),
            line: None,
            headers: Headers::new(),
            body: Vec::new(),
            state: ParseState::Initialized,
            content_length: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// The request line, once it has been parsed.
    pub fn line(&self) -> Option<&RequestLine> {
        self.line.as_ref()
    }

    /// Headers parsed so far.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Body bytes received so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Bytes held but not consumed by any parse step.
    pub fn buffered(&self) -> &[u8] {
        self.buffer.view()
    }

    /// Feeds newly read bytes and parses as far as possible.
    ///
    /// Returns the number of buffered bytes consumed during this call. Input
    /// arriving after the request is done is ignored.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            return Ok(0);
        }

        self.buffer.append(data);

        let mut total = 0;
        loop {
            let before = self.state;
            let consumed = self.step()?;
            self.buffer.consume(consumed);
            total += consumed;

            if self.is_done() || (consumed == 0 && self.state == before) {
                break;
            }
        }

        Ok(total)
    }

    /// Hands out the finished request, or `Incomplete` if input ended early.
    pub fn finish(self) -> Result<Request, ParseError> {
        match self.line {
            Some(line) if self.state == ParseState::Done => Ok(Request {
                line,
                headers: self.headers,
                body: self.body,
                state: self.state,
            }),
            _ => Err(ParseError::Incomplete),
        }
    }

    fn step(&mut self) -> Result<usize, ParseError> {
        let data = self.buffer.view();

        match self.state {
            ParseState::Initialized => {
                let Some((line, consumed)) = RequestLine::parse(data)? else {
                    return Ok(0);
                };
                self.line = Some(line);
                self.state = ParseState::ParsingHeaders;
                Ok(consumed)
            }

            ParseState::ParsingHeaders => {
                let (consumed, done) = self.headers.parse(data)?;
                if done {
                    self.finish_headers()?;
                }
                Ok(consumed)
            }

            ParseState::ParsingBody => {
                if self.body.len() + data.len() > self.content_length {
                    return Err(ParseError::BodyOverflow {
                        declared: self.content_length,
                    });
                }

                self.body.extend_from_slice(data);
                let consumed = data.len();

                if self.body.len() == self.content_length {
                    self.state = ParseState::Done;
                }
                Ok(consumed)
            }

            ParseState::Done => Ok(0),
        }
    }

    fn finish_headers(&mut self) -> Result<(), ParseError> {
        let Some(value) = self.headers.get("content-length") else {
            self.state = ParseState::Done;
            return Ok(());
        };

        let invalid = || ParseError::InvalidContentLength(value.to_string());
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        self.content_length = value.parse::<usize>().map_err(|_| invalid())?;
        self.state = ParseState::ParsingBody;
        Ok(())
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads one request from `reader` in `read_size` increments.
///
/// Returns `Ok(None)` if the peer closed the stream before sending anything.
pub async fn read_request<R>(
    reader: &mut R,
    read_size: usize,
    initial_capacity: usize,
) -> Result<Option<Request>, Error>
where
    R: AsyncRead + Unpin,
{
    let mut parser = RequestParser::with_capacity(initial_capacity);
    let mut temp = vec![0u8; read_size.max(1)];
    let mut received = 0usize;

    while !parser.is_done() {
        let n = match reader.read(&mut temp).await {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => 0,
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            if received == 0 {
                return Ok(None);
            }
            break;
        }

        received += n;
        parser.feed(&temp[..n])?;
    }

    tracing::trace!(bytes = received, state = ?parser.state(), "Finished reading request");
    Ok(Some(parser.finish()?))
}
