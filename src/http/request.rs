use crate::http::headers::{Headers, find_crlf};
use crate::http::parser::ParseError;

/// The only HTTP version accepted on the request line.
pub const SUPPORTED_VERSION: &str = "1.1";

const VERSION_MARKER: &str = "HTTP/1.1";

/// Progress of a request through the parser. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ParseState {
    /// Waiting for a complete request line
    #[default]
    Initialized,
    /// Request line seen, reading header lines
    ParsingHeaders,
    /// Headers done, reading `Content-Length` bytes of body
    ParsingBody,
    /// Request complete; further input is ignored
    Done,
}

/// The first line of a request: `METHOD SP TARGET SP HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Uppercase method token (e.g. "GET")
    pub method: String,
    /// Request target, passed through unvalidated
    pub target: String,
    /// Version number without the "HTTP/" prefix; always "1.1"
    pub version: String,
}

impl RequestLine {
    /// Tries to extract the request line from the front of `data`.
    ///
    /// Returns `Ok(None)` while no CRLF has arrived yet. On success the
    /// consumed count includes the trailing CRLF.
    pub fn parse(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
        let Some(end) = find_crlf(data) else {
            return Ok(None);
        };

        let line = std::str::from_utf8(&data[..end])
            .map_err(|_| ParseError::MalformedRequestLine)?;

        let parts: Vec<&str> = line.split(' ').collect();
        let &[method, target, version] = parts.as_slice() else {
            return Err(ParseError::MalformedRequestLine);
        };

        if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ParseError::MalformedRequestLine);
        }

        if !version.contains(VERSION_MARKER) {
            return Err(ParseError::UnsupportedVersion(version.to_string()));
        }

        let request_line = RequestLine {
            method: method.to_string(),
            target: target.to_string(),
            version: SUPPORTED_VERSION.to_string(),
        };

        Ok(Some((request_line, end + 2)))
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Produced by [`RequestParser::finish`](crate::http::parser::RequestParser::finish)
/// once parsing is [`ParseState::Done`], so the request line is always present.
#[derive(Debug, Clone)]
pub struct Request {
    pub line: RequestLine,
    /// Request headers, lower-cased names
    pub headers: Headers,
    /// Exactly `Content-Length` bytes, or empty
    pub body: Vec<u8>,
    pub state: ParseState,
}

impl Request {
    pub fn method(&self) -> &str {
        &self.line.method
    }

    pub fn target(&self) -> &str {
        &self.line.target
    }

    pub fn version(&self) -> &str {
        &self.line.version
    }

    /// Retrieves a header value by name (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }
}

/// Builder for constructing Request objects, mainly for handler tests.
pub struct RequestBuilder {
    method: String,
    target: String,
    headers: Headers,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: "GET".to_string(),
            target: "/".to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.append(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds a request in the `Done` state.
    pub fn build(self) -> Request {
        Request {
            line: RequestLine {
                method: self.method,
                target: self.target,
                version: SUPPORTED_VERSION.to_string(),
            },
            headers: self.headers,
            body: self.body,
            state: ParseState::Done,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
