use std::fmt;

use crate::http::headers::Headers;

/// HTTP status code as sent by a handler.
///
/// Any `u16` can be carried, but only 200, 400 and 500 have a status line;
/// every other code serializes as a bare CRLF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use wireline::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode(404).as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the reason phrase for the codes this server knows about.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        match self.0 {
            200 => Some("OK"),
            400 => Some("Bad Request"),
            500 => Some("Internal Server Error"),
            _ => None,
        }
    }

    /// The full status line including CRLF, or just CRLF for unmapped codes.
    pub fn status_line(&self) -> &'static [u8] {
        match self.0 {
            200 => b"HTTP/1.1 200 OK\r\n",
            400 => b"HTTP/1.1 400 Bad Request\r\n",
            500 => b"HTTP/1.1 500 Internal Server Error\r\n",
            _ => b"\r\n",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason_phrase() {
            Some(reason) => write!(f, "{} {}", self.0, reason),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// Headers sent with every fixed-length HTML response.
pub fn default_headers(content_length: usize) -> Headers {
    content_headers(content_length, "text/html")
}

/// Fixed-length response headers for an arbitrary content type.
pub fn content_headers(content_length: usize, content_type: &str) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", content_length.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", content_type);
    headers
}

/// Headers sent ahead of a chunked body. No `Content-Length`.
pub fn chunked_headers() -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Type", "text/plain");
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Trailer", "X-Content-SHA256, X-Content-Length");
    headers
}

/// Error returned by a handler to replace the normal response.
///
/// Serialized with its own status code and the message as body, using the
/// same default headers as a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: Vec<u8>,
}

impl HandlerError {
    pub fn new(status: impl Into<StatusCode>, message: impl Into<Vec<u8>>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal_error(message: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, String::from_utf8_lossy(&self.message))
    }
}

impl std::error::Error for HandlerError {}

impl From<std::io::Error> for HandlerError {
    fn from(e: std::io::Error) -> Self {
        HandlerError::internal_error(e.to_string())
    }
}
