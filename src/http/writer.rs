use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::{HandlerError, StatusCode, content_headers, default_headers};

const HTTP_VERSION_PREFIX: &[u8] = b"HTTP/1.1 ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("status line is malformed")]
    MalformedStatusLine,
}

/// Serializes headers as `name:value\r\n` lines plus the blank terminator.
pub fn serialize_headers(headers: &Headers) -> Vec<u8> {
    let mut buf = Vec::new();
    for (k, v) in headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.push(b':');
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(b"\r\n");
    buf
}

/// Assembles a fixed-length response: status line, header block, body.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status_line: Vec<u8>,
    headers: Vec<u8>,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the HTML response for `status` wrapping `payload`, with
    /// default headers sized to the final body.
    pub fn html(status: StatusCode, payload: &[u8]) -> Self {
        let mut writer = Self::new();
        writer.write_status_line(status);

        // Unmapped status codes have no title to render; send an empty body.
        let body_len = writer.write_body(payload).unwrap_or(0);
        writer.write_headers(&default_headers(body_len));
        writer
    }

    /// Builds a response that sends `payload` as-is with the given
    /// content type instead of wrapping it in HTML.
    pub fn raw(status: StatusCode, payload: &[u8], content_type: &str) -> Self {
        let mut writer = Self::new();
        writer.write_status_line(status);
        writer.body = payload.to_vec();
        writer.write_headers(&content_headers(payload.len(), content_type));
        writer
    }

    /// Serializes a handler-signaled error.
    pub fn from_handler_error(err: &HandlerError) -> Self {
        Self::html(err.status, &err.message)
    }

    pub fn write_status_line(&mut self, status: StatusCode) {
        self.status_line = status.status_line().to_vec();
    }

    pub fn write_headers(&mut self, headers: &Headers) {
        self.headers = serialize_headers(headers);
    }

    /// Wraps `payload` in a minimal HTML page titled after the status line.
    ///
    /// Must be called after [`write_status_line`](Self::write_status_line).
    /// Returns the body length.
    pub fn write_body(&mut self, payload: &[u8]) -> Result<usize, ResponseError> {
        let status = self
            .status_line
            .strip_prefix(HTTP_VERSION_PREFIX)
            .ok_or(ResponseError::MalformedStatusLine)?;
        let title = String::from_utf8_lossy(status);
        let title = title.trim_end();
        // Skip the three digit code and the space after it
        let heading = title.get(4..).unwrap_or_default();

        let head = format!(
            "<html>\n  <head>\n    <title>{}</title>\n  </head>\n  <body>\n    <h1>{}</h1>\n    <p>",
            title, heading
        );
        let tail = "</p>\n  </body>\n</html>";

        // Payload bytes are spliced in untouched; they need not be UTF-8.
        let mut body = Vec::with_capacity(head.len() + payload.len() + tail.len());
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(payload);
        body.extend_from_slice(tail.as_bytes());
        self.body = body;

        Ok(self.body.len())
    }

    pub fn status_line(&self) -> &[u8] {
        &self.status_line
    }

    pub fn headers(&self) -> &[u8] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(self.status_line.len() + self.headers.len() + self.body.len());
        buf.extend_from_slice(&self.status_line);
        buf.extend_from_slice(&self.headers);
        buf.extend_from_slice(&self.body);
        buf
    }

    pub async fn write_to_stream<W>(&self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let buffer = self.to_bytes();
        let mut written = 0;

        while written < buffer.len() {
            let n = stream.write(&buffer[written..]).await?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            written += n;
        }

        stream.flush().await
    }
}
