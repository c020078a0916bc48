//! Chunked transfer-coding for response bodies.
//!
//! Each non-empty write becomes one `hex-length CRLF data CRLF` frame. The
//! body ends with the terminal `0\r\n\r\n` chunk followed by trailers carrying
//! the SHA-256 and length of the payload.

use sha2::{Digest, Sha256};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::writer::serialize_headers;

pub const TERMINAL_CHUNK: &[u8] = b"0\r\n\r\n";

pub const CONTENT_SHA256_TRAILER: &str = "X-Content-SHA256";
pub const CONTENT_LENGTH_TRAILER: &str = "X-Content-Length";

/// Frames `data` as a single chunk.
pub fn frame_chunk(data: &[u8]) -> Vec<u8> {
    let size = format!("{:x}\r\n", data.len());
    let mut frame = Vec::with_capacity(size.len() + data.len() + 2);
    frame.extend_from_slice(size.as_bytes());
    frame.extend_from_slice(data);
    frame.extend_from_slice(b"\r\n");
    frame
}

fn to_hex(digest: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Writes a chunked body onto `stream`, hashing the payload as it goes.
///
/// Taking `self` in [`finish`](Self::finish) guarantees the terminal chunk
/// is written exactly once.
pub struct ChunkedBodyWriter<'a, W> {
    stream: &'a mut W,
    hasher: Sha256,
    content_length: usize,
    chunks: usize,
}

impl<'a, W> ChunkedBodyWriter<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(stream: &'a mut W) -> Self {
        Self {
            stream,
            hasher: Sha256::new(),
            content_length: 0,
            chunks: 0,
        }
    }

    /// Writes `data` as one chunk. Empty input writes nothing, since a
    /// zero-length chunk would end the body.
    pub async fn write_chunk(&mut self, data: &[u8]) -> std::io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        self.stream.write_all(&frame_chunk(data)).await?;
        self.hasher.update(data);
        self.content_length += data.len();
        self.chunks += 1;

        Ok(data.len())
    }

    /// Payload bytes written so far, excluding framing.
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Writes the terminal chunk and the trailer block; returns the trailers.
    pub async fn finish(self) -> std::io::Result<Headers> {
        let mut trailers = Headers::new();
        trailers.set(CONTENT_SHA256_TRAILER, to_hex(&self.hasher.finalize()));
        trailers.set(CONTENT_LENGTH_TRAILER, self.content_length.to_string());

        self.stream.write_all(TERMINAL_CHUNK).await?;
        self.stream.write_all(&serialize_headers(&trailers)).await?;
        self.stream.flush().await?;

        Ok(trailers)
    }
}
