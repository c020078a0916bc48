//! HTTP protocol implementation.
//!
//! This module implements a one-request-per-connection HTTP/1.1 server on top
//! of a raw byte stream.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`buffer`**: Growable accumulator for bytes that have not been parsed yet
//! - **`headers`**: Header map and the incremental header block parser
//! - **`request`**: Request line parsing and the request representation
//! - **`parser`**: The request state machine driving the parsers above
//! - **`response`**: Status codes, header presets and handler errors
//! - **`writer`**: Serializes fixed-length responses
//! - **`chunked`**: Chunked transfer-coding with trailers
//! - **`connection`**: The per-connection read/handle/write state machine
//!
//! # Request State Machine
//!
//! ```text
//!        ┌──────────────┐
//!        │ Initialized  │ ← Wait for a complete request line
//!        └──────┬───────┘
//!               │ Request line parsed
//!               ▼
//!        ┌──────────────────┐
//!        │  ParsingHeaders  │ ← Consume header lines until the blank line
//!        └──────┬───────────┘
//!               ├─ No Content-Length → Done
//!               ▼
//!        ┌──────────────────┐
//!        │   ParsingBody    │ ← Accumulate exactly Content-Length bytes
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │       Done       │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use wireline::http::parser::RequestParser;
//!
//! let mut parser = RequestParser::new();
//! parser.feed(b"GET / HTTP/1.1\r\nHost: local").unwrap();
//! parser.feed(b"host\r\n\r\n").unwrap();
//!
//! let req = parser.finish().unwrap();
//! assert_eq!(req.header("host"), Some("localhost"));
//! ```

pub mod buffer;
pub mod chunked;
pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
