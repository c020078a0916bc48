//! Wireline - HTTP/1.1 straight from a TCP byte stream
//!
//! Core library for incremental request parsing, response serialization
//! and per-connection dispatch.

pub mod config;
pub mod error;
pub mod http;
pub mod server;
