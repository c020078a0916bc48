//! Connection acceptance and the handler contract.
//!
//! [`Server`] owns the listening socket and spawns one task per accepted
//! connection. There is no connection limit; each task runs until its
//! response is written or its socket fails.

pub mod handler;
pub mod listener;

pub use handler::{ChannelSink, Handler};
pub use listener::Server;
