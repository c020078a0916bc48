use thiserror::Error;

use crate::http::parser::ParseError;

/// Errors surfaced by connection handling and the server lifecycle.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Non-EOF transport failure while reading or writing
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// `Server::close` was called on a server that is already closed
    #[error("server is already terminated")]
    AlreadyTerminated,
}

pub type Result<T> = std::result::Result<T, Error>;
