use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum GemletError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Could not connect to {host}: {source}")]
    Connect {
        host: String,
        source: std::io::Error,
    },

    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        source: std::io::Error,
    },

    #[error("Timed out talking to {0}")]
    Timeout(String),

    #[error("Malformed response header: {0:?}")]
    MalformedHeader(String),

    #[error("Unknown charset: {0}")]
    UnknownCharset(String),

    #[error("Could not decode body as {0}")]
    Decode(String),

    #[error("Response body exceeds {0} bytes")]
    BodyTooLarge(usize),

    #[error("Certificate file error: {0}")]
    Certificate(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GemletError>;
