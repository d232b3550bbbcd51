pub mod gemini;
pub mod header;
pub mod tls;

use async_trait::async_trait;
use url::Url;

use crate::app::Result;

pub const DEFAULT_PORT: u16 = 1965;

/// What the first character of a status code says about the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Status is not exactly two ASCII digits.
    Malformed,
    Input,
    Success,
    Redirect,
    TemporaryFailure,
    PermanentFailure,
    CertificateRequired,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: String,
    pub meta: String,
    /// Decoded body lines; only present for success responses.
    pub body: Option<Vec<String>>,
}

impl Response {
    pub fn class(&self) -> StatusClass {
        let status = self.status.as_bytes();
        if status.len() != 2 || !status.iter().all(u8::is_ascii_digit) {
            return StatusClass::Malformed;
        }
        match status[0] {
            b'1' => StatusClass::Input,
            b'2' => StatusClass::Success,
            b'3' => StatusClass::Redirect,
            b'4' => StatusClass::TemporaryFailure,
            b'5' => StatusClass::PermanentFailure,
            b'6' => StatusClass::CertificateRequired,
            _ => StatusClass::Unknown,
        }
    }

    /// Status 11 asks for input that should not be echoed.
    pub fn is_sensitive_input(&self) -> bool {
        self.status.starts_with("11")
    }
}

#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &Url) -> Result<Response>;
}
