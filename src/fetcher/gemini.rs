use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;
use url::{Host, Url};

use crate::app::{GemletError, Result};
use crate::config::Config;
use crate::fetcher::header::{self, MAX_HEADER_BYTES};
use crate::fetcher::{tls, Fetcher, Response, StatusClass, DEFAULT_PORT};

/// Longest URL a request may carry.
pub const MAX_REQUEST_URL_BYTES: usize = 1024;

pub struct GeminiFetcher {
    connector: TlsConnector,
    connect_timeout: Duration,
    read_timeout: Duration,
    max_body_bytes: usize,
}

impl GeminiFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let cert_file = if config.cert_file.is_empty() {
            None
        } else {
            Some(std::path::Path::new(&config.cert_file))
        };

        Ok(Self {
            connector: tls::connector(cert_file)?,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl Fetcher for GeminiFetcher {
    async fn fetch(&self, url: &Url) -> Result<Response> {
        // IPv6 literals lose their brackets so they work as a socket address and SNI name
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(GemletError::Other(format!("URL has no host: {}", url))),
        };
        let port = url.port().unwrap_or(DEFAULT_PORT);
        let request = build_request(url)?;

        debug!("Connecting to {}:{}", host, port);
        let tcp = timeout(self.connect_timeout, TcpStream::connect((host.as_str(), port)))
            .await
            .map_err(|_| GemletError::Timeout(host.clone()))?
            .map_err(|source| GemletError::Connect {
                host: host.clone(),
                source,
            })?;

        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| GemletError::Other(format!("invalid server name {}: {}", host, e)))?;
        let stream = timeout(self.read_timeout, self.connector.connect(server_name, tcp))
            .await
            .map_err(|_| GemletError::Timeout(host.clone()))?
            .map_err(|source| GemletError::Handshake {
                host: host.clone(),
                source,
            })?;
        debug!("TLS session established with {}", host);

        timeout(
            self.read_timeout,
            exchange(stream, &request, self.max_body_bytes),
        )
        .await
        .map_err(|_| GemletError::Timeout(host))?
    }
}

/// The request line for `url`: the URL followed by CRLF.
pub fn build_request(url: &Url) -> Result<String> {
    let url = url.as_str();
    if url.len() > MAX_REQUEST_URL_BYTES {
        return Err(GemletError::Other(format!(
            "URL is longer than {} bytes",
            MAX_REQUEST_URL_BYTES
        )));
    }
    Ok(format!("{}\r\n", url))
}

/// Send `request` over an established stream and read the response.
///
/// The body is only read for success responses.
pub async fn exchange<S>(stream: S, request: &str, max_body_bytes: usize) -> Result<Response>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    stream.get_mut().write_all(request.as_bytes()).await?;
    stream.get_mut().flush().await?;

    let mut raw_header = Vec::new();
    (&mut stream)
        .take(MAX_HEADER_BYTES as u64 + 2)
        .read_until(b'\n', &mut raw_header)
        .await?;
    if !raw_header.ends_with(b"\n") {
        let shown = String::from_utf8_lossy(&raw_header).into_owned();
        return Err(GemletError::MalformedHeader(shown));
    }
    let line = String::from_utf8(raw_header)
        .map_err(|e| GemletError::MalformedHeader(String::from_utf8_lossy(e.as_bytes()).into_owned()))?;

    let (status, meta) = header::parse_header(&line);
    debug!("Response header: {} {}", status, meta);

    let mut response = Response {
        status,
        meta,
        body: None,
    };
    if response.class() == StatusClass::Success {
        let bytes = read_body(&mut stream, max_body_bytes).await?;
        response.body = Some(header::decode_body(&bytes, &response.meta)?);
    }

    Ok(response)
}

/// Read until the server closes the connection.
///
/// Many servers close without a TLS close_notify; that surfaces as an
/// unexpected EOF and is treated as the end of the body.
async fn read_body<R>(reader: &mut R, max_body_bytes: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut body = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if body.len() + n > max_body_bytes {
                    return Err(GemletError::BodyTooLarge(max_body_bytes));
                }
                body.extend_from_slice(&chunk[..n]);
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(body)
}
