//! Trust configuration for Gemini connections.
//!
//! Geminispace is mostly self-signed certificates, so the default is to
//! accept any server identity. When a certificate file is configured,
//! only certificates chaining to the PEM entries in that file are trusted.

use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, WebPkiSupportedAlgorithms};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::app::{GemletError, Result};

/// Build a connector that either trusts `cert_file` or accepts any server.
pub fn connector(cert_file: Option<&Path>) -> Result<TlsConnector> {
    Ok(TlsConnector::from(Arc::new(client_config(cert_file)?)))
}

pub fn client_config(cert_file: Option<&Path>) -> Result<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let algorithms = provider.signature_verification_algorithms;
    let builder =
        ClientConfig::builder_with_provider(provider).with_safe_default_protocol_versions()?;

    let config = match cert_file {
        Some(path) => {
            let roots = load_roots(path)?;
            debug!("Trusting {} certificate(s) from {}", roots.len(), path.display());
            builder.with_root_certificates(roots).with_no_client_auth()
        }
        None => {
            warn!("No certificate file configured; server identities are not verified");
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyServer { algorithms }))
                .with_no_client_auth()
        }
    };

    Ok(config)
}

fn load_roots(path: &Path) -> Result<RootCertStore> {
    let certs = CertificateDer::pem_file_iter(path)
        .map_err(|e| GemletError::Certificate(format!("{}: {}", path.display(), e)))?;

    let mut roots = RootCertStore::empty();
    for cert in certs {
        let cert =
            cert.map_err(|e| GemletError::Certificate(format!("{}: {}", path.display(), e)))?;
        roots.add(cert)?;
    }

    if roots.is_empty() {
        return Err(GemletError::Certificate(format!(
            "{}: no certificates found",
            path.display()
        )));
    }
    Ok(roots)
}

/// Skips certificate chain validation but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyServer {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for AcceptAnyServer {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
