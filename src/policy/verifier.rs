//! rustls adapter for executable policies.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme, SupportedProtocolVersion};

use super::TlsPolicy;

/// Adapts a [`TlsPolicy`] into a rustls server certificate verifier.
///
/// Trust decisions come from the policy; handshake signatures are always
/// checked with the crypto provider's algorithms.
#[derive(Debug)]
pub struct TlsPolicyVerifier {
    policy: Arc<dyn TlsPolicy>,
    provider: Arc<CryptoProvider>,
}

impl TlsPolicyVerifier {
    /// Wraps `policy`, verifying signatures with `provider`.
    #[must_use]
    pub fn new(policy: Arc<dyn TlsPolicy>, provider: Arc<CryptoProvider>) -> Self {
        Self { policy, provider }
    }

    /// The wrapped policy.
    #[must_use]
    pub fn policy(&self) -> &Arc<dyn TlsPolicy> {
        &self.policy
    }
}

impl ServerCertVerifier for TlsPolicyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        self.policy
            .verify_server_cert(end_entity, intermediates, server_name, now)
            .map(|()| ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Builds a client configuration enforcing `policy`.
///
/// The configuration offers only the policy's protocol versions and trusts
/// servers exactly as the policy does.
pub fn client_config(
    policy: Arc<dyn TlsPolicy>,
    provider: Arc<CryptoProvider>,
) -> Result<ClientConfig, rustls::Error> {
    let versions: Vec<&'static SupportedProtocolVersion> = policy
        .protocol_versions()
        .iter()
        .map(|v| v.supported())
        .collect();
    let verifier = Arc::new(TlsPolicyVerifier::new(policy, Arc::clone(&provider)));
    Ok(ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(&versions)?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth())
}
