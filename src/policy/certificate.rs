//! Policies that trust listed certificates or certificate digests.

use std::fmt;

use rustls::client::{verify_server_cert_signed_by_trust_anchor, verify_server_name};
use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::server::ParsedCertificate;
use rustls::RootCertStore;

use super::{untrusted, DigestAlgorithm, PolicySettings, TlsPolicy};
use crate::descriptor::PolicyType;
use crate::error::ValidationError;

/// Trusts the listed certificates.
///
/// A presented leaf identical to a listed certificate is accepted as a pin.
/// Any other leaf must chain to a listed certificate and match the server
/// name.
pub struct CertificateTlsPolicy {
    settings: PolicySettings,
    certificates: Vec<CertificateDer<'static>>,
    roots: RootCertStore,
    supported_algs: WebPkiSupportedAlgorithms,
}

impl CertificateTlsPolicy {
    /// Builds the policy; fails when a certificate cannot be a trust anchor.
    pub fn new(
        settings: PolicySettings,
        certificates: Vec<CertificateDer<'static>>,
        supported_algs: WebPkiSupportedAlgorithms,
    ) -> Result<Self, ValidationError> {
        let mut roots = RootCertStore::empty();
        for (index, cert) in certificates.iter().enumerate() {
            roots
                .add(cert.clone())
                .map_err(|e| ValidationError::InvalidCertificate {
                    index,
                    reason: e.to_string(),
                })?;
        }
        Ok(Self {
            settings,
            certificates,
            roots,
            supported_algs,
        })
    }

    /// The trusted certificates.
    #[must_use]
    pub fn certificates(&self) -> &[CertificateDer<'static>] {
        &self.certificates
    }
}

impl fmt::Debug for CertificateTlsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateTlsPolicy")
            .field("settings", &self.settings)
            .field("certificates", &self.certificates.len())
            .finish_non_exhaustive()
    }
}

impl TlsPolicy for CertificateTlsPolicy {
    fn policy_type(&self) -> PolicyType {
        PolicyType::Certificate
    }

    fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        now: UnixTime,
    ) -> Result<(), rustls::Error> {
        if self
            .certificates
            .iter()
            .any(|c| c.as_ref() == end_entity.as_ref())
        {
            return Ok(());
        }
        let parsed = ParsedCertificate::try_from(end_entity)?;
        verify_server_cert_signed_by_trust_anchor(
            &parsed,
            &self.roots,
            intermediates,
            now,
            self.supported_algs.all,
        )?;
        verify_server_name(&parsed, server_name)
    }
}

/// Trusts leaves whose certificate digest is listed.
#[derive(Debug)]
pub struct CertificateDigestTlsPolicy {
    settings: PolicySettings,
    algorithm: DigestAlgorithm,
    digests: Vec<Vec<u8>>,
}

impl CertificateDigestTlsPolicy {
    /// Builds the policy from raw digests of `algorithm`.
    #[must_use]
    pub fn new(settings: PolicySettings, algorithm: DigestAlgorithm, digests: Vec<Vec<u8>>) -> Self {
        Self {
            settings,
            algorithm,
            digests,
        }
    }

    /// The digest algorithm.
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl TlsPolicy for CertificateDigestTlsPolicy {
    fn policy_type(&self) -> PolicyType {
        PolicyType::CertificateDigest
    }

    fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _now: UnixTime,
    ) -> Result<(), rustls::Error> {
        let presented = self.algorithm.digest(end_entity.as_ref());
        if self.digests.iter().any(|d| *d == presented) {
            Ok(())
        } else {
            Err(untrusted())
        }
    }
}
