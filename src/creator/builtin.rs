//! Creators for the built-in policy types.

use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::pki_types::CertificateDer;
use x509_parser::parse_x509_certificate;
use x509_parser::prelude::FromDer;
use x509_parser::x509::SubjectPublicKeyInfo;

use super::payload::{decode_data, digest_algorithm, settings, DataEncoding};
use super::{Creation, TlsPolicyCreator};
use crate::descriptor::{PolicyType, TlsPolicyDescriptor, TlsProtection};
use crate::error::ValidationError;
use crate::policy::{
    CertificateDigestTlsPolicy, CertificateTlsPolicy, InsecureTlsPolicy, PublicKeyDigestTlsPolicy,
    PublicKeyTlsPolicy, TrustFirstCertificateTlsPolicy,
};

/// Protection of a trust-on-first-use connection: encrypted, not authenticated.
const TRUST_FIRST_PROTECTION: TlsProtection = TlsProtection {
    confidentiality: true,
    integrity: true,
    authentication: false,
};

fn applies(descriptor: &TlsPolicyDescriptor, policy_type: PolicyType) -> bool {
    descriptor
        .classify()
        .is_some_and(|tag| tag.known() == Some(policy_type))
}

/// Builds [`InsecureTlsPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InsecureCreator;

impl TlsPolicyCreator for InsecureCreator {
    fn name(&self) -> &str {
        PolicyType::Insecure.as_str()
    }

    fn create(&self, descriptor: &TlsPolicyDescriptor) -> Result<Creation, ValidationError> {
        if !applies(descriptor, PolicyType::Insecure) {
            return Ok(Creation::NotApplicable);
        }
        let settings = settings(descriptor, TlsProtection::none())?;
        Ok(Creation::created(InsecureTlsPolicy::new(settings)))
    }
}

/// Builds [`TrustFirstCertificateTlsPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustFirstCertificateCreator;

impl TlsPolicyCreator for TrustFirstCertificateCreator {
    fn name(&self) -> &str {
        PolicyType::TrustFirstCertificate.as_str()
    }

    fn create(&self, descriptor: &TlsPolicyDescriptor) -> Result<Creation, ValidationError> {
        if !applies(descriptor, PolicyType::TrustFirstCertificate) {
            return Ok(Creation::NotApplicable);
        }
        let settings = settings(descriptor, TRUST_FIRST_PROTECTION)?;
        Ok(Creation::created(TrustFirstCertificateTlsPolicy::new(
            settings,
        )))
    }
}

/// Builds [`CertificateTlsPolicy`] from base64 (or hex) DER certificates.
#[derive(Debug, Clone, Copy)]
pub struct CertificateCreator {
    supported_algs: WebPkiSupportedAlgorithms,
}

impl CertificateCreator {
    /// Chains are verified with `supported_algs`.
    #[must_use]
    pub fn new(supported_algs: WebPkiSupportedAlgorithms) -> Self {
        Self { supported_algs }
    }
}

impl TlsPolicyCreator for CertificateCreator {
    fn name(&self) -> &str {
        PolicyType::Certificate.as_str()
    }

    fn create(&self, descriptor: &TlsPolicyDescriptor) -> Result<Creation, ValidationError> {
        if !applies(descriptor, PolicyType::Certificate) {
            return Ok(Creation::NotApplicable);
        }
        let settings = settings(descriptor, TlsProtection::full())?;
        let items = decode_data(descriptor, PolicyType::Certificate, DataEncoding::Base64)?;
        for (index, der) in items.iter().enumerate() {
            parse_x509_certificate(der).map_err(|e| ValidationError::InvalidCertificate {
                index,
                reason: e.to_string(),
            })?;
        }
        let certificates = items.into_iter().map(CertificateDer::from).collect();
        let policy = CertificateTlsPolicy::new(settings, certificates, self.supported_algs)?;
        Ok(Creation::created(policy))
    }
}

/// Builds [`CertificateDigestTlsPolicy`] from hex (or base64) digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateDigestCreator;

impl TlsPolicyCreator for CertificateDigestCreator {
    fn name(&self) -> &str {
        PolicyType::CertificateDigest.as_str()
    }

    fn create(&self, descriptor: &TlsPolicyDescriptor) -> Result<Creation, ValidationError> {
        if !applies(descriptor, PolicyType::CertificateDigest) {
            return Ok(Creation::NotApplicable);
        }
        let settings = settings(descriptor, TlsProtection::full())?;
        let digests = decode_data(descriptor, PolicyType::CertificateDigest, DataEncoding::Hex)?;
        let algorithm = digest_algorithm(descriptor, &digests)?;
        Ok(Creation::created(CertificateDigestTlsPolicy::new(
            settings, algorithm, digests,
        )))
    }
}

/// Builds [`PublicKeyTlsPolicy`] from base64 (or hex) DER SubjectPublicKeyInfo.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicKeyCreator;

impl TlsPolicyCreator for PublicKeyCreator {
    fn name(&self) -> &str {
        PolicyType::PublicKey.as_str()
    }

    fn create(&self, descriptor: &TlsPolicyDescriptor) -> Result<Creation, ValidationError> {
        if !applies(descriptor, PolicyType::PublicKey) {
            return Ok(Creation::NotApplicable);
        }
        let settings = settings(descriptor, TlsProtection::full())?;
        let keys = decode_data(descriptor, PolicyType::PublicKey, DataEncoding::Base64)?;
        for (index, der) in keys.iter().enumerate() {
            SubjectPublicKeyInfo::from_der(der).map_err(|e| ValidationError::InvalidPublicKey {
                index,
                reason: e.to_string(),
            })?;
        }
        Ok(Creation::created(PublicKeyTlsPolicy::new(settings, keys)))
    }
}

/// Builds [`PublicKeyDigestTlsPolicy`] from hex (or base64) digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicKeyDigestCreator;

impl TlsPolicyCreator for PublicKeyDigestCreator {
    fn name(&self) -> &str {
        PolicyType::PublicKeyDigest.as_str()
    }

    fn create(&self, descriptor: &TlsPolicyDescriptor) -> Result<Creation, ValidationError> {
        if !applies(descriptor, PolicyType::PublicKeyDigest) {
            return Ok(Creation::NotApplicable);
        }
        let settings = settings(descriptor, TlsProtection::full())?;
        let digests = decode_data(descriptor, PolicyType::PublicKeyDigest, DataEncoding::Hex)?;
        let algorithm = digest_algorithm(descriptor, &digests)?;
        Ok(Creation::created(PublicKeyDigestTlsPolicy::new(
            settings, algorithm, digests,
        )))
    }
}
