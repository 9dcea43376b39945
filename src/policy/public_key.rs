//! Policies that pin server public keys or their digests.

use rustls::pki_types::{CertificateDer, ServerName, UnixTime};

use super::{subject_public_key_info, untrusted, DigestAlgorithm, PolicySettings, TlsPolicy};
use crate::descriptor::PolicyType;

/// Trusts leaves whose SubjectPublicKeyInfo is listed.
#[derive(Debug)]
pub struct PublicKeyTlsPolicy {
    settings: PolicySettings,
    public_keys: Vec<Vec<u8>>,
}

impl PublicKeyTlsPolicy {
    /// Builds the policy from DER SubjectPublicKeyInfo values.
    #[must_use]
    pub fn new(settings: PolicySettings, public_keys: Vec<Vec<u8>>) -> Self {
        Self {
            settings,
            public_keys,
        }
    }
}

impl TlsPolicy for PublicKeyTlsPolicy {
    fn policy_type(&self) -> PolicyType {
        PolicyType::PublicKey
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
        let presented = subject_public_key_info(end_entity)?;
        if self.public_keys.contains(&presented) {
            Ok(())
        } else {
            Err(untrusted())
        }
    }
}

/// Trusts leaves whose SubjectPublicKeyInfo digest is listed.
#[derive(Debug)]
pub struct PublicKeyDigestTlsPolicy {
    settings: PolicySettings,
    algorithm: DigestAlgorithm,
    digests: Vec<Vec<u8>>,
}

impl PublicKeyDigestTlsPolicy {
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

impl TlsPolicy for PublicKeyDigestTlsPolicy {
    fn policy_type(&self) -> PolicyType {
        PolicyType::PublicKeyDigest
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
        let presented = self.algorithm.digest(&subject_public_key_info(end_entity)?);
        if self.digests.contains(&presented) {
            Ok(())
        } else {
            Err(untrusted())
        }
    }
}
