//! Executable TLS policies.
//!
//! A [`TlsPolicy`] is what a creator builds from a validated descriptor: it
//! decides whether a presented server certificate is trusted, and carries
//! the protection and protocol versions the connection must use. The
//! cryptographic checks themselves are delegated to rustls/webpki.

mod certificate;
mod digest;
mod insecure;
mod public_key;
mod verifier;

use std::fmt;
use std::str::FromStr;

use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, SupportedProtocolVersion};
use serde::{Deserialize, Serialize};
use x509_parser::parse_x509_certificate;

use crate::descriptor::{PolicyType, TlsProtection};
use crate::error::ValidationError;

pub use certificate::{CertificateDigestTlsPolicy, CertificateTlsPolicy};
pub use digest::DigestAlgorithm;
pub use insecure::{InsecureTlsPolicy, PinnedCertificate, TrustFirstCertificateTlsPolicy};
pub use public_key::{PublicKeyDigestTlsPolicy, PublicKeyTlsPolicy};
pub use verifier::{client_config, TlsPolicyVerifier};

/// TLS protocol versions a policy may permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TlsVersion {
    /// TLS 1.2.
    #[serde(rename = "TLSv1.2")]
    Tls12,
    /// TLS 1.3.
    #[serde(rename = "TLSv1.3")]
    Tls13,
}

impl TlsVersion {
    /// Every supported version, newest first.
    pub const ALL: [Self; 2] = [Self::Tls13, Self::Tls12];

    /// Canonical name, e.g. `TLSv1.3`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tls12 => "TLSv1.2",
            Self::Tls13 => "TLSv1.3",
        }
    }

    /// The rustls protocol version.
    #[must_use]
    pub fn supported(&self) -> &'static SupportedProtocolVersion {
        match self {
            Self::Tls12 => &rustls::version::TLS12,
            Self::Tls13 => &rustls::version::TLS13,
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TlsVersion {
    type Err = ValidationError;

    /// Accepts `TLSv1.2`, `TLS1.2` and `TLSv1_3` style names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase().replace('_', ".");
        let version = lower
            .strip_prefix("tlsv")
            .or_else(|| lower.strip_prefix("tls"))
            .unwrap_or_default();
        match version {
            "1.2" => Ok(Self::Tls12),
            "1.3" => Ok(Self::Tls13),
            _ => Err(ValidationError::UnknownProtocol {
                protocol: s.to_string(),
            }),
        }
    }
}

/// Connection settings shared by every policy kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySettings {
    /// Promised protection.
    pub protection: TlsProtection,
    /// Permitted protocol versions, never empty.
    pub versions: Vec<TlsVersion>,
}

impl PolicySettings {
    /// Settings with `protection`; an empty version list means every version.
    #[must_use]
    pub fn new(protection: TlsProtection, mut versions: Vec<TlsVersion>) -> Self {
        if versions.is_empty() {
            versions = TlsVersion::ALL.to_vec();
        }
        versions.sort_unstable_by(|a, b| b.cmp(a));
        versions.dedup();
        Self {
            protection,
            versions,
        }
    }
}

/// An executable trust policy.
pub trait TlsPolicy: Send + Sync + fmt::Debug {
    /// The type this policy was built for.
    fn policy_type(&self) -> PolicyType;

    /// Protection and protocol settings.
    fn settings(&self) -> &PolicySettings;

    /// Promised protection.
    fn protection(&self) -> TlsProtection {
        self.settings().protection
    }

    /// Permitted protocol versions.
    fn protocol_versions(&self) -> &[TlsVersion] {
        &self.settings().versions
    }

    /// Returns true when the policy authenticates the server.
    fn is_secure(&self) -> bool {
        self.policy_type().authenticates()
    }

    /// Decides whether the presented chain is trusted for `server_name`.
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        now: UnixTime,
    ) -> Result<(), rustls::Error>;
}

fn untrusted() -> rustls::Error {
    rustls::Error::InvalidCertificate(CertificateError::ApplicationVerificationFailure)
}

/// DER SubjectPublicKeyInfo of a certificate.
fn subject_public_key_info(cert: &CertificateDer<'_>) -> Result<Vec<u8>, rustls::Error> {
    let (_, parsed) = parse_x509_certificate(cert.as_ref())
        .map_err(|_| rustls::Error::InvalidCertificate(CertificateError::BadEncoding))?;
    Ok(parsed.public_key().raw.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    #[test]
    fn versions_parse_loosely() {
        assert_eq!("TLSv1.2".parse::<TlsVersion>().unwrap(), TlsVersion::Tls12);
        assert_eq!("tls1.3".parse::<TlsVersion>().unwrap(), TlsVersion::Tls13);
        assert_eq!("TLSv1_3".parse::<TlsVersion>().unwrap(), TlsVersion::Tls13);
        assert!(matches!(
            "SSLv3".parse::<TlsVersion>(),
            Err(ValidationError::UnknownProtocol { .. })
        ));
        assert!("TLSv1.1".parse::<TlsVersion>().is_err());
    }

    #[test]
    fn settings_default_and_normalize_versions() {
        let s = PolicySettings::new(TlsProtection::full(), Vec::new());
        assert_eq!(s.versions, vec![TlsVersion::Tls13, TlsVersion::Tls12]);

        let s = PolicySettings::new(
            TlsProtection::full(),
            vec![TlsVersion::Tls12, TlsVersion::Tls13, TlsVersion::Tls12],
        );
        assert_eq!(s.versions, vec![TlsVersion::Tls13, TlsVersion::Tls12]);
    }

    #[test]
    fn spki_extraction_matches_fixture() {
        assert_eq!(
            subject_public_key_info(&testdata::host1_cert()).unwrap(),
            testdata::host1_spki()
        );
        assert!(subject_public_key_info(&CertificateDer::from(vec![1, 2, 3])).is_err());
    }
}
