//! Policies without server authentication: insecure and trust-on-first-use.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};

use super::{untrusted, PolicySettings, TlsPolicy};
use crate::descriptor::PolicyType;

/// Accepts any server certificate.
#[derive(Debug)]
pub struct InsecureTlsPolicy {
    settings: PolicySettings,
}

impl InsecureTlsPolicy {
    /// Builds the policy.
    #[must_use]
    pub fn new(settings: PolicySettings) -> Self {
        Self { settings }
    }
}

impl TlsPolicy for InsecureTlsPolicy {
    fn policy_type(&self) -> PolicyType {
        PolicyType::Insecure
    }

    fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _now: UnixTime,
    ) -> Result<(), rustls::Error> {
        Ok(())
    }
}

/// A certificate pinned on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedCertificate {
    /// The pinned end-entity certificate.
    pub certificate: CertificateDer<'static>,
    /// When it was first presented.
    pub pinned_at: DateTime<Utc>,
}

/// Trusts the first presented certificate, then only that one.
#[derive(Debug)]
pub struct TrustFirstCertificateTlsPolicy {
    settings: PolicySettings,
    pinned: Mutex<Option<PinnedCertificate>>,
}

impl TrustFirstCertificateTlsPolicy {
    /// Builds an unpinned policy.
    #[must_use]
    pub fn new(settings: PolicySettings) -> Self {
        Self {
            settings,
            pinned: Mutex::new(None),
        }
    }

    /// The pinned certificate, once one has been presented.
    #[must_use]
    pub fn pinned_certificate(&self) -> Option<PinnedCertificate> {
        self.pinned.lock().ok().and_then(|p| p.clone())
    }
}

impl TlsPolicy for TrustFirstCertificateTlsPolicy {
    fn policy_type(&self) -> PolicyType {
        PolicyType::TrustFirstCertificate
    }

    fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        now: UnixTime,
    ) -> Result<(), rustls::Error> {
        let mut pinned = self
            .pinned
            .lock()
            .map_err(|_| rustls::Error::General("poisoned lock: trust_first.pin".to_string()))?;
        match pinned.as_ref() {
            Some(p) if p.certificate.as_ref() == end_entity.as_ref() => Ok(()),
            Some(_) => Err(untrusted()),
            None => {
                let secs = i64::try_from(now.as_secs()).unwrap_or(i64::MAX);
                *pinned = Some(PinnedCertificate {
                    certificate: end_entity.clone().into_owned(),
                    pinned_at: DateTime::from_timestamp(secs, 0).unwrap_or_default(),
                });
                Ok(())
            }
        }
    }
}
