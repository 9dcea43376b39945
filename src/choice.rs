//! Policy choices proposed by providers.
//!
//! A choice is an unresolved proposal: either an inline descriptor or a
//! reference string naming a stored policy (by UUID) or one of the sentinel
//! policies. A choice carrying neither is treated as an abstention.

use serde::{Deserialize, Serialize};

use crate::descriptor::{TlsPolicyDescriptor, INSECURE, TRUST_FIRST_CERTIFICATE};
use crate::record::TlsPolicyId;

/// A candidate policy proposed for a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsPolicyChoice {
    /// Stored policy id or sentinel name.
    #[serde(default, alias = "tls_policy_id", skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,

    /// Inline descriptor; takes precedence over `policy_id`.
    #[serde(default, alias = "tls_policy_descriptor", skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<TlsPolicyDescriptor>,
}

impl TlsPolicyChoice {
    /// A choice carrying an inline descriptor.
    #[must_use]
    pub fn from_descriptor(descriptor: TlsPolicyDescriptor) -> Self {
        Self {
            policy_id: None,
            descriptor: Some(descriptor),
        }
    }

    /// A choice carrying a reference string (stored id or sentinel).
    #[must_use]
    pub fn from_reference(reference: impl Into<String>) -> Self {
        Self {
            policy_id: Some(reference.into()),
            descriptor: None,
        }
    }

    /// A choice referencing a stored policy.
    #[must_use]
    pub fn stored(id: TlsPolicyId) -> Self {
        Self::from_reference(id.to_string())
    }

    /// A choice referencing the `INSECURE` sentinel.
    #[must_use]
    pub fn insecure() -> Self {
        Self::from_reference(INSECURE)
    }

    /// A choice referencing the `TRUST_FIRST_CERTIFICATE` sentinel.
    #[must_use]
    pub fn trust_first_certificate() -> Self {
        Self::from_reference(TRUST_FIRST_CERTIFICATE)
    }

    /// Returns true when the choice proposes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptor.is_none() && self.policy_id.is_none()
    }

    /// Parses the reference string, if any.
    #[must_use]
    pub fn reference(&self) -> Option<PolicyReference> {
        self.policy_id.as_deref().map(PolicyReference::parse)
    }
}

impl From<TlsPolicyDescriptor> for TlsPolicyChoice {
    fn from(descriptor: TlsPolicyDescriptor) -> Self {
        Self::from_descriptor(descriptor)
    }
}

/// A configured choice: a bare reference string or a full choice object.
///
/// Blank references and empty objects mean "not configured".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum ChoiceSetting {
    Reference(String),
    Choice(TlsPolicyChoice),
}

impl ChoiceSetting {
    pub(crate) fn into_choice(self) -> Option<TlsPolicyChoice> {
        match self {
            Self::Reference(r) if !r.trim().is_empty() => {
                Some(TlsPolicyChoice::from_reference(r.trim()))
            }
            Self::Choice(c) if !c.is_empty() => Some(c),
            _ => None,
        }
    }
}

/// A parsed reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyReference {
    /// The `INSECURE` sentinel.
    Insecure,
    /// The `TRUST_FIRST_CERTIFICATE` sentinel.
    TrustFirstCertificate,
    /// A syntactically valid stored policy id.
    Stored(TlsPolicyId),
    /// Neither a sentinel nor a UUID.
    Malformed(String),
}

impl PolicyReference {
    /// Classifies a reference string.
    ///
    /// Sentinels are matched before any UUID parsing so they can never be
    /// shadowed by a lookup.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        match reference {
            INSECURE => Self::Insecure,
            TRUST_FIRST_CERTIFICATE => Self::TrustFirstCertificate,
            other => other
                .parse::<TlsPolicyId>()
                .map_or_else(|_| Self::Malformed(other.to_string()), Self::Stored),
        }
    }
}
