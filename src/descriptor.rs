//! TLS policy descriptors.
//!
//! A descriptor is the concrete, typed specification of a trust policy: the
//! policy type tag, the protection it promises, and the type-specific data
//! (certificates, public keys or digests) a creator needs to build an
//! executable policy.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reserved reference name for the policy that disables trust checks.
pub const INSECURE: &str = "INSECURE";

/// Reserved reference name for the trust-on-first-use policy.
pub const TRUST_FIRST_CERTIFICATE: &str = "TRUST_FIRST_CERTIFICATE";

/// Meta key naming the digest algorithm of digest policies (e.g. `SHA-256`).
pub const META_DIGEST_ALGORITHM: &str = "digest_algorithm";

/// Meta key naming the encoding of the `data` items (`base64` or `hex`).
pub const META_ENCODING: &str = "encoding";

/// The closed set of policy types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PolicyType {
    /// Trust the listed certificates, as pinned leaves or as roots.
    #[serde(rename = "certificate")]
    Certificate,
    /// Trust leaves whose certificate digest is listed.
    #[serde(rename = "certificate-digest")]
    CertificateDigest,
    /// Trust leaves whose public key is listed.
    #[serde(rename = "public-key")]
    PublicKey,
    /// Trust leaves whose public key digest is listed.
    #[serde(rename = "public-key-digest")]
    PublicKeyDigest,
    /// No trust checks at all.
    #[serde(rename = "INSECURE")]
    Insecure,
    /// Trust whatever certificate is presented first, then pin it.
    #[serde(rename = "TRUST_FIRST_CERTIFICATE")]
    TrustFirstCertificate,
}

impl PolicyType {
    /// Every policy type, in tag order.
    pub const ALL: [Self; 6] = [
        Self::Certificate,
        Self::CertificateDigest,
        Self::PublicKey,
        Self::PublicKeyDigest,
        Self::Insecure,
        Self::TrustFirstCertificate,
    ];

    /// Returns the wire tag of this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::CertificateDigest => "certificate-digest",
            Self::PublicKey => "public-key",
            Self::PublicKeyDigest => "public-key-digest",
            Self::Insecure => INSECURE,
            Self::TrustFirstCertificate => TRUST_FIRST_CERTIFICATE,
        }
    }

    /// Returns true for the types that authenticate the server.
    #[must_use]
    pub const fn authenticates(&self) -> bool {
        !matches!(self, Self::Insecure | Self::TrustFirstCertificate)
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownPolicyType { tag: s.to_string() })
    }
}

/// A policy type tag as written in a descriptor.
///
/// Tags outside the built-in set are kept verbatim so the allow-list can
/// reject them by name instead of the descriptor failing to decode.
///
/// ```
/// use tls_policy::{PolicyTag, PolicyType};
///
/// let known: PolicyTag = "public-key".into();
/// assert_eq!(known.known(), Some(PolicyType::PublicKey));
///
/// let legacy: PolicyTag = "TRUST_KNOWN_CERTIFICATE".into();
/// assert_eq!(legacy.known(), None);
/// assert_eq!(legacy.as_str(), "TRUST_KNOWN_CERTIFICATE");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PolicyTag {
    /// One of the built-in policy types.
    Known(PolicyType),
    /// Any other tag, such as a retired type name.
    Unknown(String),
}

impl PolicyTag {
    /// Returns the built-in type, if this tag names one.
    #[must_use]
    pub fn known(&self) -> Option<PolicyType> {
        match self {
            Self::Known(t) => Some(*t),
            Self::Unknown(_) => None,
        }
    }

    /// Returns the tag as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(t) => t.as_str(),
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for PolicyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PolicyType> for PolicyTag {
    fn from(policy_type: PolicyType) -> Self {
        Self::Known(policy_type)
    }
}

impl From<String> for PolicyTag {
    fn from(raw: String) -> Self {
        match raw.parse::<PolicyType>() {
            Ok(t) => Self::Known(t),
            Err(_) => Self::Unknown(raw),
        }
    }
}

impl From<&str> for PolicyTag {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<PolicyTag> for String {
    fn from(tag: PolicyTag) -> Self {
        match tag {
            PolicyTag::Known(t) => t.as_str().to_string(),
            PolicyTag::Unknown(raw) => raw,
        }
    }
}

impl PartialEq<PolicyType> for PolicyTag {
    fn eq(&self, other: &PolicyType) -> bool {
        self.known() == Some(*other)
    }
}

/// Security properties a policy promises for the connection.
///
/// Missing fields default to `true`, so a partially specified protection
/// object never weakens a policy by omission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsProtection {
    /// Traffic is encrypted.
    #[serde(alias = "encryption")]
    pub confidentiality: bool,
    /// Traffic is tamper-evident.
    pub integrity: bool,
    /// The server's identity is verified.
    pub authentication: bool,
}

impl TlsProtection {
    /// All three properties required.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            confidentiality: true,
            integrity: true,
            authentication: true,
        }
    }

    /// No properties required.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            confidentiality: false,
            integrity: false,
            authentication: false,
        }
    }

    /// Returns true when every property is required.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.confidentiality && self.integrity && self.authentication
    }
}

impl Default for TlsProtection {
    fn default() -> Self {
        Self::full()
    }
}

/// The resolved, concrete specification of a trust policy.
///
/// # Examples
///
/// ```
/// use tls_policy::{PolicyType, TlsPolicyDescriptor};
///
/// let descriptor = TlsPolicyDescriptor::new(PolicyType::CertificateDigest)
///     .with_meta("digest_algorithm", "SHA-256")
///     .with_data(["576cbd50fd83a5e159409869db6e5e34bcf79c43cc0933b00b2d41cc84a4585e"]);
/// assert_eq!(descriptor.classify(), Some(PolicyType::CertificateDigest.into()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsPolicyDescriptor {
    /// Explicit policy type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<PolicyTag>,

    /// Protection the policy promises.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection: Option<TlsProtection>,

    /// Permitted protocol versions (e.g. `TLSv1.2`); empty means the defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,

    /// Encoded certificates, public keys or digests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<String>,

    /// Free-form settings such as `digest_algorithm` and `encoding`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl TlsPolicyDescriptor {
    /// Creates an empty descriptor of the given type.
    #[must_use]
    pub fn new(policy_type: PolicyType) -> Self {
        Self {
            policy_type: Some(PolicyTag::Known(policy_type)),
            ..Self::default()
        }
    }

    /// The descriptor synthesized for the `INSECURE` reference.
    #[must_use]
    pub fn insecure() -> Self {
        Self::new(PolicyType::Insecure).with_protection(TlsProtection::none())
    }

    /// The descriptor synthesized for the `TRUST_FIRST_CERTIFICATE` reference.
    ///
    /// Carries no protection and no data: there is nothing to validate
    /// against until a certificate has been presented.
    #[must_use]
    pub fn trust_first_certificate() -> Self {
        Self::new(PolicyType::TrustFirstCertificate)
    }

    /// Sets the protection triple.
    #[must_use]
    pub fn with_protection(mut self, protection: TlsProtection) -> Self {
        self.protection = Some(protection);
        self
    }

    /// Appends encoded data items.
    #[must_use]
    pub fn with_data<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.extend(items.into_iter().map(Into::into));
        self
    }

    /// Sets a meta entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Appends permitted protocol versions.
    #[must_use]
    pub fn with_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols.extend(protocols.into_iter().map(Into::into));
        self
    }

    /// Returns a meta value, if present.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Determines the effective policy type.
    ///
    /// An explicit tag wins, even one outside the built-in set. Without one,
    /// any protection flag set to false makes the policy `INSECURE`.
    /// Otherwise the type is indeterminate.
    #[must_use]
    pub fn classify(&self) -> Option<PolicyTag> {
        if let Some(tag) = &self.policy_type {
            return Some(tag.clone());
        }
        match self.protection {
            Some(protection) if !protection.is_full() => Some(PolicyType::Insecure.into()),
            _ => None,
        }
    }

    /// Short label for logs and error messages.
    #[must_use]
    pub fn type_label(&self) -> &str {
        match &self.policy_type {
            Some(tag) => tag.as_str(),
            None => match self.protection {
                Some(protection) if !protection.is_full() => INSECURE,
                _ => "untyped",
            },
        }
    }
}
