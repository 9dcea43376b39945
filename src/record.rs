//! Stored TLS policy records.
//!
//! A record is the persisted form of a shared or private policy: an
//! identifier, a content-type tag and opaque serialized content. Only
//! readers ever interpret the content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::TlsPolicyDescriptor;
use crate::reader::APPLICATION_JSON;

/// Identifier of a stored TLS policy.
///
/// # Examples
///
/// ```
/// use tls_policy::TlsPolicyId;
///
/// let id = TlsPolicyId::new();
/// assert_eq!(id.to_string().parse::<TlsPolicyId>().unwrap(), id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TlsPolicyId(Uuid);

impl TlsPolicyId {
    /// Creates a new random policy ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a policy ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TlsPolicyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TlsPolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TlsPolicyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for TlsPolicyId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A persisted TLS policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsPolicyRecord {
    /// Stable identifier, referenced from policy choices.
    pub id: TlsPolicyId,
    /// Human readable name.
    pub name: String,
    /// Private policies belong to exactly one host; shared ones to many.
    #[serde(default)]
    pub private: bool,
    /// Media type of `content`.
    pub content_type: String,
    /// Serialized descriptor.
    #[serde(default)]
    pub content: Vec<u8>,
    /// Optional operator note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TlsPolicyRecord {
    /// Creates a record holding raw content of the given media type.
    #[must_use]
    pub fn new(
        id: TlsPolicyId,
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            private: false,
            content_type: content_type.into(),
            content,
            comment: None,
        }
    }

    /// Creates a shared record holding `descriptor` serialized as JSON.
    pub fn json(
        id: TlsPolicyId,
        name: impl Into<String>,
        descriptor: &TlsPolicyDescriptor,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            id,
            name,
            APPLICATION_JSON,
            serde_json::to_vec(descriptor)?,
        ))
    }

    /// Marks the record as private to a single host.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }
}
