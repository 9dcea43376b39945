//! JSON snapshots of the in-memory stores.
//!
//! A snapshot seeds the stores from a single document:
//!
//! ```json
//! {
//!   "policies": [
//!     {"id": "…", "name": "vcenter", "content": {"policy_type": "public-key", "data": ["…"]}}
//!   ],
//!   "hosts": {"host1.example.com": "…policy id…"},
//!   "vendors": {"VMWARE": "TRUST_FIRST_CERTIFICATE"}
//! }
//! ```
//!
//! Policy `content` may be a JSON value (stored re-serialized) or a string
//! (stored verbatim, for non-JSON content types).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::choice::ChoiceSetting;
use crate::reader::APPLICATION_JSON;
use crate::record::{TlsPolicyId, TlsPolicyRecord};
use crate::storage::memory::InMemoryStores;
use crate::storage::traits::StorageError;
use crate::subject::HostVendor;

fn default_content_type() -> String {
    APPLICATION_JSON.to_string()
}

#[derive(Debug, Deserialize)]
struct SnapshotPolicy {
    id: TlsPolicyId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    private: bool,
    #[serde(default = "default_content_type")]
    content_type: String,
    #[serde(default)]
    content: serde_json::Value,
    #[serde(default)]
    comment: Option<String>,
}

impl SnapshotPolicy {
    fn into_record(self) -> Result<TlsPolicyRecord, StorageError> {
        let content = match self.content {
            serde_json::Value::Null => Vec::new(),
            serde_json::Value::String(s) => s.into_bytes(),
            other => serde_json::to_vec(&other)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?,
        };
        let mut record = TlsPolicyRecord::new(self.id, self.name, self.content_type, content);
        record.private = self.private;
        record.comment = self.comment;
        Ok(record)
    }
}

/// Parsed snapshot document.
#[derive(Debug, Default, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    policies: Vec<SnapshotPolicy>,
    #[serde(default)]
    hosts: BTreeMap<String, ChoiceSetting>,
    #[serde(default)]
    vendors: BTreeMap<String, ChoiceSetting>,
}

impl StoreSnapshot {
    /// Parses a snapshot document.
    pub fn from_json_str(json: &str) -> Result<Self, StorageError> {
        serde_json::from_str(json).map_err(|e| StorageError::SerializationError(e.to_string()))
    }
}

impl InMemoryStores {
    /// Builds stores populated from `snapshot`.
    ///
    /// Duplicate policy ids and unknown vendor names are rejected.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StorageError> {
        let stores = Self::new();
        for policy in snapshot.policies {
            stores.policies.insert(policy.into_record()?)?;
        }
        for (address, setting) in snapshot.hosts {
            if let Some(choice) = setting.into_choice() {
                stores.hosts.assign(&address, choice)?;
            }
        }
        for (vendor, setting) in snapshot.vendors {
            let vendor = vendor
                .parse::<HostVendor>()
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            if let Some(choice) = setting.into_choice() {
                stores.vendors.assign(vendor, choice)?;
            }
        }
        Ok(stores)
    }

    /// Reads a snapshot file and builds stores from it.
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StorageError::BackendError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_snapshot(StoreSnapshot::from_json_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::{PolicyReference, TlsPolicyChoice};
    use crate::descriptor::{PolicyType, TlsPolicyDescriptor};
    use crate::storage::traits::{HostPolicyStore, TlsPolicyStore, VendorPolicyStore};

    const ID: &str = "0d8c6f0e-3a57-4e59-8a55-2b9c1f0e7d11";

    #[test]
    fn snapshot_populates_all_stores() {
        let json = format!(
            r#"{{
                "policies": [
                    {{"id": "{ID}", "name": "pinned", "private": true,
                      "content": {{"policy_type": "public-key", "data": ["AAAA"]}}}}
                ],
                "hosts": {{"Host1.example.com": "{ID}", "host2.example.com": ""}},
                "vendors": {{"vmware": "TRUST_FIRST_CERTIFICATE"}}
            }}"#
        );
        let stores = InMemoryStores::from_snapshot(StoreSnapshot::from_json_str(&json).unwrap())
            .unwrap();

        let id: TlsPolicyId = ID.parse().unwrap();
        let record = stores.policies.find_by_id(id).unwrap().unwrap();
        assert!(record.private);
        assert_eq!(record.content_type, APPLICATION_JSON);
        let d: TlsPolicyDescriptor = serde_json::from_slice(&record.content).unwrap();
        assert_eq!(d.policy_type, Some(PolicyType::PublicKey.into()));

        let host = stores
            .hosts
            .find_by_address("host1.example.com")
            .unwrap()
            .unwrap();
        assert_eq!(host.reference(), Some(PolicyReference::Stored(id)));
        assert_eq!(stores.hosts.find_by_address("host2.example.com").unwrap(), None);

        assert_eq!(
            stores.vendors.find_by_vendor(HostVendor::Vmware).unwrap(),
            Some(TlsPolicyChoice::trust_first_certificate())
        );
    }

    #[test]
    fn string_content_is_stored_verbatim() {
        let json = format!(
            r#"{{"policies": [{{"id": "{ID}", "content_type": "text/plain", "content": "raw"}}]}}"#
        );
        let stores = InMemoryStores::from_snapshot(StoreSnapshot::from_json_str(&json).unwrap())
            .unwrap();
        let record = stores.policies.find_by_id(ID.parse().unwrap()).unwrap().unwrap();
        assert_eq!(record.content, b"raw");
        assert_eq!(record.content_type, "text/plain");
    }

    #[test]
    fn unknown_vendor_and_duplicates_are_rejected() {
        let snapshot = StoreSnapshot::from_json_str(r#"{"vendors": {"ACME": "INSECURE"}}"#).unwrap();
        assert!(matches!(
            InMemoryStores::from_snapshot(snapshot),
            Err(StorageError::SerializationError(_))
        ));

        let json = format!(r#"{{"policies": [{{"id": "{ID}"}}, {{"id": "{ID}"}}]}}"#);
        let snapshot = StoreSnapshot::from_json_str(&json).unwrap();
        assert!(matches!(
            InMemoryStores::from_snapshot(snapshot),
            Err(StorageError::DuplicateKey(_))
        ));
    }

    #[test]
    fn malformed_document_is_serialization_error() {
        assert!(matches!(
            StoreSnapshot::from_json_str("{"),
            Err(StorageError::SerializationError(_))
        ));
    }
}
