//! Abstract storage traits for policy lookups.
//!
//! The engine only ever reads: stored policy records by id, and the choices
//! associated with a host address or a vendor. Backends own their own
//! locking and connection handling and must tolerate concurrent callers.

use std::sync::Arc;

use thiserror::Error;

use crate::choice::TlsPolicyChoice;
use crate::record::{TlsPolicyId, TlsPolicyRecord};
use crate::subject::HostVendor;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Policy not found.
    #[error("TLS policy not found: {0}")]
    PolicyNotFound(TlsPolicyId),

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Connection failed.
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Lookup of stored policy records.
pub trait TlsPolicyStore: Send + Sync {
    /// Get a policy record by ID.
    fn find_by_id(&self, id: TlsPolicyId) -> Result<Option<TlsPolicyRecord>, StorageError>;
}

/// Lookup of the policy choice persisted for a host.
pub trait HostPolicyStore: Send + Sync {
    /// Find the choice associated with a host address (case-insensitive).
    fn find_by_address(&self, address: &str) -> Result<Option<TlsPolicyChoice>, StorageError>;
}

/// Lookup of the policy choice persisted for a vendor.
pub trait VendorPolicyStore: Send + Sync {
    /// Find the choice associated with a vendor.
    fn find_by_vendor(&self, vendor: HostVendor) -> Result<Option<TlsPolicyChoice>, StorageError>;
}

/// The store handles one resolution reads from.
#[derive(Clone)]
pub struct PolicyStores {
    /// Stored policy records.
    pub policies: Arc<dyn TlsPolicyStore>,
    /// Per-host associations.
    pub hosts: Arc<dyn HostPolicyStore>,
    /// Per-vendor associations.
    pub vendors: Arc<dyn VendorPolicyStore>,
}

impl PolicyStores {
    /// Bundles three store handles.
    pub fn new(
        policies: Arc<dyn TlsPolicyStore>,
        hosts: Arc<dyn HostPolicyStore>,
        vendors: Arc<dyn VendorPolicyStore>,
    ) -> Self {
        Self {
            policies,
            hosts,
            vendors,
        }
    }
}

impl std::fmt::Debug for PolicyStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStores").finish_non_exhaustive()
    }
}
