//! In-memory storage backend.
//!
//! This module provides thread-safe in-memory implementations of the storage traits.
//! It is intended for embedded usage, tests, and as a reference implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::choice::TlsPolicyChoice;
use crate::record::{TlsPolicyId, TlsPolicyRecord};
use crate::storage::traits::{
    HostPolicyStore, PolicyStores, StorageError, TlsPolicyStore, VendorPolicyStore,
};
use crate::subject::HostVendor;

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

fn normalize_key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

/// Thread-safe in-memory policy record store.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    records: RwLock<HashMap<TlsPolicyId, TlsPolicyRecord>>,
}

impl InMemoryPolicyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns error if the ID already exists.
    pub fn insert(&self, record: TlsPolicyRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("policy.insert"))?;
        if records.contains_key(&record.id) {
            return Err(StorageError::DuplicateKey(record.id.to_string()));
        }
        records.insert(record.id, record);
        Ok(())
    }

    /// Delete a record by ID. Returns error if not found.
    pub fn delete(&self, id: TlsPolicyId) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("policy.delete"))?;
        records
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::PolicyNotFound(id))
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("policy.len"))?;
        Ok(records.len())
    }
}

impl TlsPolicyStore for InMemoryPolicyStore {
    fn find_by_id(&self, id: TlsPolicyId) -> Result<Option<TlsPolicyRecord>, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("policy.find_by_id"))?;
        Ok(records.get(&id).cloned())
    }
}

/// Thread-safe in-memory per-host associations, keyed by normalized address.
#[derive(Debug, Default)]
pub struct InMemoryHostPolicyStore {
    by_address: RwLock<HashMap<String, TlsPolicyChoice>>,
}

impl InMemoryHostPolicyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a choice with a host address, replacing any previous one.
    pub fn assign(&self, address: &str, choice: TlsPolicyChoice) -> Result<(), StorageError> {
        let mut by_address = self
            .by_address
            .write()
            .map_err(|_| lock_err("host.assign"))?;
        by_address.insert(normalize_key(address), choice);
        Ok(())
    }

    /// Remove the association for a host address.
    pub fn unassign(&self, address: &str) -> Result<Option<TlsPolicyChoice>, StorageError> {
        let mut by_address = self
            .by_address
            .write()
            .map_err(|_| lock_err("host.unassign"))?;
        Ok(by_address.remove(&normalize_key(address)))
    }
}

impl HostPolicyStore for InMemoryHostPolicyStore {
    fn find_by_address(&self, address: &str) -> Result<Option<TlsPolicyChoice>, StorageError> {
        let by_address = self
            .by_address
            .read()
            .map_err(|_| lock_err("host.find_by_address"))?;
        Ok(by_address.get(&normalize_key(address)).cloned())
    }
}

/// Thread-safe in-memory per-vendor associations.
#[derive(Debug, Default)]
pub struct InMemoryVendorPolicyStore {
    by_vendor: RwLock<HashMap<HostVendor, TlsPolicyChoice>>,
}

impl InMemoryVendorPolicyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a choice with a vendor, replacing any previous one.
    pub fn assign(&self, vendor: HostVendor, choice: TlsPolicyChoice) -> Result<(), StorageError> {
        let mut by_vendor = self
            .by_vendor
            .write()
            .map_err(|_| lock_err("vendor.assign"))?;
        by_vendor.insert(vendor, choice);
        Ok(())
    }
}

impl VendorPolicyStore for InMemoryVendorPolicyStore {
    fn find_by_vendor(&self, vendor: HostVendor) -> Result<Option<TlsPolicyChoice>, StorageError> {
        let by_vendor = self
            .by_vendor
            .read()
            .map_err(|_| lock_err("vendor.find_by_vendor"))?;
        Ok(by_vendor.get(&vendor).cloned())
    }
}

/// The three in-memory stores, shared behind `Arc`s.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStores {
    /// Stored policy records.
    pub policies: Arc<InMemoryPolicyStore>,
    /// Per-host associations.
    pub hosts: Arc<InMemoryHostPolicyStore>,
    /// Per-vendor associations.
    pub vendors: Arc<InMemoryVendorPolicyStore>,
}

impl InMemoryStores {
    /// Create empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store handles for an engine.
    #[must_use]
    pub fn policy_stores(&self) -> PolicyStores {
        PolicyStores::new(
            self.policies.clone(),
            self.hosts.clone(),
            self.vendors.clone(),
        )
    }
}
