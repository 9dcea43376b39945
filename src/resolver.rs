//! Turns a policy choice into a concrete descriptor.
//!
//! Resolution order:
//! 1. An inline descriptor is returned unchanged.
//! 2. A reference string is checked against the sentinels first, then parsed
//!    as a stored policy id, looked up and decoded.
//! 3. Anything else resolves to nothing.
//!
//! Failures here are soft: [`DescriptorResolver::resolve`] logs them and
//! yields `None` so the caller can move on to the next candidate.

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::choice::{PolicyReference, TlsPolicyChoice};
use crate::descriptor::TlsPolicyDescriptor;
use crate::reader::{DecodeError, PolicyReaders};
use crate::record::TlsPolicyId;
use crate::storage::{StorageError, TlsPolicyStore};

/// Why a choice did not resolve to a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorResolutionError {
    /// The choice carries neither a descriptor nor a reference.
    #[error("Policy choice is empty")]
    EmptyChoice,

    /// The reference is neither a sentinel nor a UUID.
    #[error("Malformed TLS policy id '{0}'")]
    MalformedId(String),

    /// No stored policy has this id.
    #[error("Stored TLS policy {0} not found")]
    NotFound(TlsPolicyId),

    /// The store lookup failed.
    #[error("Stored TLS policy {id} lookup failed: {source}")]
    Store {
        /// Policy looked up.
        id: TlsPolicyId,
        /// Underlying failure.
        #[source]
        source: StorageError,
    },

    /// The stored content could not be decoded.
    #[error("Stored TLS policy {id} cannot be decoded: {source}")]
    Decode {
        /// Policy decoded.
        id: TlsPolicyId,
        /// Underlying failure.
        #[source]
        source: DecodeError,
    },
}

/// Resolves choices against a policy store.
#[derive(Clone, Copy)]
pub struct DescriptorResolver<'a> {
    store: &'a dyn TlsPolicyStore,
    readers: &'a PolicyReaders,
}

impl<'a> DescriptorResolver<'a> {
    /// Creates a resolver reading from `store` and decoding with `readers`.
    pub fn new(store: &'a dyn TlsPolicyStore, readers: &'a PolicyReaders) -> Self {
        Self { store, readers }
    }

    /// Resolves a choice, logging and swallowing failures.
    #[must_use]
    pub fn resolve(&self, choice: &TlsPolicyChoice) -> Option<TlsPolicyDescriptor> {
        match self.try_resolve(choice) {
            Ok(descriptor) => Some(descriptor),
            Err(DescriptorResolutionError::EmptyChoice) => None,
            Err(e @ DescriptorResolutionError::MalformedId(_)) => {
                warn!(error = %e, "Cannot resolve TLS policy reference");
                None
            }
            Err(DescriptorResolutionError::NotFound(id)) => {
                warn!(policy_id = %id, "Referenced TLS policy does not exist");
                None
            }
            Err(DescriptorResolutionError::Store { id, source }) => {
                error!(policy_id = %id, error = %source, "TLS policy store lookup failed");
                None
            }
            Err(DescriptorResolutionError::Decode { id, source }) => {
                warn!(policy_id = %id, error = %source, "Cannot decode stored TLS policy");
                None
            }
        }
    }

    /// Resolves a choice, reporting why it produced nothing.
    pub fn try_resolve(
        &self,
        choice: &TlsPolicyChoice,
    ) -> Result<TlsPolicyDescriptor, DescriptorResolutionError> {
        if let Some(descriptor) = &choice.descriptor {
            return Ok(descriptor.clone());
        }
        match choice.reference() {
            None => Err(DescriptorResolutionError::EmptyChoice),
            Some(PolicyReference::Insecure) => Ok(TlsPolicyDescriptor::insecure()),
            Some(PolicyReference::TrustFirstCertificate) => {
                Ok(TlsPolicyDescriptor::trust_first_certificate())
            }
            Some(PolicyReference::Malformed(raw)) => {
                Err(DescriptorResolutionError::MalformedId(raw))
            }
            Some(PolicyReference::Stored(id)) => self.load(id),
        }
    }

    fn load(&self, id: TlsPolicyId) -> Result<TlsPolicyDescriptor, DescriptorResolutionError> {
        let record = self
            .store
            .find_by_id(id)
            .map_err(|source| DescriptorResolutionError::Store { id, source })?
            .ok_or(DescriptorResolutionError::NotFound(id))?;
        debug!(
            policy_id = %id,
            content_type = %record.content_type,
            private = record.private,
            "Loaded stored TLS policy"
        );
        self.readers
            .decode(&record)
            .map_err(|source| DescriptorResolutionError::Decode { id, source })
    }
}

impl std::fmt::Debug for DescriptorResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorResolver")
            .field("readers", self.readers)
            .finish_non_exhaustive()
    }
}
