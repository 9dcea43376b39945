//! Policy providers and the ordered chain that consults them.
//!
//! Providers are consulted in a fixed, security-meaningful order:
//!
//! 1. **Global** - platform-wide override; beats everything.
//! 2. **Object** - the choice carried by the subject itself.
//! 3. **Stored host** - the choice persisted for the subject's address.
//! 4. **Stored vendor** - the choice persisted for the subject's vendor.
//! 5. **Default** - the platform fallback.
//!
//! The chain is lazy: a provider is only asked once every provider before
//! it has been passed over.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::choice::TlsPolicyChoice;
use crate::config::TlsPolicyConfig;
use crate::error::ResolutionError;
use crate::storage::{HostPolicyStore, PolicyStores, StorageError, VendorPolicyStore};
use crate::subject::{HostDescriptor, PolicySubject, VendorDescriptor};

/// Identifies which provider proposed a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Platform-wide override.
    Global,
    /// Choice embedded in the subject.
    Object,
    /// Choice stored for the subject's address.
    StoredHost,
    /// Choice stored for the subject's vendor.
    StoredVendor,
    /// Platform fallback.
    Default,
}

impl ProviderKind {
    /// Provider kinds in consultation order.
    pub const ORDER: [Self; 5] = [
        Self::Global,
        Self::Object,
        Self::StoredHost,
        Self::StoredVendor,
        Self::Default,
    ];

    /// Returns the snake_case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Object => "object",
            Self::StoredHost => "stored_host",
            Self::StoredVendor => "stored_vendor",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proposes a candidate choice for one subject.
pub trait TlsPolicyProvider {
    /// Which slot of the chain this provider fills.
    fn kind(&self) -> ProviderKind;

    /// The proposed choice, or `None` to abstain.
    fn tls_policy_choice(&self) -> Result<Option<TlsPolicyChoice>, StorageError>;
}

/// Proposes the configured global choice.
#[derive(Debug, Clone, Copy)]
pub struct GlobalTlsPolicyProvider<'a> {
    config: &'a TlsPolicyConfig,
}

impl<'a> GlobalTlsPolicyProvider<'a> {
    /// Reads from `config`.
    pub fn new(config: &'a TlsPolicyConfig) -> Self {
        Self { config }
    }
}

impl TlsPolicyProvider for GlobalTlsPolicyProvider<'_> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Global
    }

    fn tls_policy_choice(&self) -> Result<Option<TlsPolicyChoice>, StorageError> {
        Ok(self.config.global_policy().cloned())
    }
}

/// Proposes the choice embedded in the subject.
#[derive(Clone, Copy)]
pub struct ObjectTlsPolicyProvider<'a> {
    subject: &'a dyn PolicySubject,
}

impl<'a> ObjectTlsPolicyProvider<'a> {
    /// Reads from `subject`.
    pub fn new(subject: &'a dyn PolicySubject) -> Self {
        Self { subject }
    }
}

impl TlsPolicyProvider for ObjectTlsPolicyProvider<'_> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Object
    }

    fn tls_policy_choice(&self) -> Result<Option<TlsPolicyChoice>, StorageError> {
        Ok(self.subject.object_choice())
    }
}

/// Proposes the choice stored for the subject's address.
#[derive(Clone)]
pub struct StoredHostTlsPolicyProvider<'a> {
    store: &'a dyn HostPolicyStore,
    host: HostDescriptor,
}

impl<'a> StoredHostTlsPolicyProvider<'a> {
    /// Looks up `host` in `store`.
    pub fn new(store: &'a dyn HostPolicyStore, host: HostDescriptor) -> Self {
        Self { store, host }
    }
}

impl TlsPolicyProvider for StoredHostTlsPolicyProvider<'_> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::StoredHost
    }

    fn tls_policy_choice(&self) -> Result<Option<TlsPolicyChoice>, StorageError> {
        self.store.find_by_address(&self.host.internet_address)
    }
}

/// Proposes the choice stored for the subject's vendor.
#[derive(Clone, Copy)]
pub struct StoredVendorTlsPolicyProvider<'a> {
    store: &'a dyn VendorPolicyStore,
    vendor: Option<VendorDescriptor>,
}

impl<'a> StoredVendorTlsPolicyProvider<'a> {
    /// Looks up `vendor` in `store`; abstains when the vendor is unknown.
    pub fn new(store: &'a dyn VendorPolicyStore, vendor: Option<VendorDescriptor>) -> Self {
        Self { store, vendor }
    }
}

impl TlsPolicyProvider for StoredVendorTlsPolicyProvider<'_> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::StoredVendor
    }

    fn tls_policy_choice(&self) -> Result<Option<TlsPolicyChoice>, StorageError> {
        match self.vendor {
            Some(v) => self.store.find_by_vendor(v.vendor),
            None => Ok(None),
        }
    }
}

/// Proposes the configured default choice.
#[derive(Debug, Clone, Copy)]
pub struct DefaultTlsPolicyProvider<'a> {
    config: &'a TlsPolicyConfig,
}

impl<'a> DefaultTlsPolicyProvider<'a> {
    /// Reads from `config`.
    pub fn new(config: &'a TlsPolicyConfig) -> Self {
        Self { config }
    }
}

impl TlsPolicyProvider for DefaultTlsPolicyProvider<'_> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Default
    }

    fn tls_policy_choice(&self) -> Result<Option<TlsPolicyChoice>, StorageError> {
        Ok(self.config.default_policy().cloned())
    }
}

/// A choice together with the provider that proposed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Proposing provider.
    pub provider: ProviderKind,
    /// Proposed choice (never empty).
    pub choice: TlsPolicyChoice,
}

/// Ordered providers for one subject.
pub struct ProviderChain<'a> {
    providers: Vec<Box<dyn TlsPolicyProvider + 'a>>,
}

impl<'a> ProviderChain<'a> {
    /// A chain over explicit providers, consulted in the given order.
    #[must_use]
    pub fn new(providers: Vec<Box<dyn TlsPolicyProvider + 'a>>) -> Self {
        Self { providers }
    }

    /// The standard five-provider chain for `subject`.
    #[must_use]
    pub fn for_subject(
        subject: &'a dyn PolicySubject,
        config: &'a TlsPolicyConfig,
        stores: &'a PolicyStores,
    ) -> Self {
        Self::new(vec![
            Box::new(GlobalTlsPolicyProvider::new(config)),
            Box::new(ObjectTlsPolicyProvider::new(subject)),
            Box::new(StoredHostTlsPolicyProvider::new(
                stores.hosts.as_ref(),
                subject.host_descriptor(),
            )),
            Box::new(StoredVendorTlsPolicyProvider::new(
                stores.vendors.as_ref(),
                subject.vendor_descriptor(),
            )),
            Box::new(DefaultTlsPolicyProvider::new(config)),
        ])
    }

    /// Provider kinds in consultation order.
    pub fn kinds(&self) -> impl Iterator<Item = ProviderKind> + '_ {
        self.providers.iter().map(|p| p.kind())
    }

    /// Lazily yields every non-empty proposal in order.
    ///
    /// A provider whose lookup fails yields a fatal [`ResolutionError::Storage`];
    /// callers should stop at the first error.
    pub fn candidates(&self) -> impl Iterator<Item = Result<Candidate, ResolutionError>> + '_ {
        self.providers.iter().filter_map(|p| {
            let provider = p.kind();
            match p.tls_policy_choice() {
                Ok(Some(choice)) if !choice.is_empty() => {
                    debug!(%provider, "TLS policy provider proposed a choice");
                    Some(Ok(Candidate { provider, choice }))
                }
                Ok(_) => {
                    debug!(%provider, "TLS policy provider abstained");
                    None
                }
                Err(source) => {
                    error!(%provider, error = %source, "TLS policy provider lookup failed");
                    Some(Err(ResolutionError::Storage { provider, source }))
                }
            }
        })
    }

    /// The first non-empty proposal, if any.
    pub fn first_choice(&self) -> Result<Option<Candidate>, ResolutionError> {
        self.candidates().next().transpose()
    }
}

impl fmt::Debug for ProviderChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
