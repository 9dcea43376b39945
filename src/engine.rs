//! Policy resolution engine.
//!
//! One resolution walks the provider chain for a subject. Each proposal is
//! resolved to a descriptor and classified; proposals that resolve to
//! nothing or to an indeterminate type are passed over. The first typed
//! descriptor is checked against the allow-list, which either accepts it or
//! ends the resolution. Nothing is cached: every call re-reads the stores.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::choice::TlsPolicyChoice;
use crate::config::TlsPolicyConfig;
use crate::creator::CreatorRegistry;
use crate::descriptor::{PolicyType, TlsPolicyDescriptor};
use crate::error::{ResolutionError, TlsPolicyResult};
use crate::gate::check_allowed;
use crate::policy::TlsPolicy;
use crate::provider::{ProviderChain, ProviderKind};
use crate::reader::PolicyReaders;
use crate::resolver::DescriptorResolver;
use crate::storage::PolicyStores;
use crate::subject::PolicySubject;

/// Which provider won, what it proposed and what that resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceReport {
    /// Winning provider.
    pub provider: ProviderKind,
    /// The choice as proposed.
    pub choice: TlsPolicyChoice,
    /// The resolved descriptor.
    pub descriptor: TlsPolicyDescriptor,
    /// Classified type; always allowed by the configuration used.
    pub policy_type: PolicyType,
}

/// Resolves and materializes TLS policies for subjects.
///
/// The engine holds only shared, read-only state and can be cloned freely
/// across threads.
#[derive(Debug, Clone)]
pub struct TlsPolicyEngine {
    stores: PolicyStores,
    readers: Arc<PolicyReaders>,
    creators: Arc<CreatorRegistry>,
}

impl TlsPolicyEngine {
    /// An engine over `stores` with the built-in readers and the global
    /// creator registry.
    #[must_use]
    pub fn new(stores: PolicyStores) -> Self {
        Self {
            stores,
            readers: Arc::new(PolicyReaders::with_builtin()),
            creators: CreatorRegistry::global(),
        }
    }

    /// Replaces the content decoders.
    #[must_use]
    pub fn with_readers(mut self, readers: PolicyReaders) -> Self {
        self.readers = Arc::new(readers);
        self
    }

    /// Replaces the creator registry.
    #[must_use]
    pub fn with_creators(mut self, creators: Arc<CreatorRegistry>) -> Self {
        self.creators = creators;
        self
    }

    /// The creator registry in use.
    #[must_use]
    pub fn creators(&self) -> &CreatorRegistry {
        &self.creators
    }

    /// The provider chain a resolution for `subject` walks.
    #[must_use]
    pub fn provider_chain<'a>(
        &'a self,
        subject: &'a dyn PolicySubject,
        config: &'a TlsPolicyConfig,
    ) -> ProviderChain<'a> {
        ProviderChain::for_subject(subject, config, &self.stores)
    }

    /// Finds the choice that applies to `subject`.
    ///
    /// Returns `Ok(None)` when no provider yields a typed descriptor.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::PolicyTypeNotAllowed`] when the first typed
    /// descriptor is not allowed or carries an unknown tag, [`ResolutionError::Storage`] when a
    /// provider lookup fails.
    pub fn resolve_policy_with_report(
        &self,
        subject: &dyn PolicySubject,
        config: &TlsPolicyConfig,
    ) -> TlsPolicyResult<Option<ChoiceReport>> {
        let address = subject.host_descriptor().internet_address;
        let resolver = DescriptorResolver::new(self.stores.policies.as_ref(), &self.readers);
        let chain = self.provider_chain(subject, config);

        for candidate in chain.candidates() {
            let candidate = candidate?;
            let Some(descriptor) = resolver.resolve(&candidate.choice) else {
                debug!(
                    provider = %candidate.provider,
                    %address,
                    "TLS policy choice resolved to nothing"
                );
                continue;
            };
            let Some(tag) = descriptor.classify() else {
                debug!(
                    provider = %candidate.provider,
                    %address,
                    "TLS policy type is indeterminate"
                );
                continue;
            };
            let policy_type = check_allowed(&tag, config.allowed_policy_types(), &address)?;
            debug!(
                provider = %candidate.provider,
                %policy_type,
                %address,
                "TLS policy choice selected"
            );
            return Ok(Some(ChoiceReport {
                provider: candidate.provider,
                choice: candidate.choice,
                descriptor,
                policy_type,
            }));
        }
        debug!(%address, "No TLS policy choice applies");
        Ok(None)
    }

    /// Resolves and builds the policy for `subject`.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::NotFound`] when nothing applies, plus every error of
    /// [`Self::resolve_policy_with_report`] and [`Self::create`].
    pub fn resolve_policy(
        &self,
        subject: &dyn PolicySubject,
        config: &TlsPolicyConfig,
    ) -> TlsPolicyResult<Arc<dyn TlsPolicy>> {
        let report = self
            .resolve_policy_with_report(subject, config)?
            .ok_or_else(|| ResolutionError::NotFound {
                address: subject.host_descriptor().internet_address,
            })?;
        self.create(&report.descriptor)
    }

    /// Builds the policy for an already resolved descriptor.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::DescriptorInvalid`] or [`ResolutionError::Unsupported`].
    pub fn create(&self, descriptor: &TlsPolicyDescriptor) -> TlsPolicyResult<Arc<dyn TlsPolicy>> {
        Ok(self.creators.create(descriptor)?)
    }
}
