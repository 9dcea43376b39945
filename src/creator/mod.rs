//! Creators turn validated descriptors into executable policies.
//!
//! The [`CreatorRegistry`] asks each registered creator in order. A creator
//! either builds the policy, declares itself not applicable, or rejects the
//! descriptor as invalid; a rejection ends the search.

mod builtin;
mod payload;

use std::fmt;
use std::sync::{Arc, OnceLock};

use rustls::crypto::CryptoProvider;
use tracing::debug;

use crate::crypto_provider::default_crypto_provider;
use crate::descriptor::TlsPolicyDescriptor;
use crate::error::{ResolutionError, ValidationError};
use crate::policy::TlsPolicy;

pub use builtin::{
    CertificateCreator, CertificateDigestCreator, InsecureCreator, PublicKeyCreator,
    PublicKeyDigestCreator, TrustFirstCertificateCreator,
};

/// Outcome of asking one creator.
#[derive(Debug, Clone)]
pub enum Creation {
    /// The creator built a policy.
    Created(Arc<dyn TlsPolicy>),
    /// The descriptor is not for this creator.
    NotApplicable,
}

impl Creation {
    /// Wraps a freshly built policy.
    pub fn created(policy: impl TlsPolicy + 'static) -> Self {
        Self::Created(Arc::new(policy))
    }
}

/// Builds executable policies from descriptors.
pub trait TlsPolicyCreator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Builds a policy, or reports why the descriptor is invalid.
    fn create(&self, descriptor: &TlsPolicyDescriptor) -> Result<Creation, ValidationError>;
}

/// Ordered creators.
#[derive(Clone, Default)]
pub struct CreatorRegistry {
    creators: Vec<Arc<dyn TlsPolicyCreator>>,
}

impl CreatorRegistry {
    /// A registry with no creators.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in creators, verifying signatures with `provider`.
    #[must_use]
    pub fn with_builtin(provider: &Arc<CryptoProvider>) -> Self {
        let algs = provider.signature_verification_algorithms;
        let mut registry = Self::empty();
        registry.register(Arc::new(InsecureCreator));
        registry.register(Arc::new(TrustFirstCertificateCreator));
        registry.register(Arc::new(CertificateCreator::new(algs)));
        registry.register(Arc::new(CertificateDigestCreator));
        registry.register(Arc::new(PublicKeyCreator));
        registry.register(Arc::new(PublicKeyDigestCreator));
        registry
    }

    /// The built-in creators with the default crypto provider.
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_builtin(&default_crypto_provider())
    }

    /// The process-wide built-in registry, built on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<CreatorRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::builtin())))
    }

    /// Appends a creator; it is asked after every earlier one.
    pub fn register(&mut self, creator: Arc<dyn TlsPolicyCreator>) {
        self.creators.push(creator);
    }

    /// Creator names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.creators.iter().map(|c| c.name())
    }

    /// Builds the policy for `descriptor` with the first applicable creator.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::DescriptorInvalid`] when a creator rejects the
    /// descriptor, [`ResolutionError::Unsupported`] when no creator applies.
    pub fn create(
        &self,
        descriptor: &TlsPolicyDescriptor,
    ) -> Result<Arc<dyn TlsPolicy>, ResolutionError> {
        for creator in &self.creators {
            match creator.create(descriptor) {
                Ok(Creation::Created(policy)) => {
                    debug!(creator = creator.name(), "TLS policy created");
                    return Ok(policy);
                }
                Ok(Creation::NotApplicable) => {}
                Err(source) => {
                    debug!(
                        creator = creator.name(),
                        error = %source,
                        "TLS policy descriptor rejected"
                    );
                    return Err(ResolutionError::DescriptorInvalid {
                        descriptor: Box::new(descriptor.clone()),
                        source,
                    });
                }
            }
        }
        Err(ResolutionError::Unsupported {
            policy_type: descriptor.type_label().to_string(),
        })
    }
}

impl fmt::Debug for CreatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
