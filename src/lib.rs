//! # tls-policy - TLS trust policy resolution
//!
//! Decides which TLS trust policy governs the connection to a managed host,
//! and builds that policy as something a rustls client can enforce.
//!
//! ## Core Concepts
//!
//! - **Choice**: a candidate selection; an inline descriptor or a reference
//!   (a stored policy UUID or one of the `INSECURE` / `TRUST_FIRST_CERTIFICATE`
//!   sentinels)
//! - **Descriptor**: the concrete trust specification (type, protection,
//!   certificates, keys or digests)
//! - **Provider chain**: Global, Object, Stored host, Stored vendor, Default;
//!   the first provider yielding a typed descriptor wins
//! - **Allow-list**: the policy types a deployment accepts; a disallowed
//!   winner ends the resolution
//! - **Creator**: builds an executable [`TlsPolicy`] from a descriptor
//!
//! ## Usage
//!
//! ```rust
//! use tls_policy::{
//!     HostRegistration, InMemoryStores, PolicyType, ProviderKind, TlsPolicyChoice,
//!     TlsPolicyConfig, TlsPolicyDescriptor, TlsPolicyEngine,
//! };
//!
//! let stores = InMemoryStores::new();
//! let config = TlsPolicyConfig::new().with_default_policy(TlsPolicyChoice::from_descriptor(
//!     TlsPolicyDescriptor::new(PolicyType::CertificateDigest)
//!         .with_data(["576cbd50fd83a5e159409869db6e5e34bcf79c43cc0933b00b2d41cc84a4585e"]),
//! ));
//! let engine = TlsPolicyEngine::new(stores.policy_stores());
//!
//! let subject = HostRegistration::new("host1.example.com");
//! let report = engine.resolve_policy_with_report(&subject, &config)?.unwrap();
//! assert_eq!(report.provider, ProviderKind::Default);
//!
//! let policy = engine.resolve_policy(&subject, &config)?;
//! assert!(policy.is_secure());
//! # Ok::<(), tls_policy::TlsPolicyError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod choice;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod record;
pub mod subject;

// Lookup and resolution
pub mod engine;
pub mod gate;
pub mod provider;
pub mod reader;
pub mod resolver;
pub mod storage;

// Executable policies
pub mod creator;
pub mod crypto_provider;
pub mod policy;

#[cfg(test)]
mod testdata;

// Re-export primary types at crate root for convenience
pub use choice::{PolicyReference, TlsPolicyChoice};
pub use config::{AllowedPolicyTypes, TlsPolicyConfig};
pub use creator::{Creation, CreatorRegistry, TlsPolicyCreator};
pub use descriptor::{PolicyTag, PolicyType, TlsPolicyDescriptor, TlsProtection};
pub use engine::{ChoiceReport, TlsPolicyEngine};
pub use error::{
    ConfigError, ResolutionError, TlsPolicyError, TlsPolicyResult, ValidationError,
};
pub use policy::{client_config, DigestAlgorithm, TlsPolicy, TlsPolicyVerifier, TlsVersion};
pub use provider::{ProviderChain, ProviderKind, TlsPolicyProvider};
pub use reader::{JsonTlsPolicyReader, PolicyReaders, TlsPolicyReader};
pub use record::{TlsPolicyId, TlsPolicyRecord};
pub use resolver::DescriptorResolver;
pub use storage::{
    HostPolicyStore, InMemoryStores, PolicyStores, StorageError, StoreSnapshot, TlsPolicyStore,
    VendorPolicyStore,
};
pub use subject::{HostRegistration, HostVendor, ManagedHost, PolicySubject, TlsPolicySubject};
