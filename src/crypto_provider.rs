//! Provide access to the process-global default [`CryptoProvider`] if there
//! is one, otherwise the crate-wide default one.

use std::sync::Arc;

use rustls::crypto::CryptoProvider;

/// The process-global default [`CryptoProvider`] if one is installed,
/// otherwise the `ring` provider.
#[must_use]
pub fn default_crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider()))
}
