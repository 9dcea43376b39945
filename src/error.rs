//! Error types for TLS policy resolution.
//!
//! All errors are strongly typed using thiserror so callers can pattern
//! match on the exact reason a policy could not be resolved or built.

use std::path::PathBuf;

use thiserror::Error;

use crate::descriptor::{PolicyTag, PolicyType, TlsPolicyDescriptor};
use crate::provider::ProviderKind;
use crate::storage::StorageError;

/// Validation errors raised while checking policy data and inputs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unknown TLS policy type '{tag}'")]
    UnknownPolicyType {
        tag: String,
    },

    #[error("Unsupported TLS protocol version '{protocol}'")]
    UnknownProtocol {
        protocol: String,
    },

    #[error("Unsupported digest algorithm '{algorithm}'")]
    UnsupportedDigestAlgorithm {
        algorithm: String,
    },

    #[error("Cannot infer a digest algorithm for a {length}-byte digest")]
    UnknownDigestLength {
        length: usize,
    },

    #[error("Digest {index} has {actual} bytes, expected {expected} for {algorithm}")]
    DigestLengthMismatch {
        index: usize,
        algorithm: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported data encoding '{encoding}'")]
    UnknownEncoding {
        encoding: String,
    },

    #[error("Policy data item {index} is not valid {encoding}")]
    InvalidEncoding {
        index: usize,
        encoding: &'static str,
    },

    #[error("A '{policy_type}' policy requires at least one data item")]
    MissingPolicyData {
        policy_type: PolicyType,
    },

    #[error("Policy data item {index} is not a valid certificate: {reason}")]
    InvalidCertificate {
        index: usize,
        reason: String,
    },

    #[error("Policy data item {index} is not a valid public key: {reason}")]
    InvalidPublicKey {
        index: usize,
        reason: String,
    },

    #[error("Invalid TLS policy subject: {reason}")]
    InvalidSubject {
        reason: String,
    },
}

/// Errors that end a policy resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No TLS policy found for host {address}")]
    NotFound {
        address: String,
    },

    #[error("TLS policy type {policy_type} is not allowed for host {address}")]
    PolicyTypeNotAllowed {
        policy_type: PolicyTag,
        address: String,
    },

    #[error("Invalid TLS policy descriptor ({}): {source}", .descriptor.type_label())]
    DescriptorInvalid {
        descriptor: Box<TlsPolicyDescriptor>,
        #[source]
        source: ValidationError,
    },

    #[error("Unsupported TLS policy choice ({policy_type})")]
    Unsupported {
        policy_type: String,
    },

    #[error("Unsupported TLS policy subject type '{kind}'")]
    UnsupportedSubject {
        kind: String,
    },

    #[error("{provider} policy provider lookup failed: {source}")]
    Storage {
        provider: ProviderKind,
        #[source]
        source: StorageError,
    },
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue {
        key: String,
        reason: String,
    },
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum TlsPolicyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl TlsPolicyError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a resolution error.
    #[must_use]
    pub const fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if no TLS policy applies to the subject.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Resolution(ResolutionError::NotFound { .. }))
    }

    /// Returns true if the resolved policy type was rejected by the allow-list.
    #[must_use]
    pub const fn is_not_allowed(&self) -> bool {
        matches!(
            self,
            Self::Resolution(ResolutionError::PolicyTypeNotAllowed { .. })
        )
    }

    /// Returns true if this error is worth retrying.
    ///
    /// Resolution outcomes are deterministic functions of configuration and
    /// stored data, so only store connectivity failures qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) | Self::Resolution(ResolutionError::Storage { source: e, .. }) => {
                matches!(e, StorageError::ConnectionError(_))
            }
            _ => false,
        }
    }
}

/// Result type alias for TLS policy operations.
pub type TlsPolicyResult<T> = Result<T, TlsPolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_address() {
        let err = ResolutionError::NotFound {
            address: "10.1.2.3".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("10.1.2.3"));
        assert!(msg.contains("No TLS policy"));
    }

    #[test]
    fn test_not_allowed_names_type_and_address() {
        let err = ResolutionError::PolicyTypeNotAllowed {
            policy_type: PolicyType::CertificateDigest.into(),
            address: "host1.example.com".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("certificate-digest"));
        assert!(msg.contains("host1.example.com"));
    }

    #[test]
    fn test_descriptor_invalid_names_type() {
        let err = ResolutionError::DescriptorInvalid {
            descriptor: Box::new(TlsPolicyDescriptor::new(PolicyType::PublicKey)),
            source: ValidationError::MissingPolicyData {
                policy_type: PolicyType::PublicKey,
            },
        };
        let msg = format!("{err}");
        assert!(msg.contains("public-key"));
        assert!(msg.contains("at least one data item"));
    }

    #[test]
    fn test_digest_length_mismatch() {
        let err = ValidationError::DigestLengthMismatch {
            index: 2,
            algorithm: "SHA-256",
            expected: 32,
            actual: 20,
        };
        let msg = format!("{err}");
        assert!(msg.contains("SHA-256"));
        assert!(msg.contains("32"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn test_top_level_from_resolution() {
        let err: TlsPolicyError = ResolutionError::NotFound {
            address: "h".to_string(),
        }
        .into();
        assert!(err.is_resolution());
        assert!(err.is_not_found());
        assert!(!err.is_not_allowed());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_top_level_internal() {
        let err = TlsPolicyError::internal("unexpected state");
        assert!(!err.is_validation());
        assert!(!err.is_retryable());
        assert!(format!("{err}").contains("unexpected state"));
    }

    #[test]
    fn test_retryable_only_for_connection_failures() {
        let err1: TlsPolicyError = StorageError::ConnectionError("refused".to_string()).into();
        assert!(err1.is_retryable());

        let err2: TlsPolicyError = ResolutionError::Storage {
            provider: ProviderKind::StoredHost,
            source: StorageError::ConnectionError("refused".to_string()),
        }
        .into();
        assert!(err2.is_retryable());

        let err3: TlsPolicyError = StorageError::BackendError("bad".to_string()).into();
        assert!(!err3.is_retryable());

        let err4: TlsPolicyError = ValidationError::UnknownPolicyType {
            tag: "x".to_string(),
        }
        .into();
        assert!(err4.is_validation());
        assert!(!err4.is_retryable());
    }
}
