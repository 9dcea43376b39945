//! Deployment configuration for policy resolution.
//!
//! The configuration is an explicit input to every resolution call: the
//! allow-set of policy types, plus the optional global and default choices.
//! It is read from JSON and may be overridden from the environment.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::choice::{ChoiceSetting, TlsPolicyChoice};
use crate::descriptor::PolicyType;
use crate::error::ConfigError;

/// Environment variable overriding the allow-set (comma separated tags).
pub const ENV_ALLOW: &str = "TLS_POLICY_ALLOW";

/// Environment variable overriding the global policy reference.
pub const ENV_GLOBAL: &str = "TLS_POLICY_GLOBAL";

/// Environment variable overriding the default policy reference.
pub const ENV_DEFAULT: &str = "TLS_POLICY_DEFAULT";

/// Policy types a deployment permits.
///
/// Validation / normalization rules:
/// - An empty set is rejected.
/// - Duplicate tags are ignored.
/// - Unknown tags are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowedPolicyTypes(BTreeSet<PolicyType>);

impl AllowedPolicyTypes {
    /// Creates an allow-set from policy types.
    pub fn new(types: impl IntoIterator<Item = PolicyType>) -> Result<Self, ConfigError> {
        let set: BTreeSet<PolicyType> = types.into_iter().collect();
        if set.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "allowed_policy_types".to_string(),
                reason: "at least one policy type must be allowed".to_string(),
            });
        }
        Ok(Self(set))
    }

    /// Every policy type, insecure ones included.
    #[must_use]
    pub fn all() -> Self {
        Self(PolicyType::ALL.into_iter().collect())
    }

    /// Parses a comma separated list such as `certificate,public-key`.
    pub fn parse_csv(raw: &str) -> Result<Self, ConfigError> {
        Self::from_tags(raw.split(',').map(str::trim).filter(|t| !t.is_empty()))
    }

    fn from_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        let types = tags
            .into_iter()
            .map(|tag| {
                tag.parse::<PolicyType>()
                    .map_err(|e| ConfigError::InvalidValue {
                        key: "allowed_policy_types".to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(types)
    }

    /// Returns true when `policy_type` is permitted.
    #[must_use]
    pub fn contains(&self, policy_type: PolicyType) -> bool {
        self.0.contains(&policy_type)
    }

    /// Iterates the permitted types in tag order.
    pub fn iter(&self) -> impl Iterator<Item = PolicyType> + '_ {
        self.0.iter().copied()
    }
}

impl Default for AllowedPolicyTypes {
    /// The authenticating types only; insecure types must be opted into.
    fn default() -> Self {
        Self(
            PolicyType::ALL
                .into_iter()
                .filter(PolicyType::authenticates)
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for AllowedPolicyTypes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Csv(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::List(tags) => Self::from_tags(tags.iter().map(String::as_str)),
            Raw::Csv(raw) => Self::parse_csv(&raw),
        }
        .map_err(serde::de::Error::custom)
    }
}

fn choice_or_reference<'de, D>(deserializer: D) -> Result<Option<TlsPolicyChoice>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ChoiceSetting>::deserialize(deserializer)?.and_then(ChoiceSetting::into_choice))
}

/// Resolution settings for a deployment.
///
/// # Examples
///
/// ```
/// use tls_policy::{PolicyType, TlsPolicyConfig};
///
/// let config = TlsPolicyConfig::from_json_str(
///     r#"{"allowed_policy_types": "certificate,INSECURE", "default_policy": "INSECURE"}"#,
/// )
/// .unwrap();
/// assert!(config.allowed_policy_types().contains(PolicyType::Insecure));
/// assert!(config.default_policy().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsPolicyConfig {
    #[serde(default)]
    allowed_policy_types: AllowedPolicyTypes,

    #[serde(
        default,
        deserialize_with = "choice_or_reference",
        skip_serializing_if = "Option::is_none"
    )]
    global_policy: Option<TlsPolicyChoice>,

    #[serde(
        default,
        deserialize_with = "choice_or_reference",
        skip_serializing_if = "Option::is_none"
    )]
    default_policy: Option<TlsPolicyChoice>,
}

impl TlsPolicyConfig {
    /// Creates a configuration with the default allow-set and no choices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the allow-set.
    #[must_use]
    pub fn with_allowed_policy_types(mut self, allowed: AllowedPolicyTypes) -> Self {
        self.allowed_policy_types = allowed;
        self
    }

    /// Sets the platform-wide override.
    #[must_use]
    pub fn with_global_policy(mut self, choice: TlsPolicyChoice) -> Self {
        self.global_policy = Some(choice);
        self
    }

    /// Sets the platform fallback.
    #[must_use]
    pub fn with_default_policy(mut self, choice: TlsPolicyChoice) -> Self {
        self.default_policy = Some(choice);
        self
    }

    /// Permitted policy types.
    #[must_use]
    pub fn allowed_policy_types(&self) -> &AllowedPolicyTypes {
        &self.allowed_policy_types
    }

    /// Platform-wide override, if configured.
    #[must_use]
    pub fn global_policy(&self) -> Option<&TlsPolicyChoice> {
        self.global_policy.as_ref()
    }

    /// Platform fallback, if configured.
    #[must_use]
    pub fn default_policy(&self) -> Option<&TlsPolicyChoice> {
        self.default_policy.as_ref()
    }

    /// Parses a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Applies overrides from `lookup`, keyed by the `TLS_POLICY_*` names.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = get(ENV_ALLOW) {
            self.allowed_policy_types =
                AllowedPolicyTypes::parse_csv(&raw).map_err(|e| match e {
                    ConfigError::InvalidValue { reason, .. } => ConfigError::InvalidValue {
                        key: ENV_ALLOW.to_string(),
                        reason,
                    },
                    other => other,
                })?;
        }
        if let Some(reference) = get(ENV_GLOBAL) {
            self.global_policy = Some(TlsPolicyChoice::from_reference(reference));
        }
        if let Some(reference) = get(ENV_DEFAULT) {
            self.default_policy = Some(TlsPolicyChoice::from_reference(reference));
        }
        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}
