//! Resolution subjects.
//!
//! A subject is the remote endpoint a policy is resolved for. Each supported
//! kind is a concrete type; [`TlsPolicySubject`] is the closed union the
//! engine accepts at its boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::choice::TlsPolicyChoice;
use crate::descriptor::TlsPolicyDescriptor;
use crate::error::{ResolutionError, TlsPolicyError, ValidationError};

/// Appliance vendors with vendor-wide stored policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HostVendor {
    /// Intel platform hosts.
    Intel,
    /// Citrix hypervisors.
    Citrix,
    /// VMware hypervisors and vCenter.
    Vmware,
    /// Microsoft hypervisors.
    Microsoft,
}

impl HostVendor {
    /// Every known vendor.
    pub const ALL: [Self; 4] = [Self::Intel, Self::Citrix, Self::Vmware, Self::Microsoft];

    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Intel => "INTEL",
            Self::Citrix => "CITRIX",
            Self::Vmware => "VMWARE",
            Self::Microsoft => "MICROSOFT",
        }
    }
}

impl fmt::Display for HostVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostVendor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::InvalidSubject {
                reason: format!("unknown vendor '{s}'"),
            })
    }
}

/// Identity of a subject for per-host lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostDescriptor {
    /// Hostname or IP address.
    pub internet_address: String,
}

/// Identity of a subject for per-vendor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VendorDescriptor {
    /// Appliance vendor.
    pub vendor: HostVendor,
}

/// Read access to the subject data providers need.
pub trait PolicySubject {
    /// Short kind name, used in logs and errors.
    fn kind(&self) -> &'static str;

    /// Address used for per-host lookups and diagnostics.
    fn host_descriptor(&self) -> HostDescriptor;

    /// Vendor used for per-vendor lookups, if known.
    fn vendor_descriptor(&self) -> Option<VendorDescriptor>;

    /// Choice embedded in the subject itself, if any.
    fn object_choice(&self) -> Option<TlsPolicyChoice>;
}

fn internet_address(address: Option<&str>, name: &str) -> String {
    address
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| name.trim())
        .to_string()
}

/// An inbound host registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRegistration {
    /// Name the host registers under.
    pub host_name: String,
    /// Connection address, when different from the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Connection port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Appliance vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<HostVendor>,
    /// Policy the caller asks for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_policy_choice: Option<TlsPolicyChoice>,
}

impl HostRegistration {
    /// Creates a registration for `host_name` with no embedded choice.
    #[must_use]
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            address: None,
            port: None,
            vendor: None,
            tls_policy_choice: None,
        }
    }

    /// Sets the connection address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the vendor.
    #[must_use]
    pub fn with_vendor(mut self, vendor: HostVendor) -> Self {
        self.vendor = Some(vendor);
        self
    }

    /// Embeds a policy choice in the request.
    #[must_use]
    pub fn with_choice(mut self, choice: TlsPolicyChoice) -> Self {
        self.tls_policy_choice = Some(choice);
        self
    }
}

impl PolicySubject for HostRegistration {
    fn kind(&self) -> &'static str {
        "host_registration"
    }

    fn host_descriptor(&self) -> HostDescriptor {
        HostDescriptor {
            internet_address: internet_address(self.address.as_deref(), &self.host_name),
        }
    }

    fn vendor_descriptor(&self) -> Option<VendorDescriptor> {
        self.vendor.map(|vendor| VendorDescriptor { vendor })
    }

    fn object_choice(&self) -> Option<TlsPolicyChoice> {
        self.tls_policy_choice.clone()
    }
}

/// A host already under management.
///
/// The policy columns mirror how a host record stores its own override: an
/// id (or sentinel) reference and an inline descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedHost {
    /// Host record id.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Host name.
    pub name: String,
    /// Connection address, when different from the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Appliance vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<HostVendor>,
    /// Stored policy id or sentinel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_policy_id: Option<String>,
    /// Inline policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_policy_descriptor: Option<TlsPolicyDescriptor>,
}

impl ManagedHost {
    /// Creates a managed host with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: None,
            vendor: None,
            tls_policy_id: None,
            tls_policy_descriptor: None,
        }
    }

    /// Sets the connection address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the vendor.
    #[must_use]
    pub fn with_vendor(mut self, vendor: HostVendor) -> Self {
        self.vendor = Some(vendor);
        self
    }

    /// Sets the policy reference column.
    #[must_use]
    pub fn with_policy_id(mut self, reference: impl Into<String>) -> Self {
        self.tls_policy_id = Some(reference.into());
        self
    }

    /// Sets the inline policy column.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: TlsPolicyDescriptor) -> Self {
        self.tls_policy_descriptor = Some(descriptor);
        self
    }
}

impl PolicySubject for ManagedHost {
    fn kind(&self) -> &'static str {
        "managed_host"
    }

    fn host_descriptor(&self) -> HostDescriptor {
        HostDescriptor {
            internet_address: internet_address(self.address.as_deref(), &self.name),
        }
    }

    fn vendor_descriptor(&self) -> Option<VendorDescriptor> {
        self.vendor.map(|vendor| VendorDescriptor { vendor })
    }

    fn object_choice(&self) -> Option<TlsPolicyChoice> {
        let choice = TlsPolicyChoice {
            policy_id: self.tls_policy_id.clone(),
            descriptor: self.tls_policy_descriptor.clone(),
        };
        (!choice.is_empty()).then_some(choice)
    }
}

/// Every subject kind the engine resolves policies for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TlsPolicySubject {
    /// A registration request.
    HostRegistration(HostRegistration),
    /// A managed host record.
    ManagedHost(ManagedHost),
}

impl TlsPolicySubject {
    /// Kind tags accepted by [`TlsPolicySubject::from_json`].
    pub const KINDS: [&'static str; 2] = ["host_registration", "managed_host"];

    /// Parses a subject from JSON, rejecting unknown kinds up front.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TlsPolicyError> {
        let kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ValidationError::InvalidSubject {
                reason: "missing 'kind'".to_string(),
            })?;
        if !Self::KINDS.contains(&kind) {
            return Err(ResolutionError::UnsupportedSubject {
                kind: kind.to_string(),
            }
            .into());
        }
        serde_json::from_value(value.clone()).map_err(|e| {
            ValidationError::InvalidSubject {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Borrows the subject through the provider-facing trait.
    #[must_use]
    pub fn as_subject(&self) -> &dyn PolicySubject {
        match self {
            Self::HostRegistration(s) => s,
            Self::ManagedHost(s) => s,
        }
    }
}

impl PolicySubject for TlsPolicySubject {
    fn kind(&self) -> &'static str {
        self.as_subject().kind()
    }

    fn host_descriptor(&self) -> HostDescriptor {
        self.as_subject().host_descriptor()
    }

    fn vendor_descriptor(&self) -> Option<VendorDescriptor> {
        self.as_subject().vendor_descriptor()
    }

    fn object_choice(&self) -> Option<TlsPolicyChoice> {
        self.as_subject().object_choice()
    }
}

impl From<HostRegistration> for TlsPolicySubject {
    fn from(s: HostRegistration) -> Self {
        Self::HostRegistration(s)
    }
}

impl From<ManagedHost> for TlsPolicySubject {
    fn from(s: ManagedHost) -> Self {
        Self::ManagedHost(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PolicyType;
    use serde_json::json;

    #[test]
    fn vendor_parse_is_case_insensitive() {
        assert_eq!("vmware".parse::<HostVendor>().unwrap(), HostVendor::Vmware);
        assert_eq!(" Intel ".parse::<HostVendor>().unwrap(), HostVendor::Intel);
        assert!("acme".parse::<HostVendor>().is_err());
    }

    #[test]
    fn address_falls_back_to_name() {
        let reg = HostRegistration::new("host1.example.com");
        assert_eq!(reg.host_descriptor().internet_address, "host1.example.com");

        let reg = reg.with_address("10.0.0.5");
        assert_eq!(reg.host_descriptor().internet_address, "10.0.0.5");

        let host = ManagedHost::new("h").with_address("  ");
        assert_eq!(host.host_descriptor().internet_address, "h");
    }

    #[test]
    fn managed_host_columns_form_object_choice() {
        let host = ManagedHost::new("h");
        assert!(host.object_choice().is_none());

        let host = host.with_descriptor(TlsPolicyDescriptor::new(PolicyType::PublicKey));
        let choice = host.object_choice().unwrap();
        assert!(choice.descriptor.is_some());
        assert!(choice.policy_id.is_none());
    }

    #[test]
    fn from_json_dispatches_on_kind() {
        let subject = TlsPolicySubject::from_json(&json!({
            "kind": "host_registration",
            "host_name": "host1.example.com",
            "vendor": "INTEL",
            "tls_policy_choice": {"tls_policy_id": "INSECURE"}
        }))
        .unwrap();
        assert_eq!(subject.kind(), "host_registration");
        assert_eq!(
            subject.vendor_descriptor(),
            Some(VendorDescriptor {
                vendor: HostVendor::Intel
            })
        );
        assert!(subject.object_choice().is_some());
    }

    #[test]
    fn from_json_rejects_unknown_kind() {
        let err = TlsPolicySubject::from_json(&json!({"kind": "printer", "name": "p"}))
            .unwrap_err();
        assert!(matches!(
            err,
            TlsPolicyError::Resolution(ResolutionError::UnsupportedSubject { ref kind })
                if kind == "printer"
        ));

        let err = TlsPolicySubject::from_json(&json!({"name": "p"})).unwrap_err();
        assert!(err.is_validation());

        let err = TlsPolicySubject::from_json(&json!({"kind": "managed_host"})).unwrap_err();
        assert!(err.is_validation());
    }
}
