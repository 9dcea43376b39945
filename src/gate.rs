//! Allow-list gate for classified policy types.
//!
//! The gate fails closed: a disallowed type ends the resolution instead of
//! letting a lower-priority provider supply a weaker policy. Tags outside
//! the built-in set are never allowed.

use tracing::warn;

use crate::config::AllowedPolicyTypes;
use crate::descriptor::{PolicyTag, PolicyType};
use crate::error::ResolutionError;

/// Checks `tag` against `allowed`, returning the allowed built-in type.
pub fn check_allowed(
    tag: &PolicyTag,
    allowed: &AllowedPolicyTypes,
    address: &str,
) -> Result<PolicyType, ResolutionError> {
    match tag.known() {
        Some(t) if allowed.contains(t) => Ok(t),
        _ => {
            warn!(policy_type = %tag, address, "TLS policy type is not allowed");
            Err(ResolutionError::PolicyTypeNotAllowed {
                policy_type: tag.clone(),
                address: address.to_string(),
            })
        }
    }
}
