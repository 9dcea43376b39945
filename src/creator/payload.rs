//! Decoding of descriptor payloads: data items, digests, protocol settings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::descriptor::{
    PolicyType, TlsPolicyDescriptor, TlsProtection, META_DIGEST_ALGORITHM, META_ENCODING,
};
use crate::error::ValidationError;
use crate::policy::{DigestAlgorithm, PolicySettings, TlsVersion};

/// How `data` items are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataEncoding {
    Base64,
    Hex,
}

impl DataEncoding {
    const fn name(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }

    /// The encoding named in `meta`, or `default`.
    pub(crate) fn for_descriptor(
        descriptor: &TlsPolicyDescriptor,
        default: Self,
    ) -> Result<Self, ValidationError> {
        match descriptor.meta(META_ENCODING).map(str::trim) {
            None | Some("") => Ok(default),
            Some(e) if e.eq_ignore_ascii_case("base64") => Ok(Self::Base64),
            Some(e) if e.eq_ignore_ascii_case("hex") => Ok(Self::Hex),
            Some(e) => Err(ValidationError::UnknownEncoding {
                encoding: e.to_string(),
            }),
        }
    }

    fn decode(self, index: usize, item: &str) -> Result<Vec<u8>, ValidationError> {
        let invalid = || ValidationError::InvalidEncoding {
            index,
            encoding: self.name(),
        };
        match self {
            Self::Hex => {
                let compact: String = item
                    .chars()
                    .filter(|c| *c != ':' && !c.is_whitespace())
                    .collect();
                hex::decode(compact).map_err(|_| invalid())
            }
            Self::Base64 => {
                // PEM armor lines are tolerated around the base64 body.
                let compact: String = item
                    .lines()
                    .filter(|l| !l.trim_start().starts_with("-----"))
                    .flat_map(str::chars)
                    .filter(|c| !c.is_whitespace())
                    .collect();
                STANDARD.decode(compact).map_err(|_| invalid())
            }
        }
    }
}

/// Decodes every data item; a policy of `policy_type` needs at least one.
pub(crate) fn decode_data(
    descriptor: &TlsPolicyDescriptor,
    policy_type: PolicyType,
    default: DataEncoding,
) -> Result<Vec<Vec<u8>>, ValidationError> {
    if descriptor.data.iter().all(|d| d.trim().is_empty()) {
        return Err(ValidationError::MissingPolicyData { policy_type });
    }
    let encoding = DataEncoding::for_descriptor(descriptor, default)?;
    descriptor
        .data
        .iter()
        .enumerate()
        .map(|(index, item)| encoding.decode(index, item))
        .collect()
}

/// The digest algorithm from `meta`, or inferred from the digest length.
///
/// Every digest must have the algorithm's length.
pub(crate) fn digest_algorithm(
    descriptor: &TlsPolicyDescriptor,
    digests: &[Vec<u8>],
) -> Result<DigestAlgorithm, ValidationError> {
    let algorithm = match descriptor.meta(META_DIGEST_ALGORITHM).map(str::trim) {
        Some(name) if !name.is_empty() => name.parse::<DigestAlgorithm>()?,
        _ => {
            let length = digests.first().map_or(0, Vec::len);
            DigestAlgorithm::from_output_len(length)
                .ok_or(ValidationError::UnknownDigestLength { length })?
        }
    };
    if let Some((index, digest)) = digests
        .iter()
        .enumerate()
        .find(|(_, d)| d.len() != algorithm.output_len())
    {
        return Err(ValidationError::DigestLengthMismatch {
            index,
            algorithm: algorithm.name(),
            expected: algorithm.output_len(),
            actual: digest.len(),
        });
    }
    Ok(algorithm)
}

/// Protection (or `default`) and protocol versions of a descriptor.
pub(crate) fn settings(
    descriptor: &TlsPolicyDescriptor,
    default: TlsProtection,
) -> Result<PolicySettings, ValidationError> {
    let versions = descriptor
        .protocols
        .iter()
        .map(|p| p.parse::<TlsVersion>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PolicySettings::new(
        descriptor.protection.unwrap_or(default),
        versions,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_data(items: &[&str]) -> TlsPolicyDescriptor {
        TlsPolicyDescriptor::new(PolicyType::CertificateDigest).with_data(items.iter().copied())
    }

    #[test]
    fn hex_ignores_colons_and_whitespace() {
        let d = with_data(&["AB:cd 01\n02"]);
        let items = decode_data(&d, PolicyType::CertificateDigest, DataEncoding::Hex).unwrap();
        assert_eq!(items, vec![vec![0xab, 0xcd, 0x01, 0x02]]);
    }

    #[test]
    fn base64_tolerates_pem_armor() {
        let d = with_data(&["-----BEGIN CERTIFICATE-----\nAQID\nBA==\n-----END CERTIFICATE-----"]);
        let items = decode_data(&d, PolicyType::Certificate, DataEncoding::Base64).unwrap();
        assert_eq!(items, vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn meta_encoding_overrides_default() {
        let d = with_data(&["AQI="]).with_meta(META_ENCODING, "Base64");
        let items = decode_data(&d, PolicyType::CertificateDigest, DataEncoding::Hex).unwrap();
        assert_eq!(items, vec![vec![1, 2]]);

        let d = with_data(&["00"]).with_meta(META_ENCODING, "der");
        assert!(matches!(
            decode_data(&d, PolicyType::CertificateDigest, DataEncoding::Hex),
            Err(ValidationError::UnknownEncoding { .. })
        ));
    }

    #[test]
    fn bad_item_reports_index() {
        let d = with_data(&["00", "zz"]);
        assert!(matches!(
            decode_data(&d, PolicyType::CertificateDigest, DataEncoding::Hex),
            Err(ValidationError::InvalidEncoding {
                index: 1,
                encoding: "hex"
            })
        ));
    }

    #[test]
    fn empty_data_is_missing() {
        let d = with_data(&[" "]);
        assert!(matches!(
            decode_data(&d, PolicyType::PublicKey, DataEncoding::Base64),
            Err(ValidationError::MissingPolicyData {
                policy_type: PolicyType::PublicKey
            })
        ));
    }

    #[test]
    fn digest_algorithm_is_named_or_inferred() {
        let d = with_data(&[]);
        assert_eq!(
            digest_algorithm(&d, &[vec![0; 48]]).unwrap(),
            DigestAlgorithm::Sha384
        );
        assert!(matches!(
            digest_algorithm(&d, &[vec![0; 20]]),
            Err(ValidationError::UnknownDigestLength { length: 20 })
        ));

        let d = d.with_meta(META_DIGEST_ALGORITHM, "SHA-256");
        assert!(matches!(
            digest_algorithm(&d, &[vec![0; 32], vec![0; 31]]),
            Err(ValidationError::DigestLengthMismatch {
                index: 1,
                expected: 32,
                actual: 31,
                ..
            })
        ));
    }

    #[test]
    fn settings_parse_protocols() {
        let d = with_data(&[]).with_protocols(["TLSv1.2"]);
        let s = settings(&d, TlsProtection::full()).unwrap();
        assert_eq!(s.versions, vec![TlsVersion::Tls12]);
        assert_eq!(s.protection, TlsProtection::full());

        let d = with_data(&[]).with_protocols(["SSLv3"]);
        assert!(matches!(
            settings(&d, TlsProtection::full()),
            Err(ValidationError::UnknownProtocol { .. })
        ));
    }
}
