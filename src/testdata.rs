//! Certificate fixtures shared by unit tests.
//!
//! ECDSA P-256 certificates valid from 2026-10-18 to 2126-09-24:
//! - `CA`: self-signed "Test Policy CA".
//! - `HOST1`: issued by `CA` for `host1.example.com` (serverAuth).
//! - `HOST2`: self-signed for `host2.example.com`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rustls::pki_types::{CertificateDer, UnixTime};

pub const CA_B64: &str = "MIIBmjCCAT+gAwIBAgIUcftFaankMVtv9M31wX9rrQ1qf0swCgYIKoZIzj0EAwIwGTEXMBUGA1UEAwwOVGVzdCBQb2xpY3kgQ0EwIBcNMjYxMDE4MjAyNTA5WhgPMjEyNjA5MjQyMDI1MDlaMBkxFzAVBgNVBAMMDlRlc3QgUG9saWN5IENBMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEZlPTI832iFieaeQSc02CKpwVNhPuTFxwZ5s6ISTlQrLUFn29FiwS0JNTA7F0DZMLvflWChZU4WD6gpec+jAieaNjMGEwHQYDVR0OBBYEFO+WzbLT4syMPZ2DIHaZWl2DHy+rMB8GA1UdIwQYMBaAFO+WzbLT4syMPZ2DIHaZWl2DHy+rMA8GA1UdEwEB/wQFMAMBAf8wDgYDVR0PAQH/BAQDAgEGMAoGCCqGSM49BAMCA0kAMEYCIQDvcy8+89VbZ2l3tmVBsJYCXV9ztnGXkPQ0LsZX0paFOQIhANPY6LtbqfnpCirlYdxhpy6AtSYJuxpXn+JZrUA5sF9q";

pub const HOST1_B64: &str = "MIIBzzCCAXSgAwIBAgIUB+HBcQNx19JbDQVXsnPF1aC0UyswCgYIKoZIzj0EAwIwGTEXMBUGA1UEAwwOVGVzdCBQb2xpY3kgQ0EwIBcNMjYxMDE4MjAyNTA5WhgPMjEyNjA5MjQyMDI1MDlaMBwxGjAYBgNVBAMMEWhvc3QxLmV4YW1wbGUuY29tMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAETJJshHnYoXsGkD4HVvSrEYgb3q5youf7c9yK7zUEDBtyyp77fy/4eDy327WjMAtF2ttlxpmSEShOiNGiPokNvqOBlDCBkTAMBgNVHRMBAf8EAjAAMA4GA1UdDwEB/wQEAwIHgDATBgNVHSUEDDAKBggrBgEFBQcDATAcBgNVHREEFTATghFob3N0MS5leGFtcGxlLmNvbTAdBgNVHQ4EFgQUmqW2RE/lWLUs+m8aW5NFAycM2B0wHwYDVR0jBBgwFoAU75bNstPizIw9nYMgdplaXYMfL6swCgYIKoZIzj0EAwIDSQAwRgIhAJvu/xWtSeevOklttGoZpZ9MBYeM2c6zJq6JMzjWMmmEAiEA9jgzbReqSwSlyNRSscALDP1kvVq4kYdK0jZ7dTGD10Y=";

pub const HOST2_B64: &str = "MIIBwTCCAWegAwIBAgIUPP8Om/BfZzQiP8GCkMMDVUBi9UUwCgYIKoZIzj0EAwIwHDEaMBgGA1UEAwwRaG9zdDIuZXhhbXBsZS5jb20wIBcNMjYxMDE4MjAyNTA5WhgPMjEyNjA5MjQyMDI1MDlaMBwxGjAYBgNVBAMMEWhvc3QyLmV4YW1wbGUuY29tMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEMQpscNy6U6DDMc3dstNAF1Pn1zZhrxPmJUsdQofO5wESSKPYuzsSFJfJHAmB6WZju2LApx/OPFBPQPrAEzRukKOBhDCBgTAdBgNVHQ4EFgQUv3giX51A4Gboj65VgbfIg/5DQH4wHwYDVR0jBBgwFoAUv3giX51A4Gboj65VgbfIg/5DQH4wDAYDVR0TAQH/BAIwADAcBgNVHREEFTATghFob3N0Mi5leGFtcGxlLmNvbTATBgNVHSUEDDAKBggrBgEFBQcDATAKBggqhkjOPQQDAgNIADBFAiEAyuquy5j+bkpprejodgkJR+Xop/zkCkNv+cQGmEZlelsCIBSQb+GtHJ/kcoyn2X8wIgwo9HB0blp7rC9VGVm1z+32";

pub const HOST1_SPKI_B64: &str = "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAETJJshHnYoXsGkD4HVvSrEYgb3q5youf7c9yK7zUEDBtyyp77fy/4eDy327WjMAtF2ttlxpmSEShOiNGiPokNvg==";

pub const HOST2_SPKI_B64: &str = "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEMQpscNy6U6DDMc3dstNAF1Pn1zZhrxPmJUsdQofO5wESSKPYuzsSFJfJHAmB6WZju2LApx/OPFBPQPrAEzRukA==";

pub const HOST1_CERT_SHA256: &str =
    "576cbd50fd83a5e159409869db6e5e34bcf79c43cc0933b00b2d41cc84a4585e";

pub const HOST2_SPKI_SHA256: &str =
    "2046cdf9112c3af9afd16f7e794c8674ee27d085bff398c4cccdde4c7aef16dc";

fn der(b64: &str) -> Vec<u8> {
    STANDARD.decode(b64).unwrap()
}

pub fn ca_cert() -> CertificateDer<'static> {
    CertificateDer::from(der(CA_B64))
}

pub fn host1_cert() -> CertificateDer<'static> {
    CertificateDer::from(der(HOST1_B64))
}

pub fn host2_cert() -> CertificateDer<'static> {
    CertificateDer::from(der(HOST2_B64))
}

pub fn host1_spki() -> Vec<u8> {
    der(HOST1_SPKI_B64)
}

pub fn host2_spki() -> Vec<u8> {
    der(HOST2_SPKI_B64)
}

/// 2030-01-01T00:00:00Z, inside every fixture's validity window.
pub fn now() -> UnixTime {
    UnixTime::since_unix_epoch(std::time::Duration::from_secs(1_893_456_000))
}
