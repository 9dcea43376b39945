mod common;

use rustls::client::danger::ServerCertVerifier;
use rustls::pki_types::ServerName;
use tls_policy::crypto_provider::default_crypto_provider;
use tls_policy::{
    client_config, HostRegistration, InMemoryStores, PolicyType, TlsPolicy, TlsPolicyChoice,
    TlsPolicyConfig, TlsPolicyDescriptor, TlsPolicyVerifier,
};

fn resolve(descriptor: TlsPolicyDescriptor) -> std::sync::Arc<dyn TlsPolicy> {
    let stores = InMemoryStores::new();
    let config =
        TlsPolicyConfig::new().with_default_policy(TlsPolicyChoice::from_descriptor(descriptor));
    common::engine(&stores)
        .resolve_policy(&HostRegistration::new("host1.example.com"), &config)
        .unwrap()
}

#[test]
fn certificate_policy_verifies_ca_issued_chain() {
    let policy = resolve(
        TlsPolicyDescriptor::new(PolicyType::Certificate).with_data([common::CA_B64]),
    );
    let verifier = TlsPolicyVerifier::new(policy, default_crypto_provider());
    let host1 = ServerName::try_from("host1.example.com").unwrap();

    verifier
        .verify_server_cert(&common::cert(common::HOST1_B64), &[], &host1, &[], common::now())
        .unwrap();
    assert!(verifier
        .verify_server_cert(&common::cert(common::HOST2_B64), &[], &host1, &[], common::now())
        .is_err());
}

#[test]
fn public_key_digest_policy_ignores_server_name() {
    let policy = resolve(
        TlsPolicyDescriptor::new(PolicyType::PublicKeyDigest).with_data([common::HOST2_SPKI_SHA256]),
    );
    let verifier = TlsPolicyVerifier::new(policy, default_crypto_provider());
    let by_ip = ServerName::try_from("192.0.2.10").unwrap();
    verifier
        .verify_server_cert(&common::cert(common::HOST2_B64), &[], &by_ip, &[], common::now())
        .unwrap();
}

#[test]
fn client_config_offers_only_policy_versions() {
    let policy = resolve(
        TlsPolicyDescriptor::new(PolicyType::CertificateDigest)
            .with_data([common::HOST1_CERT_SHA256])
            .with_protocols(["TLSv1.2"]),
    );
    assert_eq!(policy.protocol_versions().len(), 1);
    let config = client_config(policy, default_crypto_provider()).unwrap();
    assert!(config.alpn_protocols.is_empty());
}
