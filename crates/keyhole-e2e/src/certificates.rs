//! Runtime certificates for HTTPS tests
//!
//! A throwaway authority signs a leaf for whatever names the test server
//! answers on, so no key material is checked in.

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa,
    Issuer, KeyPair, KeyUsagePurpose, SanType,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const AUTHORITY_NAME: &str = "Keyhole Test Authority";

/// Trust anchor plus a leaf certificate for the API listener
#[derive(Clone)]
pub struct TestCertificates {
    /// Authority PEM, added to the client's root store
    pub ca_cert_pem: String,
    pub server_cert_pem: String,
    pub server_key_pem: String,
}

impl TestCertificates {
    /// Leaf valid for `localhost` and both loopback addresses
    pub fn generate() -> Self {
        Self::for_names(
            &["localhost"],
            &[IpAddr::V4(Ipv4Addr::LOCALHOST), IpAddr::V6(Ipv6Addr::LOCALHOST)],
        )
    }

    /// Leaf valid for the given DNS names and IP addresses
    pub fn for_names(dns_names: &[&str], addresses: &[IpAddr]) -> Self {
        let (ca_cert_pem, authority) = authority();

        let mut alt_names = Vec::with_capacity(dns_names.len() + addresses.len());
        for name in dns_names {
            let name = (*name).try_into().expect("Invalid DNS name");
            alt_names.push(SanType::DnsName(name));
        }
        alt_names.extend(addresses.iter().copied().map(SanType::IpAddress));

        let common_name = dns_names.first().copied().unwrap_or("keyhole");
        let (server_cert_pem, server_key_pem) = leaf(common_name, alt_names, &authority);

        Self {
            ca_cert_pem,
            server_cert_pem,
            server_key_pem,
        }
    }
}

fn subject(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn
}

/// Self-signed authority, returned as PEM and as a signer for leaves
fn authority() -> (String, Issuer<'static, KeyPair>) {
    let key = KeyPair::generate().expect("Failed to generate authority key");

    let mut params = CertificateParams::default();
    params.distinguished_name = subject(AUTHORITY_NAME);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];

    let pem = params
        .clone()
        .self_signed(&key)
        .expect("Failed to self-sign authority")
        .pem();
    (pem, Issuer::new(params, key))
}

/// Server-auth leaf signed by `authority`, as (certificate PEM, key PEM)
fn leaf(
    common_name: &str,
    alt_names: Vec<SanType>,
    authority: &Issuer<'static, KeyPair>,
) -> (String, String) {
    let key = KeyPair::generate().expect("Failed to generate leaf key");

    let mut params = CertificateParams::default();
    params.distinguished_name = subject(common_name);
    params.subject_alt_names = alt_names;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];

    let cert = params
        .signed_by(&key, authority)
        .expect("Failed to sign leaf");
    (cert.pem(), key.serialize_pem())
}
