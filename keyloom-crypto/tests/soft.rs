use keyloom_crypto::crypto::{
    EccCurve, KeyAlgorithm, KeyRole, KeySpec, Packet, RingProvider, RsaLength, UserId,
};
use keyloom_crypto::new_soft_provider;

#[test]
fn test_generate_primary() {
    let provider = new_soft_provider();
    let user_id = UserId::from("alice@wonderland.lit");
    let key = provider
        .generate_primary(&KeySpec::default(), std::slice::from_ref(&user_id))
        .expect("key generation failed");

    assert_eq!(key.role, KeyRole::Primary);
    assert_eq!(key.algorithm, KeyAlgorithm::Ecc(EccCurve::Curve25519));
    assert_eq!(key.user_ids.len(), 1);
    assert_eq!(key.user_ids[0].value, user_id);
    // Fingerprint is lowercase hex over a 32 byte digest.
    assert_eq!(key.fingerprint.as_ref().len(), 64);
    assert!(key
        .fingerprint
        .as_ref()
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_ne!(key.secret_packet, key.public_packet);
}

#[test]
fn test_generated_keys_are_distinct() {
    let provider = new_soft_provider();
    let spec = KeySpec::new(KeyAlgorithm::Rsa(RsaLength::Rsa3072));
    let first = provider.generate_subkey(&spec).unwrap();
    let second = provider.generate_subkey(&spec).unwrap();
    assert_ne!(first.id, second.id);
    assert_ne!(first.fingerprint, second.fingerprint);
}

#[test]
fn test_certify_and_verify() {
    let provider = new_soft_provider();
    let primary = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    let subkey = provider.generate_subkey(&KeySpec::default()).unwrap();

    let certification = provider.certify(&primary, subkey.id).unwrap();
    assert_eq!(certification.issuer, primary.id);
    assert_eq!(certification.subject, subkey.id);
    assert!(provider.verify(&certification, primary.material.public()));

    // A different issuer key must not verify.
    let other = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    assert!(!provider.verify(&certification, other.material.public()));
}

#[test]
fn test_verify_rejects_tampered_certification() {
    let provider = new_soft_provider();
    let primary = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    let subkey = provider.generate_subkey(&KeySpec::default()).unwrap();
    let certification = provider.certify(&primary, subkey.id).unwrap();

    let mut tampered = certification.clone();
    let last = tampered.bytes.len() - 1;
    tampered.bytes[last] ^= 0xff;
    assert!(!provider.verify(&tampered, primary.material.public()));

    let mut truncated = certification;
    truncated.bytes.pop();
    assert!(!provider.verify(&truncated, primary.material.public()));
}

#[test]
fn test_parse_packets_round_trip() {
    let provider = new_soft_provider();
    let primary = provider
        .generate_primary(&KeySpec::default(), &[UserId::from("alice@wonderland.lit")])
        .unwrap();
    let subkey = provider.generate_subkey(&KeySpec::default()).unwrap();
    let certification = provider.certify(&primary, subkey.id).unwrap();

    let mut encoded = Vec::new();
    encoded.extend_from_slice(&primary.secret_packet);
    encoded.extend_from_slice(&primary.user_ids[0].bytes);
    encoded.extend_from_slice(&subkey.secret_packet);
    encoded.extend_from_slice(&certification.bytes);

    let packets = provider.parse_packets(&encoded).unwrap();
    assert_eq!(packets.len(), 4);

    let Packet::Key(parsed_primary) = &packets[0] else {
        panic!("expected a key packet");
    };
    assert_eq!(parsed_primary.role, KeyRole::Primary);
    assert_eq!(parsed_primary.id, primary.id);
    assert_eq!(parsed_primary.fingerprint, primary.fingerprint);
    assert!(parsed_primary.secret.is_some());

    let Packet::UserId(parsed_user_id) = &packets[1] else {
        panic!("expected a user id packet");
    };
    assert_eq!(parsed_user_id.value, primary.user_ids[0].value);

    let Packet::Key(parsed_subkey) = &packets[2] else {
        panic!("expected a key packet");
    };
    assert_eq!(parsed_subkey.role, KeyRole::Sub);
    assert_eq!(parsed_subkey.id, subkey.id);

    let Packet::Certification(parsed_certification) = &packets[3] else {
        panic!("expected a certification packet");
    };
    assert_eq!(parsed_certification.issuer, primary.id);
    assert_eq!(parsed_certification.subject, subkey.id);

    // The packets carry their original encodings.
    let reassembled: Vec<u8> = packets
        .iter()
        .flat_map(|packet| match packet {
            Packet::Key(key) => key.bytes.clone(),
            Packet::UserId(user_id) => user_id.bytes.clone(),
            Packet::Certification(certification) => certification.bytes.clone(),
        })
        .collect();
    assert_eq!(reassembled, encoded);
}

#[test]
fn test_parse_packets_rejects_truncated_input() {
    let provider = new_soft_provider();
    let primary = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    let mut encoded = primary.public_packet.clone();
    encoded.truncate(encoded.len() - 3);
    assert!(provider.parse_packets(&encoded).is_err());
}

#[test]
fn test_public_packet_parses_without_secret_material() {
    let provider = new_soft_provider();
    let primary = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    let packets = provider.parse_packets(&primary.public_packet).unwrap();
    let Packet::Key(parsed) = &packets[0] else {
        panic!("expected a key packet");
    };
    assert!(parsed.secret.is_none());
    assert_eq!(parsed.id, primary.id);
    assert_eq!(parsed.public, *primary.material.public());
}
