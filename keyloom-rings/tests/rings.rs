use keyloom_crypto::crypto::{Certification, KeySpec, RingProvider};
use keyloom_crypto::new_soft_provider;
use keyloom_rings::errors::{DecodeRingError, MalformedRingError};
use keyloom_rings::keys::{PrimaryKey, Secret, Subkey};
use keyloom_rings::rings::{DropReason, GeneratedRing, PublicRing, RingGenerator, SecretRing};

fn generate_test_ring(provider: &impl RingProvider, user_id: &str) -> GeneratedRing {
    RingGenerator::new(provider)
        .with_user_id(user_id)
        .with_subkey(KeySpec::default())
        .generate()
        .expect("ring generation failed")
}

#[test]
fn test_clean_retains_certified_subkeys() {
    let provider = new_soft_provider();
    let ring = generate_test_ring(&provider, "alice@wonderland.lit").secret;
    assert_eq!(ring.key_count(), 2);

    let cleaned = ring.clean(ring.primary());
    assert!(cleaned.is_unchanged());
    assert_eq!(cleaned.ring.key_count(), 2);
    assert_eq!(cleaned.ring.to_bytes(), ring.to_bytes());
}

#[test]
fn test_clean_round_trip_without_subkeys() {
    let provider = new_soft_provider();
    let ring = RingGenerator::new(&provider)
        .with_user_id("alice@wonderland.lit")
        .generate()
        .expect("ring generation failed")
        .secret;
    assert_eq!(ring.key_count(), 1);

    let cleaned = ring.clean(ring.primary());
    assert!(cleaned.is_unchanged());
    assert_eq!(cleaned.ring.to_bytes(), ring.to_bytes());
}

#[test]
fn test_clean_removes_foreign_subkey() {
    let provider = new_soft_provider();
    let alice = generate_test_ring(&provider, "alice@wonderland.lit");
    let mallory = generate_test_ring(&provider, "mallory@mall.ory");

    // Insert mallory's certified subkey into alice's ring.
    let foreign_subkey = mallory.secret.subkeys()[0].clone();
    let foreign_id = foreign_subkey.id();
    let mixed = alice.secret.with_subkey(foreign_subkey);
    assert!(mixed.key_by_id(foreign_id).is_some());
    assert_eq!(mixed.key_count(), 3);

    // Audit the mixed ring against alice's public primary key.
    let cleaned = mixed.clean(alice.public.primary());
    assert!(cleaned.ring.key_by_id(foreign_id).is_none());
    assert_eq!(cleaned.ring.key_count(), 2);
    assert_eq!(cleaned.dropped.len(), 1);
    assert_eq!(cleaned.dropped[0].id, foreign_id);
    assert_eq!(cleaned.dropped[0].reason, DropReason::ForeignIssuer);

    // Alice's own subkey survives with its encoding intact.
    assert_eq!(cleaned.ring.to_bytes(), alice.secret.to_bytes());
    // The input ring is unchanged.
    assert!(mixed.key_by_id(foreign_id).is_some());
}

#[test]
fn test_clean_drops_uncertified_subkey() {
    let provider = new_soft_provider();
    let alice = generate_test_ring(&provider, "alice@wonderland.lit");
    let stray = provider.generate_subkey(&KeySpec::default()).unwrap();
    let ring = alice
        .secret
        .with_subkey(Subkey::<Secret>::from_generated(&stray, Vec::new()));

    let cleaned = ring.clean(alice.secret.primary());
    assert_eq!(cleaned.dropped.len(), 1);
    assert_eq!(cleaned.dropped[0].reason, DropReason::Uncertified);
    assert_eq!(cleaned.ring.to_bytes(), alice.secret.to_bytes());
}

#[test]
fn test_clean_drops_subject_mismatch() {
    let provider = new_soft_provider();
    let primary = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    let subkey = provider.generate_subkey(&KeySpec::default()).unwrap();
    let other = provider.generate_subkey(&KeySpec::default()).unwrap();

    // The primary certifies `other`, but the certification is attached to
    // `subkey`.
    let certification = provider.certify(&primary, other.id).unwrap();
    let ring = SecretRing::new(
        PrimaryKey::from_generated(&primary),
        vec![Subkey::from_generated(&subkey, vec![certification])],
    );

    let cleaned = ring.clean(ring.primary());
    assert_eq!(cleaned.ring.key_count(), 1);
    assert_eq!(cleaned.dropped[0].reason, DropReason::SubjectMismatch);
}

#[test]
fn test_clean_verified_rejects_forged_certification() {
    let provider = new_soft_provider();
    let alice = generate_test_ring(&provider, "alice@wonderland.lit");
    let mallory_primary = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    let stray = provider.generate_subkey(&KeySpec::default()).unwrap();

    // Mallory certifies the stray subkey, then forges the issuer field to
    // point at alice's primary key.
    let mallory_certification = provider.certify(&mallory_primary, stray.id).unwrap();
    let forged = Certification {
        issuer: alice.secret.primary().id(),
        subject: stray.id,
        bytes: mallory_certification.bytes,
    };
    let ring = alice
        .secret
        .with_subkey(Subkey::<Secret>::from_generated(&stray, vec![forged]));

    // Identifier matching alone is fooled by the forged issuer field.
    let cleaned = ring.clean(alice.secret.primary());
    assert!(cleaned.ring.key_by_id(stray.id).is_some());

    // Cryptographic verification is not.
    let cleaned = ring.clean_verified(alice.secret.primary(), &provider);
    assert!(cleaned.ring.key_by_id(stray.id).is_none());
    assert_eq!(cleaned.dropped[0].reason, DropReason::InvalidSignature);
}

#[test]
fn test_clean_verified_keeps_genuine_ring() {
    let provider = new_soft_provider();
    let ring = generate_test_ring(&provider, "alice@wonderland.lit").secret;
    let cleaned = ring.clean_verified(ring.primary(), &provider);
    assert!(cleaned.is_unchanged());
    assert_eq!(cleaned.ring.to_bytes(), ring.to_bytes());
}

#[test]
fn test_clean_against_unrelated_anchor_keeps_only_primary() {
    let provider = new_soft_provider();
    let alice = generate_test_ring(&provider, "alice@wonderland.lit");
    let mallory = generate_test_ring(&provider, "mallory@mall.ory");

    let cleaned = alice.secret.clean(mallory.secret.primary());
    assert_eq!(cleaned.ring.key_count(), 1);
    assert_eq!(
        cleaned.ring.primary().id(),
        alice.secret.primary().id()
    );
    assert_eq!(cleaned.dropped.len(), 1);
    assert_eq!(cleaned.dropped[0].reason, DropReason::ForeignIssuer);
}

#[test]
fn test_ring_iteration_order_and_lookup() {
    let provider = new_soft_provider();
    let ring = RingGenerator::new(&provider)
        .with_user_id("alice@wonderland.lit")
        .with_subkey(KeySpec::default())
        .with_subkey(KeySpec::default())
        .generate()
        .unwrap()
        .secret;

    let ids: Vec<_> = ring.keys().map(|key| key.id()).collect();
    assert_eq!(ids.len(), 3);
    assert!(ring.keys().next().unwrap().is_primary());
    // Restartable with the same order.
    let again: Vec<_> = ring.keys().map(|key| key.id()).collect();
    assert_eq!(ids, again);

    for id in &ids {
        assert_eq!(ring.key_by_id(*id).unwrap().id(), *id);
    }
    assert!(ring.key_by_id(keyloom_crypto::crypto::KeyId(0)).is_none());
}

#[test]
fn test_decode_round_trip() {
    let provider = new_soft_provider();
    let generated = generate_test_ring(&provider, "alice@wonderland.lit");

    let secret_bytes = generated.secret.to_bytes();
    let decoded = SecretRing::decode(&provider, &secret_bytes).unwrap();
    assert_eq!(decoded.to_bytes(), secret_bytes);
    let decoded_ids: Vec<_> = decoded.keys().map(|key| key.id()).collect();
    let source_ids: Vec<_> = generated.secret.keys().map(|key| key.id()).collect();
    assert_eq!(decoded_ids, source_ids);

    let public_bytes = generated.public.to_bytes();
    let decoded = PublicRing::decode(&provider, &public_bytes).unwrap();
    assert_eq!(decoded.to_bytes(), public_bytes);
}

#[test]
fn test_decode_rejects_variant_mismatch() {
    let provider = new_soft_provider();
    let generated = generate_test_ring(&provider, "alice@wonderland.lit");

    let result = SecretRing::decode(&provider, &generated.public.to_bytes());
    assert!(matches!(
        result,
        Err(DecodeRingError::Malformed(
            MalformedRingError::MissingSecretMaterial(_)
        ))
    ));

    let result = PublicRing::decode(&provider, &generated.secret.to_bytes());
    assert!(matches!(
        result,
        Err(DecodeRingError::Malformed(
            MalformedRingError::UnexpectedSecretMaterial(_)
        ))
    ));
}

#[test]
fn test_decode_rejects_malformed_streams() {
    let provider = new_soft_provider();
    let primary = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    let subkey = provider.generate_subkey(&KeySpec::default()).unwrap();
    let certification = provider.certify(&primary, subkey.id).unwrap();

    // A ring must start with a primary key.
    let result = SecretRing::decode(&provider, &subkey.secret_packet);
    assert!(matches!(
        result,
        Err(DecodeRingError::Malformed(MalformedRingError::NoPrimaryKey))
    ));

    let result = SecretRing::decode(&provider, &[]);
    assert!(matches!(
        result,
        Err(DecodeRingError::Malformed(MalformedRingError::NoPrimaryKey))
    ));

    // A certification must follow a subkey.
    let mut dangling = primary.secret_packet.clone();
    dangling.extend_from_slice(&certification.bytes);
    let result = SecretRing::decode(&provider, &dangling);
    assert!(matches!(
        result,
        Err(DecodeRingError::Malformed(
            MalformedRingError::DanglingCertification(_)
        ))
    ));

    // A second primary key is rejected.
    let second = provider
        .generate_primary(&KeySpec::default(), &[])
        .unwrap();
    let mut doubled = primary.secret_packet.clone();
    doubled.extend_from_slice(&second.secret_packet);
    let result = SecretRing::decode(&provider, &doubled);
    assert!(matches!(
        result,
        Err(DecodeRingError::Malformed(
            MalformedRingError::TrailingPrimaryKey(_)
        ))
    ));

    // User ids belong to the primary key, before any subkey.
    let with_user_id = provider
        .generate_primary(&KeySpec::default(), &["alice@wonderland.lit".into()])
        .unwrap();
    let mut misplaced = primary.secret_packet.clone();
    misplaced.extend_from_slice(&subkey.secret_packet);
    misplaced.extend_from_slice(&with_user_id.user_ids[0].bytes);
    let result = SecretRing::decode(&provider, &misplaced);
    assert!(matches!(
        result,
        Err(DecodeRingError::Malformed(MalformedRingError::MisplacedUserId))
    ));
}
