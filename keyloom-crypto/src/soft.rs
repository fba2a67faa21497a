//! Deterministic software ring provider.
//!
//! Implements the [`RingProvider`] capabilities with a trivial packet format
//! and a digest-based binding tag. Key material is random, everything
//! derived from it is deterministic, so parsing re-derives the same ids and
//! fingerprints that generation produced.
//!
//! This provider is NOT a cryptosystem. It exists so the ring core can be
//! exercised without a real `OpenPGP` backend.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq as _;

use crate::crypto::{
    Certification, EccCurve, Fingerprint, GeneratedKey, KeyAlgorithm, KeyId, KeyRole, KeySpec,
    Packet, PacketParseError, ParsedKey, PublicKeyMaterial, RingProvider, RsaLength,
    SecretKeyMaterial, UserId, UserIdPacket,
};
use crate::{generate_secure_random_bytes, CryptoInfoError};

const TAG_PUBLIC_PRIMARY: u8 = 0x01;
const TAG_SECRET_PRIMARY: u8 = 0x02;
const TAG_PUBLIC_SUBKEY: u8 = 0x03;
const TAG_SECRET_SUBKEY: u8 = 0x04;
const TAG_CERTIFICATION: u8 = 0x05;
const TAG_USER_ID: u8 = 0x06;

const MATERIAL_SIZE: usize = 32;
const DIGEST_SIZE: usize = 32;
const KEY_ID_SIZE: usize = 8;

const FINGERPRINT_CONTEXT: &[u8] = b"keyloom.soft.key.v1";
const PUBLIC_CONTEXT: &[u8] = b"keyloom.soft.public.v1";
const BINDING_CONTEXT: &[u8] = b"keyloom.soft.bind.v1";

/// A software [`RingProvider`] for tests and reference use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftRingProvider;

impl SoftRingProvider {
    pub fn new() -> Self {
        Self
    }

    fn generate(&self, role: KeyRole, spec: &KeySpec, user_ids: &[UserId]) -> GeneratedKey {
        let secret = generate_secure_random_bytes::<MATERIAL_SIZE>().to_vec();
        let public = derive_public(&secret);
        let algorithm = spec.algorithm;
        let fingerprint_digest = fingerprint_digest(algorithm, &public);
        let id = key_id_from_digest(&fingerprint_digest);
        let fingerprint = Fingerprint::new(hex::encode(fingerprint_digest));

        let mut key_payload = Vec::with_capacity(1 + 2 * MATERIAL_SIZE);
        key_payload.push(algorithm_code(algorithm));
        key_payload.extend_from_slice(&public);
        let public_packet = emit_packet(public_tag(role), &key_payload);
        key_payload.extend_from_slice(&secret);
        let secret_packet = emit_packet(secret_tag(role), &key_payload);

        let user_ids = user_ids
            .iter()
            .map(|value| UserIdPacket {
                value: value.clone(),
                bytes: emit_packet(TAG_USER_ID, value.as_bytes()),
            })
            .collect();

        GeneratedKey {
            role,
            id,
            fingerprint,
            algorithm,
            material: SecretKeyMaterial::new(PublicKeyMaterial::new(public), secret),
            user_ids,
            secret_packet,
            public_packet,
        }
    }
}

impl RingProvider for SoftRingProvider {
    fn generate_primary(&self, spec: &KeySpec, user_ids: &[UserId]) -> crate::Result<GeneratedKey> {
        Ok(self.generate(KeyRole::Primary, spec, user_ids))
    }

    fn generate_subkey(&self, spec: &KeySpec) -> crate::Result<GeneratedKey> {
        Ok(self.generate(KeyRole::Sub, spec, &[]))
    }

    fn certify(&self, issuer: &GeneratedKey, subject: KeyId) -> crate::Result<Certification> {
        let tag = binding_tag(issuer.material.public(), subject);
        let mut payload = Vec::with_capacity(2 * KEY_ID_SIZE + DIGEST_SIZE);
        payload.extend_from_slice(&issuer.id.0.to_be_bytes());
        payload.extend_from_slice(&subject.0.to_be_bytes());
        payload.extend_from_slice(&tag);
        Ok(Certification {
            issuer: issuer.id,
            subject,
            bytes: emit_packet(TAG_CERTIFICATION, &payload),
        })
    }

    fn verify(&self, certification: &Certification, issuer_public: &PublicKeyMaterial) -> bool {
        let Some((tag, payload)) = split_packet(&certification.bytes) else {
            return false;
        };
        if tag != TAG_CERTIFICATION {
            return false;
        }
        let Ok((issuer, subject, embedded_tag)) = parse_certification_payload(payload) else {
            return false;
        };
        if issuer != certification.issuer || subject != certification.subject {
            return false;
        }
        let expected = binding_tag(issuer_public, subject);
        expected.ct_eq(embedded_tag).into()
    }

    fn parse_packets(&self, bytes: &[u8]) -> crate::Result<Vec<Packet>> {
        let mut packets = Vec::new();
        let mut rest = bytes;
        while !rest.is_empty() {
            let (tag, payload, consumed) = next_packet(rest)?;
            let encoded = rest[..consumed].to_vec();
            rest = &rest[consumed..];
            packets.push(parse_packet(tag, payload, encoded)?);
        }
        Ok(packets)
    }
}

fn parse_packet(tag: u8, payload: &[u8], encoded: Vec<u8>) -> crate::Result<Packet> {
    match tag {
        TAG_PUBLIC_PRIMARY | TAG_SECRET_PRIMARY | TAG_PUBLIC_SUBKEY | TAG_SECRET_SUBKEY => {
            let role = if tag == TAG_PUBLIC_PRIMARY || tag == TAG_SECRET_PRIMARY {
                KeyRole::Primary
            } else {
                KeyRole::Sub
            };
            let has_secret = tag == TAG_SECRET_PRIMARY || tag == TAG_SECRET_SUBKEY;
            Ok(Packet::Key(parse_key_payload(
                role, has_secret, payload, encoded,
            )?))
        }
        TAG_CERTIFICATION => {
            let (issuer, subject, _) = parse_certification_payload(payload)?;
            Ok(Packet::Certification(Certification {
                issuer,
                subject,
                bytes: encoded,
            }))
        }
        TAG_USER_ID => {
            let value = std::str::from_utf8(payload)
                .map_err(|_| PacketParseError::InvalidPayload("user id is not valid utf-8"))?;
            Ok(Packet::UserId(UserIdPacket {
                value: UserId::from(value),
                bytes: encoded,
            }))
        }
        other => Err(PacketParseError::UnknownTag(other).into()),
    }
}

fn parse_key_payload(
    role: KeyRole,
    has_secret: bool,
    payload: &[u8],
    encoded: Vec<u8>,
) -> crate::Result<ParsedKey> {
    let expected_len = if has_secret {
        1 + 2 * MATERIAL_SIZE
    } else {
        1 + MATERIAL_SIZE
    };
    if payload.len() != expected_len {
        return Err(PacketParseError::InvalidPayload("bad key packet length").into());
    }
    let algorithm = algorithm_from_code(payload[0])?;
    let public = payload[1..=MATERIAL_SIZE].to_vec();
    let secret = has_secret.then(|| payload[1 + MATERIAL_SIZE..].to_vec());

    let fingerprint_digest = fingerprint_digest(algorithm, &public);
    let id = key_id_from_digest(&fingerprint_digest);
    let fingerprint = Fingerprint::new(hex::encode(fingerprint_digest));
    let public = PublicKeyMaterial::new(public);
    let secret = secret.map(|secret| SecretKeyMaterial::new(public.clone(), secret));

    Ok(ParsedKey {
        role,
        id,
        fingerprint,
        algorithm,
        public,
        secret,
        bytes: encoded,
    })
}

fn parse_certification_payload(payload: &[u8]) -> crate::Result<(KeyId, KeyId, &[u8])> {
    if payload.len() != 2 * KEY_ID_SIZE + DIGEST_SIZE {
        return Err(PacketParseError::InvalidPayload("bad certification packet length").into());
    }
    let issuer = key_id_from_bytes(&payload[..KEY_ID_SIZE])?;
    let subject = key_id_from_bytes(&payload[KEY_ID_SIZE..2 * KEY_ID_SIZE])?;
    Ok((issuer, subject, &payload[2 * KEY_ID_SIZE..]))
}

/// Splits the next length-prefixed packet off `bytes`.
///
/// Returns the tag, the payload and the total number of consumed bytes.
fn next_packet(bytes: &[u8]) -> crate::Result<(u8, &[u8], usize)> {
    if bytes.len() < 5 {
        return Err(PacketParseError::Truncated.into());
    }
    let tag = bytes[0];
    let len = u32::from_be_bytes(
        bytes[1..5]
            .try_into()
            .map_err(|_| PacketParseError::Truncated)?,
    );
    let len = usize::try_from(len).map_err(|_| PacketParseError::Truncated)?;
    let end = 5_usize
        .checked_add(len)
        .ok_or(PacketParseError::Truncated)?;
    if bytes.len() < end {
        return Err(PacketParseError::Truncated.into());
    }
    Ok((tag, &bytes[5..end], end))
}

/// Splits a single complete packet, returning its tag and payload.
fn split_packet(bytes: &[u8]) -> Option<(u8, &[u8])> {
    let (tag, payload, consumed) = next_packet(bytes).ok()?;
    (consumed == bytes.len()).then_some((tag, payload))
}

fn emit_packet(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + payload.len());
    out.push(tag);
    // Payloads are bounded by MATERIAL_SIZE-scale constants and user id strings.
    out.extend_from_slice(&u32::try_from(payload.len()).unwrap_or(u32::MAX).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn public_tag(role: KeyRole) -> u8 {
    match role {
        KeyRole::Primary => TAG_PUBLIC_PRIMARY,
        KeyRole::Sub => TAG_PUBLIC_SUBKEY,
    }
}

fn secret_tag(role: KeyRole) -> u8 {
    match role {
        KeyRole::Primary => TAG_SECRET_PRIMARY,
        KeyRole::Sub => TAG_SECRET_SUBKEY,
    }
}

fn derive_public(secret: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(PUBLIC_CONTEXT);
    hasher.update(secret);
    hasher.finalize().to_vec()
}

fn fingerprint_digest(algorithm: KeyAlgorithm, public: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_CONTEXT);
    hasher.update([algorithm_code(algorithm)]);
    hasher.update(public);
    hasher.finalize().into()
}

/// The key id is the low 64 bits of the fingerprint digest.
fn key_id_from_digest(digest: &[u8; DIGEST_SIZE]) -> KeyId {
    let mut id = [0_u8; KEY_ID_SIZE];
    id.copy_from_slice(&digest[DIGEST_SIZE - KEY_ID_SIZE..]);
    KeyId(u64::from_be_bytes(id))
}

fn key_id_from_bytes(bytes: &[u8]) -> crate::Result<KeyId> {
    let id: [u8; KEY_ID_SIZE] = bytes
        .try_into()
        .map_err(|_| PacketParseError::InvalidPayload("bad key id length"))?;
    Ok(KeyId(u64::from_be_bytes(id)))
}

fn binding_tag(issuer_public: &PublicKeyMaterial, subject: KeyId) -> [u8; DIGEST_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(BINDING_CONTEXT);
    hasher.update(issuer_public.as_bytes());
    hasher.update(subject.0.to_be_bytes());
    hasher.finalize().into()
}

fn algorithm_code(algorithm: KeyAlgorithm) -> u8 {
    match algorithm {
        KeyAlgorithm::Ecc(EccCurve::Curve25519) => 0x10,
        KeyAlgorithm::Ecc(EccCurve::NistP256) => 0x11,
        KeyAlgorithm::Rsa(RsaLength::Rsa2048) => 0x20,
        KeyAlgorithm::Rsa(RsaLength::Rsa3072) => 0x21,
        KeyAlgorithm::Rsa(RsaLength::Rsa4096) => 0x22,
    }
}

fn algorithm_from_code(code: u8) -> crate::Result<KeyAlgorithm> {
    match code {
        0x10 => Ok(KeyAlgorithm::Ecc(EccCurve::Curve25519)),
        0x11 => Ok(KeyAlgorithm::Ecc(EccCurve::NistP256)),
        0x20 => Ok(KeyAlgorithm::Rsa(RsaLength::Rsa2048)),
        0x21 => Ok(KeyAlgorithm::Rsa(RsaLength::Rsa3072)),
        0x22 => Ok(KeyAlgorithm::Rsa(RsaLength::Rsa4096)),
        _ => Err(CryptoInfoError::new("unknown key algorithm code").into()),
    }
}
