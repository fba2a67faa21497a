//! Key material domain types.
//!
//! Component keys are immutable values produced atomically as part of ring
//! generation or ring transformation. They carry their original wire
//! encoding so that rings re-encode bit-identically as long as no component
//! was removed.

mod variant;
pub use variant::*;

use std::fmt;

use keyloom_crypto::crypto::{
    Certification, Fingerprint, GeneratedKey, KeyAlgorithm, KeyId, KeyRole, ParsedKey,
    PublicKeyMaterial, UserId, UserIdPacket,
};

use crate::errors::MalformedRingError;

/// The primary (master) key of a ring, the trust anchor for that ring.
pub struct PrimaryKey<V: RingVariant> {
    id: KeyId,
    fingerprint: Fingerprint,
    algorithm: KeyAlgorithm,
    user_ids: Vec<UserIdPacket>,
    material: V::Material,
    encoded: Vec<u8>,
}

impl<V: RingVariant> PrimaryKey<V> {
    /// Builds a primary component key from a provider generation event.
    pub fn from_generated(key: &GeneratedKey) -> Self {
        debug_assert_eq!(key.role, KeyRole::Primary);
        Self {
            id: key.id,
            fingerprint: key.fingerprint.clone(),
            algorithm: key.algorithm,
            user_ids: key.user_ids.clone(),
            material: V::material_from_generated(key),
            encoded: V::generated_packet(key).to_vec(),
        }
    }

    pub(crate) fn from_parsed(
        key: &ParsedKey,
        user_ids: Vec<UserIdPacket>,
    ) -> Result<Self, MalformedRingError> {
        Ok(Self {
            id: key.id,
            fingerprint: key.fingerprint.clone(),
            algorithm: key.algorithm,
            user_ids,
            material: V::material_from_parsed(key)?,
            encoded: key.bytes.clone(),
        })
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// The user identities attached to this primary key.
    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.user_ids.iter().map(|packet| &packet.value)
    }

    pub fn material(&self) -> &V::Material {
        &self.material
    }

    /// The public half of the key material.
    pub fn public_material(&self) -> &PublicKeyMaterial {
        V::public_material(&self.material)
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.encoded);
        for user_id in &self.user_ids {
            out.extend_from_slice(&user_id.bytes);
        }
    }
}

impl<V: RingVariant> Clone for PrimaryKey<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            fingerprint: self.fingerprint.clone(),
            algorithm: self.algorithm,
            user_ids: self.user_ids.clone(),
            material: self.material.clone(),
            encoded: self.encoded.clone(),
        }
    }
}

impl<V: RingVariant> fmt::Debug for PrimaryKey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimaryKey")
            .field("kind", &V::KIND)
            .field("id", &self.id)
            .field("fingerprint", &self.fingerprint)
            .field("user_ids", &self.user_ids)
            .finish_non_exhaustive()
    }
}

/// A subordinate key bound to a primary key through certifications.
///
/// A subkey exists only in the context of exactly one ring and is dropped
/// together with its certifications when a cleaned ring is produced.
pub struct Subkey<V: RingVariant> {
    id: KeyId,
    fingerprint: Fingerprint,
    algorithm: KeyAlgorithm,
    material: V::Material,
    certifications: Vec<Certification>,
    encoded: Vec<u8>,
}

impl<V: RingVariant> Subkey<V> {
    /// Builds a subordinate component key from a provider generation event
    /// and the certifications attached to it.
    pub fn from_generated(key: &GeneratedKey, certifications: Vec<Certification>) -> Self {
        debug_assert_eq!(key.role, KeyRole::Sub);
        Self {
            id: key.id,
            fingerprint: key.fingerprint.clone(),
            algorithm: key.algorithm,
            material: V::material_from_generated(key),
            certifications,
            encoded: V::generated_packet(key).to_vec(),
        }
    }

    pub(crate) fn from_parsed(
        key: &ParsedKey,
        certifications: Vec<Certification>,
    ) -> Result<Self, MalformedRingError> {
        Ok(Self {
            id: key.id,
            fingerprint: key.fingerprint.clone(),
            algorithm: key.algorithm,
            material: V::material_from_parsed(key)?,
            certifications,
            encoded: key.bytes.clone(),
        })
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// The certifications attached to this subkey, in original order.
    pub fn certifications(&self) -> &[Certification] {
        &self.certifications
    }

    pub fn material(&self) -> &V::Material {
        &self.material
    }

    /// The public half of the key material.
    pub fn public_material(&self) -> &PublicKeyMaterial {
        V::public_material(&self.material)
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.encoded);
        for certification in &self.certifications {
            out.extend_from_slice(&certification.bytes);
        }
    }
}

impl<V: RingVariant> Clone for Subkey<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            fingerprint: self.fingerprint.clone(),
            algorithm: self.algorithm,
            material: self.material.clone(),
            certifications: self.certifications.clone(),
            encoded: self.encoded.clone(),
        }
    }
}

impl<V: RingVariant> fmt::Debug for Subkey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subkey")
            .field("kind", &V::KIND)
            .field("id", &self.id)
            .field("fingerprint", &self.fingerprint)
            .field("certifications", &self.certifications.len())
            .finish_non_exhaustive()
    }
}

/// A borrowed view on one component key of a ring.
pub enum RingKey<'a, V: RingVariant> {
    Primary(&'a PrimaryKey<V>),
    Sub(&'a Subkey<V>),
}

impl<V: RingVariant> RingKey<'_, V> {
    pub fn id(&self) -> KeyId {
        match self {
            RingKey::Primary(key) => key.id(),
            RingKey::Sub(key) => key.id(),
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            RingKey::Primary(key) => key.fingerprint(),
            RingKey::Sub(key) => key.fingerprint(),
        }
    }

    pub fn role(&self) -> KeyRole {
        match self {
            RingKey::Primary(_) => KeyRole::Primary,
            RingKey::Sub(_) => KeyRole::Sub,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, RingKey::Primary(_))
    }
}

impl<V: RingVariant> Clone for RingKey<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: RingVariant> Copy for RingKey<'_, V> {}

impl<V: RingVariant> fmt::Debug for RingKey<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingKey::Primary(key) => f.debug_tuple("Primary").field(key).finish(),
            RingKey::Sub(key) => f.debug_tuple("Sub").field(key).finish(),
        }
    }
}
