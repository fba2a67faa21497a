use keyloom_crypto::crypto::{GeneratedKey, ParsedKey, PublicKeyMaterial, SecretKeyMaterial};

use crate::errors::MalformedRingError;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Secret {}
    impl Sealed for super::Public {}
}

/// The two kinds of key rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingKind {
    Secret,
    Public,
}

/// Type-level tag selecting the payload a ring's component keys carry.
///
/// Both variants share the ring structure and its invariants; only the key
/// material differs. The trait is sealed, [`Secret`] and [`Public`] are the
/// only variants.
pub trait RingVariant: sealed::Sealed + 'static {
    /// Key material carried by each component key of this ring kind.
    type Material: Clone + std::fmt::Debug + Send + Sync;

    const KIND: RingKind;

    /// Projects one generation event into this variant's material.
    fn material_from_generated(key: &GeneratedKey) -> Self::Material;

    /// Extracts this variant's material from a parsed key packet.
    fn material_from_parsed(key: &ParsedKey) -> Result<Self::Material, MalformedRingError>;

    /// Returns the public half of the material.
    ///
    /// Available for both variants, so any ring can serve as a trusted
    /// verification anchor.
    fn public_material(material: &Self::Material) -> &PublicKeyMaterial;

    /// Selects the wire encoding of a generated key for this ring kind.
    fn generated_packet(key: &GeneratedKey) -> &[u8];
}

/// Marker for rings whose component keys carry private material.
#[derive(Debug, Clone, Copy)]
pub enum Secret {}

/// Marker for rings without private material.
#[derive(Debug, Clone, Copy)]
pub enum Public {}

impl RingVariant for Secret {
    type Material = SecretKeyMaterial;

    const KIND: RingKind = RingKind::Secret;

    fn material_from_generated(key: &GeneratedKey) -> Self::Material {
        key.material.clone()
    }

    fn material_from_parsed(key: &ParsedKey) -> Result<Self::Material, MalformedRingError> {
        key.secret
            .clone()
            .ok_or(MalformedRingError::MissingSecretMaterial(key.id))
    }

    fn public_material(material: &Self::Material) -> &PublicKeyMaterial {
        material.public()
    }

    fn generated_packet(key: &GeneratedKey) -> &[u8] {
        &key.secret_packet
    }
}

impl RingVariant for Public {
    type Material = PublicKeyMaterial;

    const KIND: RingKind = RingKind::Public;

    fn material_from_generated(key: &GeneratedKey) -> Self::Material {
        key.material.public().clone()
    }

    fn material_from_parsed(key: &ParsedKey) -> Result<Self::Material, MalformedRingError> {
        if key.secret.is_some() {
            return Err(MalformedRingError::UnexpectedSecretMaterial(key.id));
        }
        Ok(key.public.clone())
    }

    fn public_material(material: &Self::Material) -> &PublicKeyMaterial {
        material
    }

    fn generated_packet(key: &GeneratedKey) -> &[u8] {
        &key.public_packet
    }
}
