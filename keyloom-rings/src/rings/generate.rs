//! Ring generation front-end over a [`RingProvider`].

use keyloom_crypto::crypto::{KeySpec, RingProvider, UserId};

use crate::errors::GenerateRingError;
use crate::keys::{PrimaryKey, Public, Secret, Subkey};
use crate::rings::{PublicRing, Ring, SecretRing};

/// A freshly generated key ring in both variants.
///
/// Both rings are assembled from the same generation events, so they report
/// the same key identifiers in the same relative order.
#[derive(Debug, Clone)]
pub struct GeneratedRing {
    pub secret: SecretRing,
    pub public: PublicRing,
}

/// Builder that generates a key ring through a provider.
///
/// Generates one primary key with the configured user identities, then one
/// subkey per configured spec, each bound to the primary through a
/// certification issued by the primary key.
pub struct RingGenerator<'a, P: RingProvider> {
    provider: &'a P,
    primary_spec: KeySpec,
    user_ids: Vec<UserId>,
    subkey_specs: Vec<KeySpec>,
}

impl<'a, P: RingProvider> RingGenerator<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            primary_spec: KeySpec::default(),
            user_ids: Vec::new(),
            subkey_specs: Vec::new(),
        }
    }

    /// Set the generation spec for the primary key.
    pub fn with_primary_spec(mut self, spec: KeySpec) -> Self {
        self.primary_spec = spec;
        self
    }

    /// Add a user identity to the primary key that will be generated.
    pub fn with_user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_ids.push(user_id.into());
        self
    }

    /// Add a subkey to the ring that will be generated.
    pub fn with_subkey(mut self, spec: KeySpec) -> Self {
        self.subkey_specs.push(spec);
        self
    }

    /// Generates the key ring.
    pub fn generate(self) -> Result<GeneratedRing, GenerateRingError> {
        let primary = self
            .provider
            .generate_primary(&self.primary_spec, &self.user_ids)
            .map_err(GenerateRingError::PrimaryGeneration)?;

        let mut secret_subkeys = Vec::with_capacity(self.subkey_specs.len());
        let mut public_subkeys = Vec::with_capacity(self.subkey_specs.len());
        for spec in &self.subkey_specs {
            let subkey = self
                .provider
                .generate_subkey(spec)
                .map_err(GenerateRingError::SubkeyGeneration)?;
            let certification = self
                .provider
                .certify(&primary, subkey.id)
                .map_err(|err| GenerateRingError::Certify(subkey.id, err))?;
            secret_subkeys.push(Subkey::<Secret>::from_generated(
                &subkey,
                vec![certification.clone()],
            ));
            public_subkeys.push(Subkey::<Public>::from_generated(
                &subkey,
                vec![certification],
            ));
        }

        Ok(GeneratedRing {
            secret: Ring::new(PrimaryKey::<Secret>::from_generated(&primary), secret_subkeys),
            public: Ring::new(PrimaryKey::<Public>::from_generated(&primary), public_subkeys),
        })
    }
}
