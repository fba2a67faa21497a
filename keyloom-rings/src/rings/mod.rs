//! Key rings and their transformations.

mod generate;
pub use generate::*;
mod validator;
pub use validator::*;

use std::fmt;

use keyloom_crypto::crypto::{Certification, KeyId, KeyRole, Packet, ParsedKey, RingProvider};

use crate::errors::{DecodeRingError, MalformedRingError};
use crate::keys::{PrimaryKey, Public, RingKey, RingVariant, Secret, Subkey};

/// An ordered aggregate of one primary key and its subordinate keys.
///
/// Iteration places the primary key first and keeps subkeys in their
/// original relative order; transformations that do not explicitly reorder
/// preserve this order. A ring always has a primary key, rings decoded from
/// packet streams without one are rejected at construction.
pub struct Ring<V: RingVariant> {
    primary: PrimaryKey<V>,
    subkeys: Vec<Subkey<V>>,
}

/// A ring whose component keys carry private material.
pub type SecretRing = Ring<Secret>;

/// A ring without private material.
pub type PublicRing = Ring<Public>;

impl<V: RingVariant> Ring<V> {
    pub fn new(primary: PrimaryKey<V>, subkeys: Vec<Subkey<V>>) -> Self {
        Self { primary, subkeys }
    }

    pub fn primary(&self) -> &PrimaryKey<V> {
        &self.primary
    }

    pub fn subkeys(&self) -> &[Subkey<V>] {
        &self.subkeys
    }

    /// Number of component keys, the primary key included.
    pub fn key_count(&self) -> usize {
        1 + self.subkeys.len()
    }

    /// Iterates over all component keys, primary key first.
    ///
    /// The iterator is finite and restartable; calling `keys` again yields
    /// the same order.
    pub fn keys(&self) -> impl Iterator<Item = RingKey<'_, V>> + Clone {
        std::iter::once(RingKey::Primary(&self.primary))
            .chain(self.subkeys.iter().map(RingKey::Sub))
    }

    /// Looks up a component key by its exact key id.
    pub fn key_by_id(&self, id: KeyId) -> Option<RingKey<'_, V>> {
        self.keys().find(|key| key.id() == id)
    }

    /// Returns a new ring with `subkey` appended; `self` is unchanged.
    pub fn with_subkey(&self, subkey: Subkey<V>) -> Self {
        let mut subkeys = self.subkeys.clone();
        subkeys.push(subkey);
        Self {
            primary: self.primary.clone(),
            subkeys,
        }
    }

    /// Encodes the ring by concatenating the stored packet encodings in
    /// ring order.
    ///
    /// Components keep the encodings they were built with, so a ring that
    /// lost no component re-encodes bit-identically to its source.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.primary.encode_into(&mut out);
        for subkey in &self.subkeys {
            subkey.encode_into(&mut out);
        }
        out
    }

    /// Assembles a ring from a packet stream.
    ///
    /// The stream must follow the ring grammar
    /// `primary-key user-id* (subkey certification*)*`; certifications
    /// attach to the directly preceding subkey.
    pub fn from_packets(packets: Vec<Packet>) -> Result<Self, MalformedRingError> {
        let mut packets = packets.into_iter();
        let primary_key = match packets.next() {
            Some(Packet::Key(key)) if key.role == KeyRole::Primary => key,
            _ => return Err(MalformedRingError::NoPrimaryKey),
        };

        let mut user_ids = Vec::new();
        let mut subkeys = Vec::new();
        let mut current: Option<(ParsedKey, Vec<Certification>)> = None;

        for packet in packets {
            match packet {
                Packet::UserId(user_id) => {
                    if current.is_some() {
                        return Err(MalformedRingError::MisplacedUserId);
                    }
                    user_ids.push(user_id);
                }
                Packet::Key(key) => {
                    if key.role == KeyRole::Primary {
                        return Err(MalformedRingError::TrailingPrimaryKey(key.id));
                    }
                    if let Some((parsed, certifications)) = current.take() {
                        subkeys.push(Subkey::from_parsed(&parsed, certifications)?);
                    }
                    current = Some((key, Vec::new()));
                }
                Packet::Certification(certification) => match current.as_mut() {
                    Some((_, certifications)) => certifications.push(certification),
                    None => {
                        return Err(MalformedRingError::DanglingCertification(
                            certification.issuer,
                        ))
                    }
                },
            }
        }
        if let Some((parsed, certifications)) = current.take() {
            subkeys.push(Subkey::from_parsed(&parsed, certifications)?);
        }

        let primary = PrimaryKey::from_parsed(&primary_key, user_ids)?;
        Ok(Self { primary, subkeys })
    }

    /// Decodes a ring from its wire encoding through a provider.
    pub fn decode<P: RingProvider>(provider: &P, bytes: &[u8]) -> Result<Self, DecodeRingError> {
        let packets = provider.parse_packets(bytes)?;
        Ok(Self::from_packets(packets)?)
    }
}

impl<V: RingVariant> Clone for Ring<V> {
    fn clone(&self) -> Self {
        Self {
            primary: self.primary.clone(),
            subkeys: self.subkeys.clone(),
        }
    }
}

impl<V: RingVariant> fmt::Debug for Ring<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("kind", &V::KIND)
            .field("primary", &self.primary)
            .field("subkeys", &self.subkeys)
            .finish()
    }
}
