//! Identifier-indexed collections of same-variant key rings.

use std::collections::HashMap;
use std::fmt;

use keyloom_crypto::crypto::KeyId;

use crate::errors::CollectionError;
use crate::keys::{Public, RingVariant, Secret};
use crate::rings::Ring;

/// An ordered collection of key rings, indexed by each ring's primary key id.
///
/// Construction is a single-writer operation; the finished collection is
/// immutable and safe to share read-only across threads. Iteration follows
/// insertion order and is deterministic across reruns.
pub struct RingCollection<V: RingVariant> {
    rings: Vec<Ring<V>>,
    index: HashMap<KeyId, usize>,
}

/// A collection of secret rings.
pub type SecretRingCollection = RingCollection<Secret>;

/// A collection of public rings.
pub type PublicRingCollection = RingCollection<Public>;

impl<V: RingVariant> RingCollection<V> {
    /// Builds a collection from rings, keyed by primary key id.
    ///
    /// Fails if two rings share a primary key id; distinct rings are never
    /// silently merged under one identifier and no partial collection is
    /// produced.
    pub fn from_rings(
        rings: impl IntoIterator<Item = Ring<V>>,
    ) -> Result<Self, CollectionError> {
        let rings: Vec<Ring<V>> = rings.into_iter().collect();
        let mut index = HashMap::with_capacity(rings.len());
        for (position, ring) in rings.iter().enumerate() {
            let id = ring.primary().id();
            if index.insert(id, position).is_some() {
                return Err(CollectionError::DuplicatePrimaryKey(id));
            }
        }
        Ok(Self { rings, index })
    }

    /// Exact-match lookup by primary key id.
    ///
    /// Subkey ids are not valid lookup keys at the collection level; the
    /// ring is the unit of storage.
    pub fn get(&self, id: KeyId) -> Option<&Ring<V>> {
        self.index.get(&id).map(|&position| &self.rings[position])
    }

    /// Iterates over the rings in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Ring<V>> {
        self.rings.iter()
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Encodes all member rings in insertion order.
    ///
    /// Unmodified rings re-encode bit-identically, see [`Ring::to_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for ring in &self.rings {
            out.extend_from_slice(&ring.to_bytes());
        }
        out
    }
}

impl<'a, V: RingVariant> IntoIterator for &'a RingCollection<V> {
    type Item = &'a Ring<V>;
    type IntoIter = std::slice::Iter<'a, Ring<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: RingVariant> IntoIterator for RingCollection<V> {
    type Item = Ring<V>;
    type IntoIter = std::vec::IntoIter<Ring<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rings.into_iter()
    }
}

impl<V: RingVariant> Clone for RingCollection<V> {
    fn clone(&self) -> Self {
        Self {
            rings: self.rings.clone(),
            index: self.index.clone(),
        }
    }
}

impl<V: RingVariant> fmt::Debug for RingCollection<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingCollection")
            .field("kind", &V::KIND)
            .field("rings", &self.rings)
            .finish()
    }
}
