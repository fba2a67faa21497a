//! Decides which subkeys of a ring are validly bound to a trusted primary
//! key and produces cleaned rings.

use keyloom_crypto::crypto::{Certification, Fingerprint, KeyId, RingProvider};

use crate::keys::{PrimaryKey, RingVariant, Subkey};
use crate::rings::Ring;

/// Why a subkey was removed from a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The subkey carries no certifications at all.
    Uncertified,
    /// Certifications exist but none was issued by the trusted primary key.
    ForeignIssuer,
    /// A certification from the trusted primary exists but binds a
    /// different subject.
    SubjectMismatch,
    /// An identifier-consistent certification failed cryptographic
    /// verification.
    InvalidSignature,
}

/// A subkey removed while cleaning a ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedSubkey {
    pub id: KeyId,
    pub fingerprint: Fingerprint,
    pub reason: DropReason,
}

/// The outcome of cleaning a ring.
///
/// Dropping subkeys never fails the operation; callers that need
/// auditability enumerate `dropped`.
#[derive(Debug, Clone)]
pub struct CleanedRing<V: RingVariant> {
    /// The cleaned ring: the primary key plus all validly bound subkeys in
    /// their original relative order.
    pub ring: Ring<V>,
    /// The subkeys that were removed, with the reason for each.
    pub dropped: Vec<DroppedSubkey>,
}

impl<V: RingVariant> CleanedRing<V> {
    pub fn into_ring(self) -> Ring<V> {
        self.ring
    }

    /// Indicates that every subkey of the input survived.
    pub fn is_unchanged(&self) -> bool {
        self.dropped.is_empty()
    }
}

impl<V: RingVariant> From<CleanedRing<V>> for Ring<V> {
    fn from(value: CleanedRing<V>) -> Self {
        value.ring
    }
}

impl<V: RingVariant> Ring<V> {
    /// Produces a new ring containing the primary key and only the subkeys
    /// validly bound to `trusted_primary`.
    ///
    /// A subkey is retained iff at least one of its certifications names
    /// `trusted_primary` as issuer and the subkey itself as subject.
    /// Retained subkeys keep all their certifications and their original
    /// encoding; the primary key is always retained. The input ring is not
    /// modified.
    ///
    /// The trusted anchor may belong to either ring variant, so a secret
    /// ring can be audited against a public anchor. Anchors whose key id
    /// does not match any certification simply drop every subkey; an
    /// all-primary ring is a valid result.
    ///
    /// Binding is decided by identifier matching only. Use
    /// [`Ring::clean_verified`] to additionally require cryptographic
    /// verification of the certification.
    pub fn clean<W: RingVariant>(&self, trusted_primary: &PrimaryKey<W>) -> CleanedRing<V> {
        self.clean_with(trusted_primary.id(), |_| true)
    }

    /// Like [`Ring::clean`], but a subkey is only retained if an
    /// identifier-consistent certification also verifies cryptographically
    /// against the trusted primary's public key.
    pub fn clean_verified<W: RingVariant, P: RingProvider>(
        &self,
        trusted_primary: &PrimaryKey<W>,
        provider: &P,
    ) -> CleanedRing<V> {
        let issuer_public = trusted_primary.public_material();
        self.clean_with(trusted_primary.id(), |certification| {
            provider.verify(certification, issuer_public)
        })
    }

    fn clean_with(
        &self,
        trusted_id: KeyId,
        mut verify: impl FnMut(&Certification) -> bool,
    ) -> CleanedRing<V> {
        let mut retained = Vec::with_capacity(self.subkeys().len());
        let mut dropped = Vec::new();
        for subkey in self.subkeys() {
            match binding_check(subkey, trusted_id, &mut verify) {
                Ok(()) => retained.push(subkey.clone()),
                Err(reason) => dropped.push(DroppedSubkey {
                    id: subkey.id(),
                    fingerprint: subkey.fingerprint().clone(),
                    reason,
                }),
            }
        }
        CleanedRing {
            ring: Ring::new(self.primary().clone(), retained),
            dropped,
        }
    }
}

/// Scans a subkey's certifications for a valid binding to `trusted_id`.
///
/// On failure returns the most specific reason: an identifier-consistent
/// certification that failed verification outranks a subject mismatch,
/// which outranks certifications from foreign issuers.
fn binding_check<V: RingVariant>(
    subkey: &Subkey<V>,
    trusted_id: KeyId,
    verify: &mut impl FnMut(&Certification) -> bool,
) -> Result<(), DropReason> {
    if subkey.certifications().is_empty() {
        return Err(DropReason::Uncertified);
    }
    let mut trusted_issuer_seen = false;
    let mut id_consistent_seen = false;
    for certification in subkey.certifications() {
        if certification.issuer != trusted_id {
            continue;
        }
        trusted_issuer_seen = true;
        if certification.subject != subkey.id() {
            continue;
        }
        id_consistent_seen = true;
        if verify(certification) {
            return Ok(());
        }
    }
    if id_consistent_seen {
        Err(DropReason::InvalidSignature)
    } else if trusted_issuer_seen {
        Err(DropReason::SubjectMismatch)
    } else {
        Err(DropReason::ForeignIssuer)
    }
}
