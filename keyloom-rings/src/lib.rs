//! Key ring integrity and collection indexing.
//!
//! A key ring bundles one primary key with zero or more subordinate keys,
//! each subkey attached to the primary through a binding certification.
//! This crate decides which subkeys of a ring are validly bound to a
//! trusted primary key, produces cleaned rings that preserve the encoding
//! of everything that passes, and indexes many rings of one kind into a
//! collection with deterministic lookup and iteration.
//!
//! All asymmetric cryptography is consumed through the
//! [`keyloom_crypto::crypto::RingProvider`] boundary.

pub mod collection;
pub mod errors;
pub mod keys;
pub mod rings;

// Re-export the provider boundary crate.
pub use keyloom_crypto;
