//! Core types of the provider boundary.

mod keys;
pub use keys::*;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Deref;

/// Represents a 64-bit `OpenPGP`-style key id.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct KeyId(pub u64);

impl Display for KeyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl<T: Into<u64>> From<T> for KeyId {
    fn from(value: T) -> Self {
        Self(value.into())
    }
}

impl KeyId {
    /// Encodes the key id to lower-case hexadecimal format.
    pub fn to_hex(&self) -> String {
        format!("{:x}", self.0)
    }

    /// Creates a `KeyId` from a hex encoded string.
    pub fn from_hex(hex: impl AsRef<str>) -> crate::Result<Self> {
        u64::from_str_radix(hex.as_ref(), 16)
            .map(KeyId)
            .map_err(Into::into)
    }
}

/// Represents a key fingerprint encoded in lower-case hexadecimal format.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Default)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(fingerprint: String) -> Self {
        if fingerprint.chars().all(char::is_lowercase) {
            return Self(fingerprint);
        }
        Self(fingerprint.to_lowercase())
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Fingerprint {
    fn from(v: String) -> Self {
        Self::new(v)
    }
}

impl From<&str> for Fingerprint {
    fn from(v: &str) -> Self {
        Self::new(v.into())
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Represents an `OpenPGP`-style user identity attached to a primary key.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Hash, Clone)]
pub struct UserId(pub String);

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T: Into<String>> From<T> for UserId {
    fn from(value: T) -> Self {
        Self(value.into())
    }
}

impl Deref for UserId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

/// The elliptic curve used for ECC key material.
#[derive(Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum EccCurve {
    #[default]
    Curve25519,
    NistP256,
}

/// The modulus length used for RSA key material.
#[derive(Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum RsaLength {
    Rsa2048,
    #[default]
    Rsa3072,
    Rsa4096,
}

/// The key algorithm family with its length or curve choice.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum KeyAlgorithm {
    /// Keys generated will be for use with elliptic curve cryptography.
    Ecc(EccCurve),
    /// A key with RSA.
    Rsa(RsaLength),
}

impl Default for KeyAlgorithm {
    fn default() -> Self {
        KeyAlgorithm::Ecc(EccCurve::default())
    }
}

/// Generation parameters for a single key.
#[derive(Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct KeySpec {
    /// The key algorithm type that should be used.
    pub algorithm: KeyAlgorithm,
}

impl KeySpec {
    pub fn new(algorithm: KeyAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Set the key algorithm type that should be used.
    pub fn with_algorithm(mut self, algorithm: KeyAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}
