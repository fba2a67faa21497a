//! Provider boundary for OpenPGP-style key ring management.
//!
//! This crate defines the capability interface a key ring core consumes:
//! key generation, binding certification, certification verification and
//! packet parsing. The actual asymmetric cryptography lives behind the
//! [`crypto::RingProvider`] trait; the `soft` feature ships a deterministic
//! software provider intended for tests and reference use.

pub type Error = CryptoError;
pub type Result<T> = std::result::Result<T, Error>;

pub mod crypto;

#[cfg(feature = "soft")]
mod soft;
#[cfg(feature = "soft")]
pub use soft::SoftRingProvider;

use rand::RngCore as _;
use std::{
    fmt::{Display, Formatter},
    io,
    sync::Arc,
};

/// A generic error thrown by provider APIs.
#[derive(Clone, Debug)]
pub struct CryptoError(pub Arc<dyn std::error::Error + Send + Sync>);

impl std::error::Error for CryptoError {}

impl Display for CryptoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<std::num::ParseIntError> for CryptoError {
    fn from(value: std::num::ParseIntError) -> Self {
        Self(Arc::new(value))
    }
}

impl From<CryptoInfoError> for CryptoError {
    fn from(value: CryptoInfoError) -> Self {
        Self(Arc::new(value))
    }
}

impl From<io::Error> for CryptoError {
    fn from(value: io::Error) -> Self {
        Self(Arc::new(value))
    }
}

/// Simple string crypto error that converts to a [`CryptoError`].
#[derive(Debug, Clone)]
pub struct CryptoInfoError(pub(crate) String);

impl Display for CryptoInfoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CryptoInfoError {}

impl CryptoInfoError {
    /// Create a crypto error from an info string.
    pub fn new(info: &str) -> Self {
        Self(info.to_owned())
    }
}

/// Factory function to create the software [`crypto::RingProvider`].
#[cfg(feature = "soft")]
pub fn new_soft_provider() -> impl crypto::RingProvider {
    SoftRingProvider::new()
}

/// Generates random bytes with a cryptographically-secure random number generator (`CSPRNG`).
///
/// Uses [`rand::thread_rng()`] as CSPRNG.
pub fn generate_secure_random_bytes<const TOKEN_SIZE: usize>() -> [u8; TOKEN_SIZE] {
    let mut rng = rand::thread_rng();
    let mut out = [0; TOKEN_SIZE];
    rng.fill_bytes(&mut out);
    out
}
