use std::fmt;

use zeroize::Zeroizing;

use super::{Fingerprint, KeyAlgorithm, KeyId, KeySpec, UserId};

/// Opaque public key material produced by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial(Vec<u8>);

impl PublicKeyMaterial {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for PublicKeyMaterial {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Secret key material together with its public half.
///
/// The secret half is zeroized on drop and redacted from debug output.
#[derive(Clone)]
pub struct SecretKeyMaterial {
    public: PublicKeyMaterial,
    secret: Zeroizing<Vec<u8>>,
}

impl SecretKeyMaterial {
    pub fn new(public: PublicKeyMaterial, secret: Vec<u8>) -> Self {
        Self {
            public,
            secret: Zeroizing::new(secret),
        }
    }

    /// Returns the public half of the key pair.
    pub fn public(&self) -> &PublicKeyMaterial {
        &self.public
    }

    /// Exposes the raw secret bytes.
    ///
    /// Callers must not copy these bytes into unprotected buffers.
    pub fn expose_secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for SecretKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKeyMaterial")
            .field("public", &self.public)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A user identity together with its wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdPacket {
    /// The user identity value.
    pub value: UserId,
    /// The encoded user id packet.
    pub bytes: Vec<u8>,
}

/// A binding certification issued by one key over another key's identifier.
///
/// The core only inspects the issuer and subject identifiers; the signature
/// bytes are carried opaquely for re-serialization and for cryptographic
/// verification through a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certification {
    /// Key id of the key that issued the certification.
    pub issuer: KeyId,
    /// Key id of the key the certification binds.
    pub subject: KeyId,
    /// The encoded certification packet.
    pub bytes: Vec<u8>,
}

/// Tags a component key as the ring's primary key or a subordinate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Primary,
    Sub,
}

/// The outcome of one key generation event.
///
/// Carries both the secret and the public wire encoding so that a secret
/// ring and a public ring derived from the same event report the same key
/// identifiers.
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    /// Primary or subordinate key.
    pub role: KeyRole,
    /// The key id, derived from the fingerprint.
    pub id: KeyId,
    /// The key fingerprint.
    pub fingerprint: Fingerprint,
    /// The algorithm the key was generated with.
    pub algorithm: KeyAlgorithm,
    /// The generated key pair material.
    pub material: SecretKeyMaterial,
    /// User identities bound to the key at generation time.
    pub user_ids: Vec<UserIdPacket>,
    /// Wire encoding of the secret key packet.
    pub secret_packet: Vec<u8>,
    /// Wire encoding of the public key packet.
    pub public_packet: Vec<u8>,
}

/// A key packet recovered from an encoded key ring.
#[derive(Debug, Clone)]
pub struct ParsedKey {
    /// Primary or subordinate key.
    pub role: KeyRole,
    /// The key id, derived from the fingerprint.
    pub id: KeyId,
    /// The key fingerprint.
    pub fingerprint: Fingerprint,
    /// The algorithm of the key.
    pub algorithm: KeyAlgorithm,
    /// The public key material.
    pub public: PublicKeyMaterial,
    /// The key pair material, present when a secret key packet was parsed.
    pub secret: Option<SecretKeyMaterial>,
    /// The original wire encoding of this packet.
    pub bytes: Vec<u8>,
}

/// One packet of an encoded key ring.
#[derive(Debug, Clone)]
pub enum Packet {
    Key(ParsedKey),
    UserId(UserIdPacket),
    Certification(Certification),
}

/// Errors produced while splitting an encoded key ring into packets.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PacketParseError {
    #[error("packet stream ended in the middle of a packet")]
    Truncated,
    #[error("unknown packet tag {0:#04x}")]
    UnknownTag(u8),
    #[error("packet payload is malformed: {0}")]
    InvalidPayload(&'static str),
}

impl From<PacketParseError> for crate::CryptoError {
    fn from(value: PacketParseError) -> Self {
        Self(std::sync::Arc::new(value))
    }
}

/// The capability interface the key ring core consumes.
///
/// Implementations own all asymmetric cryptography: key material creation,
/// binding signature issuance and verification, and the packet wire format.
/// The core never constructs certification bytes itself.
pub trait RingProvider {
    /// Generates a fresh primary key with the given user identities.
    fn generate_primary(&self, spec: &KeySpec, user_ids: &[UserId]) -> crate::Result<GeneratedKey>;

    /// Generates a fresh subordinate key.
    fn generate_subkey(&self, spec: &KeySpec) -> crate::Result<GeneratedKey>;

    /// Issues a binding certification from `issuer` over `subject`.
    fn certify(&self, issuer: &GeneratedKey, subject: KeyId) -> crate::Result<Certification>;

    /// Cryptographically verifies a certification against the issuer's public key.
    ///
    /// Returns `false` for any certification that was not produced by the
    /// key behind `issuer_public`, including malformed ones.
    fn verify(&self, certification: &Certification, issuer_public: &PublicKeyMaterial) -> bool;

    /// Splits an encoded key ring into its packets.
    fn parse_packets(&self, bytes: &[u8]) -> crate::Result<Vec<Packet>>;
}
