use keyloom_crypto::{crypto::KeyId, CryptoError};

/// A key ring that violates the structural ring grammar.
///
/// Rings are built from a packet stream of the form
/// `primary-key user-id* (subkey certification*)*`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MalformedRingError {
    #[error("key ring contains no primary key")]
    NoPrimaryKey,
    #[error("key ring contains a second primary key {0}")]
    TrailingPrimaryKey(KeyId),
    #[error("certification issued by {0} is not attached to any subkey")]
    DanglingCertification(KeyId),
    #[error("user id found after the first subkey")]
    MisplacedUserId,
    #[error("key {0} carries no secret material in a secret ring")]
    MissingSecretMaterial(KeyId),
    #[error("key {0} carries secret material in a public ring")]
    UnexpectedSecretMaterial(KeyId),
}

/// Errors when decoding a key ring from its wire encoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeRingError {
    #[error("failed to parse ring packets: {0}")]
    Parse(#[from] CryptoError),
    #[error(transparent)]
    Malformed(#[from] MalformedRingError),
}

/// Errors when building a ring collection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollectionError {
    #[error("two rings share the primary key id {0}")]
    DuplicatePrimaryKey(KeyId),
}

/// Errors when generating a fresh key ring through a provider.
#[derive(Debug, thiserror::Error)]
pub enum GenerateRingError {
    #[error("failed to generate the primary key: {0}")]
    PrimaryGeneration(CryptoError),
    #[error("failed to generate a subkey: {0}")]
    SubkeyGeneration(CryptoError),
    #[error("failed to certify subkey {0}: {1}")]
    Certify(KeyId, CryptoError),
}
