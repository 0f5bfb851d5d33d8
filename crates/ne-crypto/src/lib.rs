mod aead;
mod ct;
mod dh;
mod hash;
mod hkdf;
mod keys;
mod nonce;
mod random;

pub use aead::{decrypt, encrypt, CipherAlgorithm};
pub use ct::{cmove_zero, is_equal, is_zero};
pub use dh::{calculate, derive_public_key, validate_keypair, validate_public_key, DhAlgorithm};
pub use hash::{hkdf, HashAlgorithm, HashBuf};
pub use hkdf::Hkdf;
pub use keys::{KEY_SIZE, TAG_SIZE};
pub use nonce::{Nonce, NonceOrder, NONCE_SIZE};
pub use random::{fill_random, RandomState, RESEED_INTERVAL};

/// Largest hash output across the supported hash algorithms.
pub const MAX_HASH_LEN: usize = 64;
/// Largest private, public or shared key across the supported curves.
pub const MAX_DH_LEN: usize = 56;

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length")]
    InvalidKeyLength,
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("message authentication failed")]
    MacFailure,
    #[error("encryption failed")]
    EncryptionError,
    #[error("destination buffer too small")]
    DestTooSmall,
    #[error("invalid input length")]
    InvalidLength,
    #[error("requested HKDF output is too long")]
    HkdfExpandTooLong,
    #[error("operating system random source failed")]
    OsRngError,
}
