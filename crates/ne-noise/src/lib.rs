// Following the Noise protocol specification: noiseprotocol.org/noise.html

/// Symmetric key length for every supported cipher.
pub const KEY_SIZE: usize = ne_crypto::KEY_SIZE;
/// Pre-shared keys are always 32 bytes.
pub const PSK_LEN: usize = 32;
/// Largest handshake or transport message Noise allows.
pub const MAX_MESSAGE_LEN: usize = 65535;

pub use ne_crypto::{
    CipherAlgorithm, DhAlgorithm, HashAlgorithm, RandomState, MAX_DH_LEN, MAX_HASH_LEN, TAG_SIZE,
};

mod noise;

pub use noise::{
    cipher_state::CipherState,
    dh_state::{DhState, FingerprintType, KeyType},
    handshake_pattern::{reverse_flags, HandshakePattern, HandshakeToken, PatternFlags},
    handshake_state::{Action, HandshakeState, Role},
    hash_state::HashState,
    noise_error::NoiseError,
    protocol_id::{ProtocolId, ProtocolPrefix},
    symmetric_state::SymmetricState,
};
