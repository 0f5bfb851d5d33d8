pub mod cipher_state;
pub mod dh_state;
pub mod handshake_pattern;
pub mod handshake_state;
pub mod hash_state;
pub mod noise_error;
pub mod protocol_id;
pub mod symmetric_state;
