pub const NONCE_SIZE: usize = 12;

/// Byte order used to encode the 64-bit counter into the nonce.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NonceOrder {
    LittleEndian,
    BigEndian,
}

/// Context (4 zero bytes) || Counter (8 bytes) - the Noise AEAD nonce layout
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Nonce {
    bytes: [u8; NONCE_SIZE],
}

impl Nonce {
    /// Creates a new `Nonce` from the counter `n`, encoded with `order`
    pub fn new(n: u64, order: NonceOrder) -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        match order {
            NonceOrder::LittleEndian => bytes[4..12].copy_from_slice(&n.to_le_bytes()),
            NonceOrder::BigEndian => bytes[4..12].copy_from_slice(&n.to_be_bytes()),
        }
        Self { bytes }
    }

    /// A nonce outside the Noise layout, for AEAD test vectors
    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns a reference to the `Nonce` bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.bytes
    }
}
