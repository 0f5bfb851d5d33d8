use crate::CryptoError;

/// Symmetric key length shared by every supported cipher.
pub const KEY_SIZE: usize = 32;
/// Authentication tag length shared by every supported cipher.
pub const TAG_SIZE: usize = 16;

impl From<digest::InvalidLength> for CryptoError {
    fn from(_: digest::InvalidLength) -> Self {
        CryptoError::InvalidKeyLength
    }
}
