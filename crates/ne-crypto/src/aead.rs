use crate::{CryptoError, Nonce, NonceOrder, KEY_SIZE, TAG_SIZE};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit},
    ChaCha20Poly1305,
};
use zeroize::Zeroize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CipherAlgorithm {
    /// ChaCha20-Poly1305, counter encoded little-endian
    ChaChaPoly,
    /// AES-256-GCM, counter encoded big-endian
    AesGcm,
}

impl CipherAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            CipherAlgorithm::ChaChaPoly => "ChaChaPoly",
            CipherAlgorithm::AesGcm => "AESGCM",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ChaChaPoly" => Some(CipherAlgorithm::ChaChaPoly),
            "AESGCM" => Some(CipherAlgorithm::AesGcm),
            _ => None,
        }
    }

    pub fn key_len(&self) -> usize {
        KEY_SIZE
    }

    pub fn mac_len(&self) -> usize {
        TAG_SIZE
    }

    /// Builds the 96-bit nonce for counter `n` in this algorithm's byte order.
    pub fn nonce(&self, n: u64) -> Nonce {
        match self {
            CipherAlgorithm::ChaChaPoly => Nonce::new(n, NonceOrder::LittleEndian),
            CipherAlgorithm::AesGcm => Nonce::new(n, NonceOrder::BigEndian),
        }
    }
}

/// Writes `ciphertext || tag` into `dest`, which needs `plaintext.len() + TAG_SIZE` bytes.
pub fn encrypt(
    algorithm: CipherAlgorithm,
    dest: &mut [u8],
    plaintext: &[u8],
    key: &[u8],
    nonce: &Nonce,
    associated_data: &[u8],
) -> Result<(), CryptoError> {
    let p_len = plaintext.len();
    if dest.len() < p_len + TAG_SIZE {
        return Err(CryptoError::DestTooSmall);
    }
    dest[..p_len].copy_from_slice(plaintext);
    let result = match algorithm {
        CipherAlgorithm::ChaChaPoly => {
            seal::<ChaCha20Poly1305>(key, nonce, associated_data, &mut dest[..p_len])
        }
        CipherAlgorithm::AesGcm => seal::<Aes256Gcm>(key, nonce, associated_data, &mut dest[..p_len]),
    };
    match result {
        Ok(tag) => {
            dest[p_len..p_len + TAG_SIZE].copy_from_slice(&tag);
            Ok(())
        }
        Err(e) => {
            dest.zeroize();
            Err(e)
        }
    }
}

/// Verifies and decrypts `ciphertext || tag` into `dest`.
/// On a tag mismatch nothing but zeros is left in `dest`.
pub fn decrypt(
    algorithm: CipherAlgorithm,
    dest: &mut [u8],
    ciphertext: &[u8],
    key: &[u8],
    nonce: &Nonce,
    associated_data: &[u8],
) -> Result<(), CryptoError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::InvalidLength);
    }
    let (data, tag) = ciphertext.split_at(ciphertext.len() - TAG_SIZE);
    if dest.len() < data.len() {
        return Err(CryptoError::DestTooSmall);
    }

    let buffer = &mut dest[..data.len()];
    buffer.copy_from_slice(data);
    let result = match algorithm {
        CipherAlgorithm::ChaChaPoly => {
            open::<ChaCha20Poly1305>(key, nonce, associated_data, buffer, tag)
        }
        CipherAlgorithm::AesGcm => open::<Aes256Gcm>(key, nonce, associated_data, buffer, tag),
    };
    if result.is_err() {
        buffer.zeroize();
    }
    result
}

fn seal<A: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &Nonce,
    associated_data: &[u8],
    buffer: &mut [u8],
) -> Result<[u8; TAG_SIZE], CryptoError> {
    let cipher = <A as KeyInit>::new_from_slice(key)?;
    let tag = cipher
        .encrypt_in_place_detached(
            GenericArray::from_slice(nonce.as_bytes()),
            associated_data,
            buffer,
        )
        .map_err(|_| CryptoError::EncryptionError)?;
    let mut out = [0u8; TAG_SIZE];
    out.copy_from_slice(&tag);
    Ok(out)
}

fn open<A: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &Nonce,
    associated_data: &[u8],
    buffer: &mut [u8],
    tag: &[u8],
) -> Result<(), CryptoError> {
    let cipher = <A as KeyInit>::new_from_slice(key)?;
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce.as_bytes()),
            associated_data,
            buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| CryptoError::MacFailure)
}
