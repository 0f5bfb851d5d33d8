use crate::{CryptoError, Hkdf, MAX_HASH_LEN};
use blake2::{Blake2b512, Blake2s256};
use digest::KeyInit;
use hmac::{Mac, SimpleHmac};
use sha2::{Sha256, Sha512};
use std::fmt;
use zeroize::Zeroize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HashAlgorithm {
    Blake2s,
    Blake2b,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake2s => "BLAKE2s",
            HashAlgorithm::Blake2b => "BLAKE2b",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "BLAKE2s" => Some(HashAlgorithm::Blake2s),
            "BLAKE2b" => Some(HashAlgorithm::Blake2b),
            "SHA256" => Some(HashAlgorithm::Sha256),
            "SHA512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }

    /// HASHLEN
    pub fn hash_len(&self) -> usize {
        match self {
            HashAlgorithm::Blake2s | HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Blake2b | HashAlgorithm::Sha512 => 64,
        }
    }

    /// BLOCKLEN
    pub fn block_len(&self) -> usize {
        match self {
            HashAlgorithm::Blake2s | HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Blake2b | HashAlgorithm::Sha512 => 128,
        }
    }
}

/// Fixed-capacity buffer holding one hash-sized value (a chaining key, handshake hash or HKDF output).
/// Only the first `len` bytes are meaningful; the whole buffer is wiped on drop.
#[derive(Clone)]
pub struct HashBuf {
    bytes: [u8; MAX_HASH_LEN],
    len: usize,
}

impl HashBuf {
    /// A zeroed buffer of `len` bytes, capped at `MAX_HASH_LEN`
    pub fn new(len: usize) -> Self {
        Self {
            bytes: [0u8; MAX_HASH_LEN],
            len: len.min(MAX_HASH_LEN),
        }
    }

    /// Copies at most `MAX_HASH_LEN` bytes from `data`
    pub fn from_slice(data: &[u8]) -> Self {
        let mut buf = Self::new(data.len());
        buf.bytes[..buf.len].copy_from_slice(&data[..buf.len]);
        buf
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for HashBuf {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Zeroize for HashBuf {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

impl Drop for HashBuf {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for HashBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashBuf").field("len", &self.len).finish_non_exhaustive()
    }
}

/// Noise `HKDF(chaining_key, input_key_material, K)` for `algorithm`, returning `K` outputs of HASHLEN bytes.
pub fn hkdf<const K: usize>(
    algorithm: HashAlgorithm,
    chaining_key: &[u8],
    input_key_material: &[u8],
) -> Result<[HashBuf; K], CryptoError> {
    match algorithm {
        HashAlgorithm::Blake2s => {
            hkdf_with::<SimpleHmac<Blake2s256>, 32, K>(chaining_key, input_key_material)
        }
        HashAlgorithm::Blake2b => {
            hkdf_with::<SimpleHmac<Blake2b512>, 64, K>(chaining_key, input_key_material)
        }
        HashAlgorithm::Sha256 => {
            hkdf_with::<SimpleHmac<Sha256>, 32, K>(chaining_key, input_key_material)
        }
        HashAlgorithm::Sha512 => {
            hkdf_with::<SimpleHmac<Sha512>, 64, K>(chaining_key, input_key_material)
        }
    }
}

fn hkdf_with<H: Mac + KeyInit, const N: usize, const K: usize>(
    chaining_key: &[u8],
    input_key_material: &[u8],
) -> Result<[HashBuf; K], CryptoError> {
    let mut keys = [[0u8; N]; K];
    let result = Hkdf::<H, N>::derive_keys(&mut keys, chaining_key, input_key_material, &[]);
    let outputs = std::array::from_fn(|i| HashBuf::from_slice(&keys[i]));
    keys.zeroize();
    result.map(|_| outputs)
}

#[cfg(test)]
mod tests {
    use crate::{hkdf, HashAlgorithm, HashBuf, MAX_HASH_LEN};

    const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Blake2s,
        HashAlgorithm::Blake2b,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
    ];

    #[test]
    fn lengths() {
        let lens: Vec<(usize, usize)> = ALL.iter().map(|a| (a.hash_len(), a.block_len())).collect();
        assert_eq!(lens, vec![(32, 64), (64, 128), (32, 64), (64, 128)]);
        assert!(ALL.iter().all(|a| a.hash_len() <= MAX_HASH_LEN));
    }

    #[test]
    fn names_round_trip() {
        for algorithm in ALL {
            assert_eq!(HashAlgorithm::from_name(algorithm.name()), Some(algorithm));
        }
        assert_eq!(HashAlgorithm::from_name("MD5"), None);
    }

    #[test]
    fn hkdf_outputs_are_hash_sized_and_distinct() {
        for algorithm in ALL {
            let ck = vec![3u8; algorithm.hash_len()];
            let [a, b, c] = hkdf::<3>(algorithm, &ck, b"ikm").unwrap();
            assert_eq!(a.len(), algorithm.hash_len());
            assert_eq!(c.len(), algorithm.hash_len());
            assert_ne!(a.as_slice(), b.as_slice());
            assert_ne!(b.as_slice(), c.as_slice());

            let [a2, b2] = hkdf::<2>(algorithm, &ck, b"ikm").unwrap();
            assert_eq!(a.as_slice(), a2.as_slice());
            assert_eq!(b.as_slice(), b2.as_slice());
        }
    }

    #[test]
    fn hash_buf_caps_length() {
        let buf = HashBuf::from_slice(&[9u8; 80]);
        assert_eq!(buf.len(), MAX_HASH_LEN);
        assert!(HashBuf::new(0).is_empty());
        assert_eq!(format!("{:?}", HashBuf::from_slice(&[1, 2])), "HashBuf { len: 2, .. }");
    }
}
