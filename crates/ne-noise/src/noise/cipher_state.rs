use crate::{NoiseError, KEY_SIZE};
use ne_crypto::{CipherAlgorithm, TAG_SIZE};
use zeroize::Zeroize;

/// One direction of AEAD traffic: a key and a 64-bit nonce counter.
///
/// The nonce `u64::MAX` is reserved for `rekey`, so reaching it ends the cipher for good.
pub struct CipherState {
    algorithm: CipherAlgorithm,
    key: [u8; KEY_SIZE],
    has_key: bool,
    n: u64,
    nonce_overflow: bool,
}

impl CipherState {
    pub fn new(algorithm: CipherAlgorithm) -> Self {
        Self {
            algorithm,
            key: [0u8; KEY_SIZE],
            has_key: false,
            n: 0,
            nonce_overflow: false,
        }
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    pub fn key_len(&self) -> usize {
        self.algorithm.key_len()
    }

    pub fn mac_len(&self) -> usize {
        self.algorithm.mac_len()
    }

    pub fn has_key(&self) -> bool {
        self.has_key
    }

    /// Sets the key from the first `KEY_SIZE` bytes of `key` and resets the nonce to zero.
    pub fn init_key(&mut self, key: &[u8]) -> Result<(), NoiseError> {
        if key.len() < KEY_SIZE {
            Err(NoiseError::InvalidLength)?
        }
        self.key.copy_from_slice(&key[..KEY_SIZE]);
        self.has_key = true;
        self.n = 0;
        self.nonce_overflow = false;
        Ok(())
    }

    pub fn nonce(&self) -> u64 {
        self.n
    }

    /// Moves the counter, for transports that carry explicit nonces.
    /// An exhausted cipher stays exhausted until `init_key`.
    pub fn set_nonce(&mut self, nonce: u64) -> Result<(), NoiseError> {
        if !self.has_key {
            Err(NoiseError::NotSet)?
        }
        self.n = nonce;
        Ok(())
    }

    fn check_nonce(&mut self) -> Result<(), NoiseError> {
        if !self.has_key {
            Err(NoiseError::NotSet)?
        }
        if self.nonce_overflow || self.n == u64::MAX {
            self.nonce_overflow = true;
            Err(NoiseError::NonceOverflow)?
        }
        Ok(())
    }

    /// ENCRYPT(k, n++, ad, plaintext), returning `ciphertext || tag`.
    pub fn encrypt_with_ad(
        &mut self,
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, NoiseError> {
        self.check_nonce()?;
        let mut ciphertext = vec![0u8; plaintext.len() + TAG_SIZE];
        ne_crypto::encrypt(
            self.algorithm,
            &mut ciphertext,
            plaintext,
            &self.key,
            &self.algorithm.nonce(self.n),
            associated_data,
        )?;
        self.n += 1;
        Ok(ciphertext)
    }

    /// DECRYPT(k, n++, ad, ciphertext). The counter only advances when the tag verifies.
    pub fn decrypt_with_ad(
        &mut self,
        associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, NoiseError> {
        self.check_nonce()?;
        if ciphertext.len() < TAG_SIZE {
            Err(NoiseError::InvalidLength)?
        }
        let mut plaintext = vec![0u8; ciphertext.len() - TAG_SIZE];
        ne_crypto::decrypt(
            self.algorithm,
            &mut plaintext,
            ciphertext,
            &self.key,
            &self.algorithm.nonce(self.n),
            associated_data,
        )?;
        self.n += 1;
        Ok(plaintext)
    }

    /// Transport encryption with empty associated data.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        self.encrypt_with_ad(&[], plaintext)
    }

    /// Transport decryption with empty associated data.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        self.decrypt_with_ad(&[], ciphertext)
    }

    /// REKEY: k = ENCRYPT(k, maxnonce, zerolen, zeros).
    /// The counter is left untouched.
    pub fn rekey(&mut self) -> Result<(), NoiseError> {
        if !self.has_key {
            Err(NoiseError::NotSet)?
        }
        let mut new_key_bytes = [0u8; KEY_SIZE + TAG_SIZE];
        let result = ne_crypto::encrypt(
            self.algorithm,
            &mut new_key_bytes,
            &[0u8; KEY_SIZE],
            &self.key,
            &self.algorithm.nonce(u64::MAX),
            &[],
        );
        if result.is_ok() {
            self.key.copy_from_slice(&new_key_bytes[..KEY_SIZE]);
        }
        new_key_bytes.zeroize();
        Ok(result?)
    }
}

impl Drop for CipherState {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for CipherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherState")
            .field("algorithm", &self.algorithm)
            .field("has_key", &self.has_key)
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{CipherState, NoiseError};
    use ne_crypto::CipherAlgorithm;

    fn keyed_pair(algorithm: CipherAlgorithm) -> (CipherState, CipherState) {
        let mut a = CipherState::new(algorithm);
        let mut b = CipherState::new(algorithm);
        a.init_key(&[0x42; 32]).unwrap();
        b.init_key(&[0x42; 32]).unwrap();
        (a, b)
    }

    #[test]
    fn unkeyed_cipher_refuses() {
        let mut cipher = CipherState::new(CipherAlgorithm::ChaChaPoly);
        assert!(!cipher.has_key());
        assert_eq!(cipher.encrypt(b"hi"), Err(NoiseError::NotSet));
        assert_eq!(cipher.decrypt(&[0u8; 16]), Err(NoiseError::NotSet));
        assert_eq!(cipher.rekey(), Err(NoiseError::NotSet));
        assert_eq!(cipher.set_nonce(3), Err(NoiseError::NotSet));
    }

    #[test]
    fn encrypt_decrypt_advances_nonce() {
        for algorithm in [CipherAlgorithm::ChaChaPoly, CipherAlgorithm::AesGcm] {
            let (mut tx, mut rx) = keyed_pair(algorithm);
            for msg in [&b""[..], b"one", b"two two"] {
                let ct = tx.encrypt_with_ad(b"ad", msg).unwrap();
                assert_eq!(ct.len(), msg.len() + 16);
                assert_eq!(rx.decrypt_with_ad(b"ad", &ct).unwrap(), msg);
            }
            assert_eq!(tx.nonce(), 3);
            assert_eq!(rx.nonce(), 3);
        }
    }

    #[test]
    fn mac_failure_keeps_nonce() {
        let (mut tx, mut rx) = keyed_pair(CipherAlgorithm::ChaChaPoly);
        let mut ct = tx.encrypt(b"payload").unwrap();
        ct[0] ^= 1;
        assert_eq!(rx.decrypt(&ct), Err(NoiseError::MacFailure));
        assert_eq!(rx.nonce(), 0);
        ct[0] ^= 1;
        assert_eq!(rx.decrypt(&ct).unwrap(), b"payload");
    }

    #[test]
    fn short_ciphertext() {
        let (_, mut rx) = keyed_pair(CipherAlgorithm::AesGcm);
        assert_eq!(rx.decrypt(&[0u8; 15]), Err(NoiseError::InvalidLength));
    }

    #[test]
    fn nonce_exhaustion_is_sticky() {
        let (mut tx, mut rx) = keyed_pair(CipherAlgorithm::ChaChaPoly);
        tx.set_nonce(u64::MAX - 1).unwrap();
        rx.set_nonce(u64::MAX - 1).unwrap();
        let ct = tx.encrypt(b"last").unwrap();
        assert_eq!(rx.decrypt(&ct).unwrap(), b"last");

        assert_eq!(tx.encrypt(b"more"), Err(NoiseError::NonceOverflow));
        assert_eq!(tx.encrypt(b"more"), Err(NoiseError::NonceOverflow));
        assert_eq!(rx.decrypt(&ct), Err(NoiseError::NonceOverflow));
        assert_eq!(tx.nonce(), u64::MAX);
        tx.set_nonce(0).unwrap();
        assert_eq!(tx.encrypt(b"more"), Err(NoiseError::NonceOverflow));

        tx.init_key(&[1u8; 32]).unwrap();
        assert_eq!(tx.nonce(), 0);
        assert!(tx.encrypt(b"fresh").is_ok());
    }

    #[test]
    fn rekey_changes_key_on_both_sides() {
        let (mut tx, mut rx) = keyed_pair(CipherAlgorithm::AesGcm);
        let (mut stale, _) = keyed_pair(CipherAlgorithm::AesGcm);
        tx.rekey().unwrap();
        rx.rekey().unwrap();
        assert_eq!(tx.nonce(), 0);

        let ct = tx.encrypt(b"x").unwrap();
        assert_eq!(stale.decrypt(&ct), Err(NoiseError::MacFailure));
        assert_eq!(rx.decrypt(&ct).unwrap(), b"x");
    }

    #[test]
    fn init_key_truncates() {
        let mut long = CipherState::new(CipherAlgorithm::ChaChaPoly);
        let mut exact = CipherState::new(CipherAlgorithm::ChaChaPoly);
        let mut material = [7u8; 64];
        material[40] = 1;
        long.init_key(&material).unwrap();
        exact.init_key(&material[..32]).unwrap();
        let ct = long.encrypt(b"k").unwrap();
        assert_eq!(exact.decrypt(&ct).unwrap(), b"k");
        assert_eq!(long.init_key(&[0u8; 16]), Err(NoiseError::InvalidLength));
    }
}
