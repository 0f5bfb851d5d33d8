use crate::NoiseError;
use ne_crypto::{DhAlgorithm, RandomState, MAX_DH_LEN};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyType {
    None,
    Keypair,
    PublicOnly,
}

/// How much of the public key digest a fingerprint shows.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FingerprintType {
    /// First 16 bytes of SHA-256(public key)
    Basic,
    /// All 32 bytes of SHA-256(public key)
    Full,
}

/// A Diffie-Hellman keypair or bare public key for one curve.
/// Private key bytes are only meaningful while `key_type` is `Keypair`.
pub struct DhState {
    algorithm: DhAlgorithm,
    key_type: KeyType,
    private_key: [u8; MAX_DH_LEN],
    public_key: [u8; MAX_DH_LEN],
}

impl DhState {
    pub fn new(algorithm: DhAlgorithm) -> Self {
        Self {
            algorithm,
            key_type: KeyType::None,
            private_key: [0u8; MAX_DH_LEN],
            public_key: [0u8; MAX_DH_LEN],
        }
    }

    pub fn algorithm(&self) -> DhAlgorithm {
        self.algorithm
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn has_keypair(&self) -> bool {
        self.key_type == KeyType::Keypair
    }

    pub fn has_public_key(&self) -> bool {
        self.key_type != KeyType::None
    }

    pub fn private_key_len(&self) -> usize {
        self.algorithm.private_key_len()
    }

    pub fn public_key_len(&self) -> usize {
        self.algorithm.public_key_len()
    }

    pub fn shared_key_len(&self) -> usize {
        self.algorithm.shared_key_len()
    }

    /// Replaces whatever was held with a fresh keypair.
    pub fn generate_keypair(&mut self, rng: &mut RandomState) -> Result<(), NoiseError> {
        let len = self.private_key_len();
        self.clear_key();
        rng.fill(&mut self.private_key[..len])?;
        ne_crypto::derive_public_key(
            self.algorithm,
            &self.private_key[..len],
            &mut self.public_key[..len],
        )?;
        self.key_type = KeyType::Keypair;
        Ok(())
    }

    /// Imports a keypair after checking that the two halves belong together.
    pub fn set_keypair(&mut self, private_key: &[u8], public_key: &[u8]) -> Result<(), NoiseError> {
        if private_key.len() != self.private_key_len() || public_key.len() != self.public_key_len()
        {
            Err(NoiseError::InvalidLength)?
        }
        ne_crypto::validate_keypair(self.algorithm, private_key, public_key)?;
        self.private_key[..private_key.len()].copy_from_slice(private_key);
        self.public_key[..public_key.len()].copy_from_slice(public_key);
        self.key_type = KeyType::Keypair;
        Ok(())
    }

    /// Imports a private key and derives the public half.
    pub fn set_keypair_private(&mut self, private_key: &[u8]) -> Result<(), NoiseError> {
        let len = self.private_key_len();
        if private_key.len() != len {
            Err(NoiseError::InvalidLength)?
        }
        let mut public_key = [0u8; MAX_DH_LEN];
        ne_crypto::derive_public_key(self.algorithm, private_key, &mut public_key[..len])?;
        let result = self.set_keypair(private_key, &public_key[..len]);
        public_key.zeroize();
        result
    }

    pub fn set_public_key(&mut self, public_key: &[u8]) -> Result<(), NoiseError> {
        if public_key.len() != self.public_key_len() {
            Err(NoiseError::InvalidLength)?
        }
        ne_crypto::validate_public_key(self.algorithm, public_key)?;
        self.private_key.zeroize();
        self.public_key[..public_key.len()].copy_from_slice(public_key);
        self.key_type = KeyType::PublicOnly;
        Ok(())
    }

    pub fn public_key(&self) -> Result<&[u8], NoiseError> {
        match self.key_type {
            KeyType::None => Err(NoiseError::NotSet),
            _ => Ok(&self.public_key[..self.public_key_len()]),
        }
    }

    /// Private key bytes for application persistence. `NotSet` unless a keypair is held.
    pub fn private_key(&self) -> Result<&[u8], NoiseError> {
        match self.key_type {
            KeyType::Keypair => Ok(&self.private_key[..self.private_key_len()]),
            _ => Err(NoiseError::NotSet),
        }
    }

    pub fn clear_key(&mut self) {
        self.private_key.zeroize();
        self.public_key.zeroize();
        self.key_type = KeyType::None;
    }

    /// Constant-time comparison of the public keys held by two states of the same curve.
    pub fn is_equal_public(&self, other: &DhState) -> bool {
        self.algorithm == other.algorithm
            && self.has_public_key()
            && other.has_public_key()
            && ne_crypto::is_equal(
                &self.public_key[..self.public_key_len()],
                &other.public_key[..other.public_key_len()],
            )
    }

    /// DH(self.private_key, public_side.public_key) into `shared_key`.
    ///
    /// Runs the full calculation even when a key turns out to be invalid; the error is
    /// only reported once the (zeroed) output has been written.
    pub fn calculate(&self, public_side: &DhState, shared_key: &mut [u8]) -> Result<(), NoiseError> {
        if self.key_type != KeyType::Keypair || public_side.key_type == KeyType::None {
            Err(NoiseError::NotSet)?
        }
        if self.algorithm != public_side.algorithm {
            Err(NoiseError::NotApplicable)?
        }
        let len = self.shared_key_len();
        if shared_key.len() < len {
            Err(NoiseError::InvalidLength)?
        }
        Ok(ne_crypto::calculate(
            self.algorithm,
            &self.private_key[..self.private_key_len()],
            &public_side.public_key[..public_side.public_key_len()],
            &mut shared_key[..len],
        )?)
    }

    /// Colon-separated hex of SHA-256(public key).
    pub fn fingerprint(&self, fingerprint_type: FingerprintType) -> Result<String, NoiseError> {
        let digest = Sha256::digest(self.public_key()?);
        let len = match fingerprint_type {
            FingerprintType::Basic => 16,
            FingerprintType::Full => 32,
        };
        Ok(digest[..len]
            .iter()
            .map(|b| hex::encode([*b]))
            .collect::<Vec<_>>()
            .join(":"))
    }
}

impl Drop for DhState {
    fn drop(&mut self) {
        self.private_key.zeroize();
        self.public_key.zeroize();
    }
}

impl std::fmt::Debug for DhState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhState")
            .field("algorithm", &self.algorithm)
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{DhState, FingerprintType, KeyType, NoiseError};
    use ne_crypto::{DhAlgorithm, RandomState};

    fn generated(algorithm: DhAlgorithm, rng: &mut RandomState) -> DhState {
        let mut state = DhState::new(algorithm);
        state.generate_keypair(rng).unwrap();
        state
    }

    #[test]
    fn generate_and_agree() {
        let mut rng = RandomState::from_seed([1u8; 32]);
        for algorithm in [DhAlgorithm::Curve25519, DhAlgorithm::Curve448] {
            let a = generated(algorithm, &mut rng);
            let b = generated(algorithm, &mut rng);
            assert_eq!(a.key_type(), KeyType::Keypair);

            let mut ab = [0u8; 56];
            let mut ba = [0u8; 56];
            a.calculate(&b, &mut ab).unwrap();
            b.calculate(&a, &mut ba).unwrap();
            assert_eq!(ab, ba);
            assert_eq!(a.public_key().unwrap().len(), algorithm.public_key_len());
        }
    }

    #[test]
    fn import_keypair_and_public() {
        let mut rng = RandomState::from_seed([2u8; 32]);
        let original = generated(DhAlgorithm::Curve25519, &mut rng);

        let mut copy = DhState::new(DhAlgorithm::Curve25519);
        copy.set_keypair_private(original.private_key().unwrap()).unwrap();
        assert!(copy.is_equal_public(&original));

        let mut public = DhState::new(DhAlgorithm::Curve25519);
        public
            .set_public_key(original.public_key().unwrap())
            .unwrap();
        assert_eq!(public.key_type(), KeyType::PublicOnly);
        assert_eq!(public.private_key(), Err(NoiseError::NotSet));
        assert!(public.is_equal_public(&original));

        let mut mismatched = DhState::new(DhAlgorithm::Curve25519);
        let other = generated(DhAlgorithm::Curve25519, &mut rng);
        assert_eq!(
            mismatched.set_keypair(original.private_key().unwrap(), other.public_key().unwrap()),
            Err(NoiseError::InvalidPublicKey)
        );
        assert_eq!(mismatched.key_type(), KeyType::None);
    }

    #[test]
    fn rejects_bad_public_keys() {
        let mut state = DhState::new(DhAlgorithm::Curve25519);
        assert_eq!(state.set_public_key(&[0u8; 31]), Err(NoiseError::InvalidLength));
        assert_eq!(state.set_public_key(&[0u8; 32]), Err(NoiseError::InvalidPublicKey));
        assert_eq!(state.public_key(), Err(NoiseError::NotSet));
    }

    #[test]
    fn calculate_needs_keys_and_matching_curves() {
        let mut rng = RandomState::from_seed([3u8; 32]);
        let local = generated(DhAlgorithm::Curve25519, &mut rng);
        let empty = DhState::new(DhAlgorithm::Curve25519);
        let other_curve = generated(DhAlgorithm::Curve448, &mut rng);
        let mut out = [0u8; 56];
        assert_eq!(local.calculate(&empty, &mut out), Err(NoiseError::NotSet));
        assert_eq!(empty.calculate(&local, &mut out), Err(NoiseError::NotSet));
        assert_eq!(
            local.calculate(&other_curve, &mut out),
            Err(NoiseError::NotApplicable)
        );
    }

    #[test]
    fn clear_key_forgets_everything() {
        let mut rng = RandomState::from_seed([4u8; 32]);
        let mut state = generated(DhAlgorithm::Curve448, &mut rng);
        state.clear_key();
        assert_eq!(state.key_type(), KeyType::None);
        assert!(!state.has_public_key());
        assert_eq!(state.private_key(), Err(NoiseError::NotSet));
    }

    #[test]
    fn fingerprints() {
        let mut rng = RandomState::from_seed([5u8; 32]);
        let state = generated(DhAlgorithm::Curve25519, &mut rng);
        let basic = state.fingerprint(FingerprintType::Basic).unwrap();
        let full = state.fingerprint(FingerprintType::Full).unwrap();
        assert_eq!(basic.len(), 16 * 3 - 1);
        assert_eq!(full.len(), 32 * 3 - 1);
        assert!(full.starts_with(&basic));
        assert_eq!(
            DhState::new(DhAlgorithm::Curve25519).fingerprint(FingerprintType::Full),
            Err(NoiseError::NotSet)
        );
    }
}
