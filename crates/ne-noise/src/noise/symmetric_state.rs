use crate::{CipherState, HashState, NoiseError, ProtocolId};
use ne_crypto::HashBuf;
use zeroize::Zeroize;

/// Chaining key, handshake hash and the handshake cipher.
pub struct SymmetricState {
    id: ProtocolId,
    cipher: Option<CipherState>,
    hash: HashState,
    ck: HashBuf,
    h: HashBuf,
}

impl SymmetricState {
    /// InitializeSymmetric(protocol_name)
    pub fn initialize_symmetric(id: ProtocolId) -> Self {
        let mut hash = HashState::new(id.hash);
        let name = id.to_string();
        let hash_len = hash.hash_len();
        // Names that fit are zero padded, longer ones are hashed.
        let h = match name.len() {
            n if n <= hash_len => {
                let mut h = HashBuf::new(hash_len);
                h.as_mut_slice()[..n].copy_from_slice(name.as_bytes());
                h
            }
            _ => hash.hash(&[name.as_bytes()]),
        };
        Self {
            id,
            cipher: Some(CipherState::new(id.cipher)),
            hash,
            ck: h.clone(),
            h,
        }
    }

    fn cipher_mut(&mut self) -> Result<&mut CipherState, NoiseError> {
        self.cipher.as_mut().ok_or(NoiseError::InvalidState)
    }

    pub fn has_key(&self) -> bool {
        self.cipher.as_ref().is_some_and(|c| c.has_key())
    }

    pub fn mac_len(&self) -> usize {
        self.id.cipher.mac_len()
    }

    pub fn mix_key(&mut self, input_key_material: &[u8]) -> Result<(), NoiseError> {
        // Sets ck, temp_k = HKDF(ck, input_key_material, 2).
        let [ck, temp_k] = self.hash.hkdf::<2>(self.ck.as_slice(), input_key_material)?;
        self.ck = ck;
        // Calls InitializeKey(temp_k), truncated to the cipher key length.
        self.cipher_mut()?.init_key(temp_k.as_slice())
    }

    pub fn mix_hash(&mut self, data: &[u8]) {
        // Sets h = HASH(h || data).
        self.h = self.hash.hash(&[self.h.as_slice(), data]);
    }

    pub fn mix_key_and_hash(&mut self, input_key_material: &[u8]) -> Result<(), NoiseError> {
        // Sets ck, temp_h, temp_k = HKDF(ck, input_key_material, 3).
        let [ck, temp_h, temp_k] = self.hash.hkdf::<3>(self.ck.as_slice(), input_key_material)?;
        self.ck = ck;
        self.mix_hash(temp_h.as_slice());
        self.cipher_mut()?.init_key(temp_k.as_slice())
    }

    /// The handshake hash, valid until `split`.
    pub fn handshake_hash(&self) -> &[u8] {
        self.h.as_slice()
    }

    pub fn encrypt_and_hash(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let h = self.h.clone();
        let cipher = self.cipher_mut()?;
        // Plaintext passes through until the first MixKey.
        let ciphertext = match cipher.has_key() {
            true => cipher.encrypt_with_ad(h.as_slice(), plaintext)?,
            false => plaintext.to_vec(),
        };
        self.mix_hash(&ciphertext);
        Ok(ciphertext)
    }

    pub fn decrypt_and_hash(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let h = self.h.clone();
        let cipher = self.cipher_mut()?;
        let plaintext = match cipher.has_key() {
            true => cipher.decrypt_with_ad(h.as_slice(), ciphertext)?,
            false => ciphertext.to_vec(),
        };
        self.mix_hash(ciphertext);
        Ok(plaintext)
    }

    /// Derives the two transport ciphers `(c1, c2)`, consuming the handshake cipher and
    /// wiping `ck` and `h`. A second call fails with `InvalidState`.
    pub fn split(&mut self) -> Result<(CipherState, CipherState), NoiseError> {
        if self.cipher.take().is_none() {
            Err(NoiseError::InvalidState)?
        }
        let result = self.hash.hkdf::<2>(self.ck.as_slice(), &[]);
        self.ck.zeroize();
        self.h.zeroize();
        let [k1, k2] = result?;

        let mut c1 = CipherState::new(self.id.cipher);
        let mut c2 = CipherState::new(self.id.cipher);
        c1.init_key(k1.as_slice())?;
        c2.init_key(k2.as_slice())?;
        Ok((c1, c2))
    }
}
