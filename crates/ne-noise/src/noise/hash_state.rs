use crate::NoiseError;
use blake2::{Blake2b512, Blake2s256};
use digest::Digest;
use ne_crypto::{HashAlgorithm, HashBuf};
use sha2::{Sha256, Sha512};

#[derive(Clone)]
enum Context {
    Blake2s(Blake2s256),
    Blake2b(Blake2b512),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Context {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake2s => Context::Blake2s(Blake2s256::new()),
            HashAlgorithm::Blake2b => Context::Blake2b(Blake2b512::new()),
            HashAlgorithm::Sha256 => Context::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => Context::Sha512(Sha512::new()),
        }
    }
}

/// Streaming hash plus the HKDF built on it.
#[derive(Clone)]
pub struct HashState {
    algorithm: HashAlgorithm,
    context: Context,
}

impl HashState {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            context: Context::new(algorithm),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn hash_len(&self) -> usize {
        self.algorithm.hash_len()
    }

    pub fn block_len(&self) -> usize {
        self.algorithm.block_len()
    }

    pub fn reset(&mut self) {
        self.context = Context::new(self.algorithm);
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.context {
            Context::Blake2s(d) => Digest::update(d, data),
            Context::Blake2b(d) => Digest::update(d, data),
            Context::Sha256(d) => Digest::update(d, data),
            Context::Sha512(d) => Digest::update(d, data),
        }
    }

    /// Writes HASHLEN bytes into the front of `out` and resets the context.
    pub fn finalize(&mut self, out: &mut [u8]) -> Result<(), NoiseError> {
        let len = self.hash_len();
        if out.len() < len {
            Err(NoiseError::InvalidLength)?
        }
        self.finish(&mut out[..len]);
        Ok(())
    }

    // `out` is exactly HASHLEN bytes.
    fn finish(&mut self, out: &mut [u8]) {
        let context = std::mem::replace(&mut self.context, Context::new(self.algorithm));
        match context {
            Context::Blake2s(d) => out.copy_from_slice(&d.finalize()),
            Context::Blake2b(d) => out.copy_from_slice(&d.finalize()),
            Context::Sha256(d) => out.copy_from_slice(&d.finalize()),
            Context::Sha512(d) => out.copy_from_slice(&d.finalize()),
        }
    }

    /// HASH(inputs[0] || inputs[1] || ...)
    pub fn hash(&mut self, inputs: &[&[u8]]) -> HashBuf {
        self.reset();
        for input in inputs {
            self.update(input);
        }
        let mut out = HashBuf::new(self.hash_len());
        self.finish(out.as_mut_slice());
        out
    }

    /// HKDF(chaining_key, input_key_material, K)
    pub fn hkdf<const K: usize>(
        &self,
        chaining_key: &[u8],
        input_key_material: &[u8],
    ) -> Result<[HashBuf; K], NoiseError> {
        Ok(ne_crypto::hkdf::<K>(
            self.algorithm,
            chaining_key,
            input_key_material,
        )?)
    }
}

impl std::fmt::Debug for HashState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashState")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
