use crate::CryptoError;
use rand::{
    rngs::{OsRng, StdRng},
    RngCore, SeedableRng, TryRngCore,
};
use zeroize::Zeroize;

/// Number of output bytes after which `RandomState` reseeds from the OS.
pub const RESEED_INTERVAL: usize = 64 * 1024;

/// Fills `dest` straight from the OS random source.
pub fn fill_random(dest: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|_| CryptoError::OsRngError)
}

/// CSPRNG seeded from the OS and periodically reseeded after `RESEED_INTERVAL` bytes.
pub struct RandomState {
    rng: StdRng,
    remaining: usize,
    seeded_from_os: bool,
}

impl RandomState {
    pub fn new() -> Result<Self, CryptoError> {
        Ok(Self {
            rng: StdRng::try_from_os_rng().map_err(|_| CryptoError::OsRngError)?,
            remaining: RESEED_INTERVAL,
            seeded_from_os: true,
        })
    }

    /// Deterministic generator that never reseeds. Intended for reproducible tests.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: StdRng::from_seed(seed),
            remaining: RESEED_INTERVAL,
            seeded_from_os: false,
        }
    }

    /// Fills `dest` with random bytes, reseeding first whenever the interval has run out.
    pub fn fill(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
        let mut head = 0;
        while head < dest.len() {
            if self.remaining == 0 {
                self.reseed()?;
            }
            let taking = self.remaining.min(dest.len() - head);
            self.rng.fill_bytes(&mut dest[head..head + taking]);
            self.remaining -= taking;
            head += taking;
        }
        Ok(())
    }

    /// Mixes fresh OS entropy into a new seed, unless this generator was explicitly seeded.
    pub fn reseed(&mut self) -> Result<(), CryptoError> {
        if self.seeded_from_os {
            let mut seed = [0u8; 32];
            let mut fresh = [0u8; 32];
            self.rng.fill_bytes(&mut seed);
            let result = fill_random(&mut fresh);
            for (s, f) in seed.iter_mut().zip(fresh.iter()) {
                *s ^= f;
            }
            fresh.zeroize();
            result?;
            self.rng = StdRng::from_seed(seed);
            seed.zeroize();
            tracing::trace!("random state reseeded");
        }
        self.remaining = RESEED_INTERVAL;
        Ok(())
    }
}
