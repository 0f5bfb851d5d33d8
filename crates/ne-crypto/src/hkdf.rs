use crate::CryptoError;
use digest::KeyInit;
use hmac::Mac;
use std::marker::PhantomData;
use zeroize::Zeroize;

/// Generic HKDF following RFC 5869.
/// H: HMAC over the hash function (eg. `SimpleHmac<Blake2s256>`).
/// N: Hash output length (eg. 32 for BLAKE2s).
///
/// Noise's `HKDF(chaining_key, input_key_material, num_outputs)` is this construction with
/// `salt = chaining_key`, an empty context and `num_outputs * N` bytes of output.
pub struct Hkdf<H: Mac + KeyInit, const N: usize>(PhantomData<H>);

impl<H: Mac + KeyInit, const N: usize> Hkdf<H, N> {
    /// HKDF-Extract (salt, IKM) -> Pseudorandom Key
    pub fn extract(
        dest: &mut [u8; N],
        salt: &[u8],
        initial_key_material: &[u8],
    ) -> Result<(), CryptoError> {
        let mut s = [0u8; N];
        match salt.len() {
            n if n >= N => s.copy_from_slice(&salt[..N]),
            n => s[..n].copy_from_slice(salt),
        };
        let mut mac = <H as KeyInit>::new_from_slice(&s)?;
        s.zeroize();
        mac.update(initial_key_material);
        let mut result = mac.finalize().into_bytes();
        dest.copy_from_slice(&result[..N]);
        result.as_mut_slice().zeroize();
        Ok(())
    }

    /// HKDF-Expand (PRK, context, L) -> Output Keying Material, with L = `dest.len()`
    pub fn expand(dest: &mut [u8], prk: &[u8; N], context: &[u8]) -> Result<(), CryptoError> {
        let n = dest.len().div_ceil(N);
        if n > 255 {
            Err(CryptoError::HkdfExpandTooLong)?
        }

        let mut head = 0;
        let mut t = [0u8; N];

        for i in 1..=n {
            let mut mac = <H as KeyInit>::new_from_slice(prk)?;
            if i > 1 {
                mac.update(&t); // T(i-1)
            }
            mac.update(context);
            mac.update(&[i as u8]); // Counter

            let mut block = mac.finalize().into_bytes();
            t.copy_from_slice(&block[..N]);
            block.as_mut_slice().zeroize();

            // take min of hash_len (N) or remaining (L - head)
            let taking = N.min(dest.len() - head);
            dest[head..head + taking].copy_from_slice(&t[..taking]);
            head += taking;
        }

        t.zeroize();
        Ok(())
    }

    /// Single HKDF (extract + expand)
    pub fn derive(
        dest: &mut [u8],
        salt: &[u8],
        initial_key_material: &[u8],
        context: &[u8],
    ) -> Result<(), CryptoError> {
        let mut prk = [0u8; N];
        let result = Self::extract(&mut prk, salt, initial_key_material)
            .and_then(|_| Self::expand(dest, &prk, context));
        prk.zeroize();
        result
    }

    /// Multiple HKDF.
    /// K is the number of `N` byte keys written to `dest`.
    pub fn derive_keys<const K: usize>(
        dest: &mut [[u8; N]; K],
        salt: &[u8],
        initial_key_material: &[u8],
        context: &[u8],
    ) -> Result<(), CryptoError> {
        match N.checked_mul(K) {
            Some(total_len) => {
                let mut okm = vec![0u8; total_len];
                let result = Self::derive(okm.as_mut_slice(), salt, initial_key_material, context);
                if result.is_ok() {
                    for (i, key) in dest.iter_mut().enumerate() {
                        key.copy_from_slice(&okm[i * N..(i + 1) * N]);
                    }
                }
                okm.zeroize();
                result
            }
            None => Err(CryptoError::HkdfExpandTooLong),
        }
    }
}
