//! Curve25519 and Curve448 primitives.
//!
//! Validation and calculation always run the full scalar multiplication and only turn the
//! outcome into an error at the very end, so timing depends on the algorithm and never on
//! whether a key turned out to be valid.

use crate::{cmove_zero, is_equal, is_zero, CryptoError};
use subtle::Choice;
use zeroize::{Zeroize, Zeroizing};

/// Any clamped scalar is a multiple of the cofactor, so multiplying a low-order point by it
/// yields the identity and an all-zero output.
const CHECK_SCALAR: [u8; 56] = [0x5a; 56];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DhAlgorithm {
    Curve25519,
    Curve448,
}

impl DhAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            DhAlgorithm::Curve25519 => "25519",
            DhAlgorithm::Curve448 => "448",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "25519" => Some(DhAlgorithm::Curve25519),
            "448" => Some(DhAlgorithm::Curve448),
            _ => None,
        }
    }

    pub fn private_key_len(&self) -> usize {
        match self {
            DhAlgorithm::Curve25519 => 32,
            DhAlgorithm::Curve448 => 56,
        }
    }

    /// DHLEN
    pub fn public_key_len(&self) -> usize {
        self.private_key_len()
    }

    pub fn shared_key_len(&self) -> usize {
        self.private_key_len()
    }

    fn check_lengths(&self, private_key: &[u8], public_key: &[u8]) -> Result<(), CryptoError> {
        if private_key.len() != self.private_key_len() {
            Err(CryptoError::InvalidPrivateKey)?
        }
        if public_key.len() != self.public_key_len() {
            Err(CryptoError::InvalidPublicKey)?
        }
        Ok(())
    }
}

/// Writes the public key matching `private_key` into `public_key`.
pub fn derive_public_key(
    algorithm: DhAlgorithm,
    private_key: &[u8],
    public_key: &mut [u8],
) -> Result<(), CryptoError> {
    algorithm.check_lengths(private_key, public_key)?;
    match algorithm {
        DhAlgorithm::Curve25519 => {
            let secret = x25519_secret(private_key);
            public_key.copy_from_slice(x25519_dalek::PublicKey::from(&secret).as_bytes());
        }
        DhAlgorithm::Curve448 => {
            let public = x448_multiply(private_key, &x448::X448_BASEPOINT_BYTES);
            public_key.copy_from_slice(&public[..]);
        }
    }
    Ok(())
}

/// Checks that `public_key` is not a low-order point.
pub fn validate_public_key(algorithm: DhAlgorithm, public_key: &[u8]) -> Result<(), CryptoError> {
    if public_key.len() != algorithm.public_key_len() {
        Err(CryptoError::InvalidPublicKey)?
    }
    let len = algorithm.private_key_len();
    let mut shared = [0u8; 56];
    let result = calculate(algorithm, &CHECK_SCALAR[..len], public_key, &mut shared[..len]);
    shared.zeroize();
    result
}

/// Checks that `public_key` belongs to `private_key` and that neither is degenerate.
pub fn validate_keypair(
    algorithm: DhAlgorithm,
    private_key: &[u8],
    public_key: &[u8],
) -> Result<(), CryptoError> {
    algorithm.check_lengths(private_key, public_key)?;
    let mut derived = [0u8; 56];
    let len = algorithm.public_key_len();
    derive_public_key(algorithm, private_key, &mut derived[..len])?;

    let private_ok = !is_zero(private_key);
    let public_ok = is_equal(&derived[..len], public_key);
    derived.zeroize();

    if !private_ok {
        Err(CryptoError::InvalidPrivateKey)?
    }
    if !public_ok {
        Err(CryptoError::InvalidPublicKey)?
    }
    Ok(())
}

/// DH(private_key, public_key) into `shared_key`.
///
/// An invalid public key still produces a deterministic output (all zeros) and the
/// same amount of work; `InvalidPublicKey` is only reported afterwards.
pub fn calculate(
    algorithm: DhAlgorithm,
    private_key: &[u8],
    public_key: &[u8],
    shared_key: &mut [u8],
) -> Result<(), CryptoError> {
    algorithm.check_lengths(private_key, public_key)?;
    if shared_key.len() != algorithm.shared_key_len() {
        Err(CryptoError::DestTooSmall)?
    }

    let contributory: Choice = match algorithm {
        DhAlgorithm::Curve25519 => {
            let secret = x25519_secret(private_key);
            let mut public = [0u8; 32];
            public.copy_from_slice(public_key);
            let shared = secret.diffie_hellman(&x25519_dalek::PublicKey::from(public));
            shared_key.copy_from_slice(shared.as_bytes());
            Choice::from(shared.was_contributory() as u8)
        }
        DhAlgorithm::Curve448 => {
            // Low-order points multiply to the identity, which encodes as all zeros.
            let shared = x448_multiply(private_key, public_key);
            shared_key.copy_from_slice(&shared[..]);
            !Choice::from(is_zero(shared_key) as u8)
        }
    };

    cmove_zero(shared_key, !bool::from(contributory));
    if bool::from(contributory) {
        Ok(())
    } else {
        Err(CryptoError::InvalidPublicKey)
    }
}

fn x25519_secret(private_key: &[u8]) -> x25519_dalek::StaticSecret {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(private_key);
    let secret = x25519_dalek::StaticSecret::from(bytes);
    bytes.zeroize();
    secret
}

/// X448(scalar, point) for inputs already checked to be 56 bytes.
/// Scalar and product live in `Zeroizing` buffers; `x448::Secret` never wipes itself.
fn x448_multiply(private_key: &[u8], point: &[u8]) -> Zeroizing<[u8; 56]> {
    let mut scalar = Zeroizing::new([0u8; 56]);
    scalar.copy_from_slice(private_key);
    let mut u = [0u8; 56];
    u.copy_from_slice(point);
    Zeroizing::new(x448::x448_unchecked(*scalar, u))
}
