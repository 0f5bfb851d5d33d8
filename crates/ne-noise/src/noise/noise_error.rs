use ne_crypto::CryptoError;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum NoiseError {
    #[error("crypto backend error: {0}")]
    Crypto(CryptoError),
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("message authentication failed")]
    MacFailure,
    #[error("nonce counter exhausted")]
    NonceOverflow,
    #[error("invalid length")]
    InvalidLength,
    #[error("operation not permitted in the current state")]
    InvalidState,
    #[error("key has not been set")]
    NotSet,
    #[error("local keypair is required")]
    LocalKeyRequired,
    #[error("remote public key is required")]
    RemoteKeyRequired,
    #[error("pre-shared key is required")]
    PskRequired,
    #[error("operation does not apply to this protocol")]
    NotApplicable,
    #[error("unknown protocol name component: {0}")]
    UnknownName(String),
}

impl From<CryptoError> for NoiseError {
    fn from(value: CryptoError) -> Self {
        match value {
            CryptoError::InvalidPrivateKey => NoiseError::InvalidPrivateKey,
            CryptoError::InvalidPublicKey => NoiseError::InvalidPublicKey,
            CryptoError::MacFailure => NoiseError::MacFailure,
            CryptoError::InvalidLength => NoiseError::InvalidLength,
            other => NoiseError::Crypto(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::NoiseError;
    use ne_crypto::CryptoError;

    #[test]
    fn crypto_errors_map_onto_noise_kinds() {
        assert_eq!(NoiseError::from(CryptoError::MacFailure), NoiseError::MacFailure);
        assert_eq!(
            NoiseError::from(CryptoError::InvalidPublicKey),
            NoiseError::InvalidPublicKey
        );
        assert_eq!(
            NoiseError::from(CryptoError::OsRngError),
            NoiseError::Crypto(CryptoError::OsRngError)
        );
        assert_eq!(
            NoiseError::UnknownName("Foo".into()).to_string(),
            "unknown protocol name component: Foo"
        );
    }
}
