use crate::{HandshakePattern, NoiseError};
use ne_crypto::{CipherAlgorithm, DhAlgorithm, HashAlgorithm};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum ProtocolPrefix {
    #[default]
    Noise,
    /// Handshakes that mix a pre-shared key
    NoisePsk,
}

impl ProtocolPrefix {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolPrefix::Noise => "Noise",
            ProtocolPrefix::NoisePsk => "NoisePSK",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Noise" => Some(ProtocolPrefix::Noise),
            "NoisePSK" => Some(ProtocolPrefix::NoisePsk),
            _ => None,
        }
    }
}

/// A full protocol selection, written `<prefix>_<pattern>_<dh>_<cipher>_<hash>`,
/// eg. `Noise_XX_25519_ChaChaPoly_BLAKE2s`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ProtocolId {
    pub prefix: ProtocolPrefix,
    pub pattern: HandshakePattern,
    pub dh: DhAlgorithm,
    pub cipher: CipherAlgorithm,
    pub hash: HashAlgorithm,
}

impl ProtocolId {
    pub fn new(
        pattern: HandshakePattern,
        dh: DhAlgorithm,
        cipher: CipherAlgorithm,
        hash: HashAlgorithm,
    ) -> Self {
        Self {
            prefix: ProtocolPrefix::Noise,
            pattern,
            dh,
            cipher,
            hash,
        }
    }

    pub fn with_psk(mut self) -> Self {
        self.prefix = ProtocolPrefix::NoisePsk;
        self
    }

    pub fn with_pattern(mut self, pattern: HandshakePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn is_psk(&self) -> bool {
        self.prefix == ProtocolPrefix::NoisePsk
    }
}

impl Default for ProtocolId {
    fn default() -> Self {
        Self::new(
            HandshakePattern::NN,
            DhAlgorithm::Curve25519,
            CipherAlgorithm::ChaChaPoly,
            HashAlgorithm::Blake2s,
        )
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.prefix.name(),
            self.pattern.name(),
            self.dh.name(),
            self.cipher.name(),
            self.hash.name()
        )
    }
}

impl FromStr for ProtocolId {
    type Err = NoiseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = name.split('_').collect();
        let [prefix, pattern, dh, cipher, hash] = parts[..] else {
            return Err(NoiseError::UnknownName(name.to_string()));
        };
        let unknown = |part: &str| NoiseError::UnknownName(part.to_string());
        Ok(Self {
            prefix: ProtocolPrefix::from_name(prefix).ok_or_else(|| unknown(prefix))?,
            pattern: HandshakePattern::from_name(pattern).ok_or_else(|| unknown(pattern))?,
            dh: DhAlgorithm::from_name(dh).ok_or_else(|| unknown(dh))?,
            cipher: CipherAlgorithm::from_name(cipher).ok_or_else(|| unknown(cipher))?,
            hash: HashAlgorithm::from_name(hash).ok_or_else(|| unknown(hash))?,
        })
    }
}

impl Serialize for ProtocolId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProtocolId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}
