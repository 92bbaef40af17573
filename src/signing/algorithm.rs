use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::errors::ConfigError;

/// Hash functions available for HMAC signing and key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestMethod {
    Sha1,
    Sha256,
    Sha384,
    #[default]
    Sha512,
}

impl DigestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestMethod::Sha1 => "sha1",
            DigestMethod::Sha256 => "sha256",
            DigestMethod::Sha384 => "sha384",
            DigestMethod::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes.
    pub fn output_size(&self) -> usize {
        match self {
            DigestMethod::Sha1 => 20,
            DigestMethod::Sha256 => 32,
            DigestMethod::Sha384 => 48,
            DigestMethod::Sha512 => 64,
        }
    }

    /// Hash of the concatenation of `parts`.
    pub fn digest(&self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            DigestMethod::Sha1 => digest_parts::<Sha1>(parts),
            DigestMethod::Sha256 => digest_parts::<Sha256>(parts),
            DigestMethod::Sha384 => digest_parts::<Sha384>(parts),
            DigestMethod::Sha512 => digest_parts::<Sha512>(parts),
        }
    }

    pub fn hmac(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self {
            DigestMethod::Sha1 => mac_bytes::<Hmac<Sha1>>(key, message),
            DigestMethod::Sha256 => mac_bytes::<Hmac<Sha256>>(key, message),
            DigestMethod::Sha384 => mac_bytes::<Hmac<Sha384>>(key, message),
            DigestMethod::Sha512 => mac_bytes::<Hmac<Sha512>>(key, message),
        }
    }
}

impl FromStr for DigestMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(DigestMethod::Sha1),
            "sha256" => Ok(DigestMethod::Sha256),
            "sha384" => Ok(DigestMethod::Sha384),
            "sha512" => Ok(DigestMethod::Sha512),
            _ => Err(ConfigError::UnknownDigest(s.to_owned())),
        }
    }
}

impl fmt::Display for DigestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

fn mac_bytes<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = <M as KeyInit>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Equality check whose running time does not depend on where the inputs
/// differ. Inputs of different length compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}

/// Produces the raw signature bytes for a key and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    /// Unsigned tokens: the signature is always empty.
    None,
    Hmac(DigestMethod),
}

impl Default for SigningAlgorithm {
    fn default() -> Self {
        SigningAlgorithm::Hmac(DigestMethod::default())
    }
}

impl SigningAlgorithm {
    /// Build an algorithm from its configured name (`hmac` or `none`).
    pub fn from_name(name: &str, digest: DigestMethod) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "hmac" => Ok(SigningAlgorithm::Hmac(digest)),
            "none" => Ok(SigningAlgorithm::None),
            _ => Err(ConfigError::UnknownAlgorithm(name.to_owned())),
        }
    }

    pub fn digest_method(&self) -> Option<DigestMethod> {
        match self {
            SigningAlgorithm::None => None,
            SigningAlgorithm::Hmac(digest) => Some(*digest),
        }
    }

    pub fn get_signature(&self, key: &[u8], value: &[u8]) -> Vec<u8> {
        match self {
            SigningAlgorithm::None => Vec::new(),
            SigningAlgorithm::Hmac(digest) => digest.hmac(key, value),
        }
    }

    pub fn verify_signature(&self, key: &[u8], value: &[u8], sig: &[u8]) -> bool {
        constant_time_eq(sig, &self.get_signature(key, value))
    }
}
