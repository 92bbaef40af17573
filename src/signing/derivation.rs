use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::signing::algorithm::DigestMethod;

/// How a signer turns its secret key and salt into the key that is actually
/// used for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyDerivation {
    /// Use the secret key as is; the salt is ignored.
    None,
    /// `digest(salt ++ secret_key)`
    Concat,
    /// `digest(salt ++ "signer" ++ secret_key)`
    #[default]
    DjangoConcat,
    /// `HMAC(secret_key, salt)`
    Hmac,
}

impl KeyDerivation {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyDerivation::None => "none",
            KeyDerivation::Concat => "concat",
            KeyDerivation::DjangoConcat => "django-concat",
            KeyDerivation::Hmac => "hmac",
        }
    }

    pub fn derive_key(&self, secret_key: &[u8], salt: &[u8], digest: DigestMethod) -> Vec<u8> {
        match self {
            KeyDerivation::None => secret_key.to_vec(),
            KeyDerivation::Concat => digest.digest(&[salt, secret_key]),
            KeyDerivation::DjangoConcat => digest.digest(&[salt, &b"signer"[..], secret_key]),
            KeyDerivation::Hmac => digest.hmac(secret_key, salt),
        }
    }
}

impl FromStr for KeyDerivation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(KeyDerivation::None),
            "concat" => Ok(KeyDerivation::Concat),
            "django-concat" => Ok(KeyDerivation::DjangoConcat),
            "hmac" => Ok(KeyDerivation::Hmac),
            _ => Err(ConfigError::UnknownKeyDerivation(s.to_owned())),
        }
    }
}

impl fmt::Display for KeyDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
