use std::fs;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::serializer::{PayloadFormat, Serializer, TimedSerializer};
use crate::signing::algorithm::{DigestMethod, SigningAlgorithm};
use crate::signing::derivation::KeyDerivation;
use crate::signing::signer::Signer;
use crate::signing::timed::TimestampSigner;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub signer: SignerConfig,
}

/// ================================
/// Signer
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SignerConfig {
    pub secret_key: SecretSource,
    pub salt: Option<String>,
    pub separator: Option<char>,
    pub key_derivation: Option<String>, // none | concat | django-concat | hmac
    pub digest: Option<String>,         // sha1 | sha256 | sha384 | sha512
    pub algorithm: Option<String>,      // hmac | none
    /// Only used by timestamped tokens.
    pub max_age_seconds: Option<u64>,
    #[serde(default)]
    pub payload: PayloadKind,
}

/// Where the secret key comes from.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SecretSource {
    Literal { value: String },
    FromEnv { from_env: String },
    FromFile { path: String },
}

impl SecretSource {
    pub fn resolve(&self) -> Result<Vec<u8>> {
        match self {
            SecretSource::Literal { value } => Ok(value.as_bytes().to_vec()),
            SecretSource::FromEnv { from_env } => std::env::var(from_env)
                .map(String::into_bytes)
                .map_err(|_| anyhow!("secret_key: env variable '{}' is not set", from_env)),
            SecretSource::FromFile { path } => {
                let content = fs::read(path)
                    .with_context(|| format!("secret_key: cannot read file '{}'", path))?;
                // keys written with `echo` end with a newline that is not part of the key
                let end = content
                    .iter()
                    .rposition(|b| !matches!(b, b'\n' | b'\r'))
                    .map(|i| i + 1)
                    .unwrap_or(0);
                Ok(content[..end].to_vec())
            }
        }
    }
}

/// Serializer payload flavour.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    #[default]
    Json,
    UrlSafe,
}

impl From<PayloadKind> for PayloadFormat {
    fn from(kind: PayloadKind) -> Self {
        match kind {
            PayloadKind::Json => PayloadFormat::Json,
            PayloadKind::UrlSafe => PayloadFormat::UrlSafe,
        }
    }
}

impl SignerConfig {
    pub fn key_derivation(&self) -> Result<KeyDerivation> {
        Ok(self
            .key_derivation
            .as_deref()
            .map(str::parse::<KeyDerivation>)
            .transpose()?
            .unwrap_or_default())
    }

    pub fn digest(&self) -> Result<DigestMethod> {
        Ok(self
            .digest
            .as_deref()
            .map(str::parse::<DigestMethod>)
            .transpose()?
            .unwrap_or_default())
    }

    pub fn algorithm(&self) -> Result<SigningAlgorithm> {
        let digest = self.digest()?;
        Ok(self
            .algorithm
            .as_deref()
            .map(|name| SigningAlgorithm::from_name(name, digest))
            .transpose()?
            .unwrap_or(SigningAlgorithm::Hmac(digest)))
    }

    /// Build a signer, resolving the secret from its source.
    pub fn build_signer(&self) -> Result<Signer> {
        self.build_signer_with_secret(self.secret_key.resolve()?)
    }

    /// Build a signer with an explicit secret, ignoring `secret_key`.
    pub fn build_signer_with_secret(&self, secret: impl AsRef<[u8]>) -> Result<Signer> {
        let mut builder = Signer::builder(secret)
            .key_derivation(self.key_derivation()?)
            .digest_method(self.digest()?)
            .algorithm(self.algorithm()?);
        if let Some(salt) = &self.salt {
            builder = builder.salt(salt);
        }
        if let Some(separator) = self.separator {
            builder = builder.separator(separator);
        }
        Ok(builder.build()?)
    }

    pub fn build_serializer(&self, signer: Signer) -> Serializer {
        Serializer::from_signer(signer, self.payload.into())
    }

    pub fn build_timed_serializer(&self, signer: Signer) -> TimedSerializer {
        TimedSerializer::from_signer(TimestampSigner::new(signer), self.payload.into())
    }
}
