use std::fmt;

use tracing::debug;

use crate::encoding::{base64_decode, base64_encode, is_base64_byte};
use crate::errors::{BadData, ConfigError};
use crate::signing::algorithm::{DigestMethod, SigningAlgorithm};
use crate::signing::derivation::KeyDerivation;

pub const DEFAULT_SIGNER_SALT: &str = "token-signer.Signer";
pub const DEFAULT_SEPARATOR: char = '.';

/// Appends a signature to a value and checks it on the way back.
///
/// Tokens have the shape `value SEP base64(signature)`. The signing key is
/// derived from the secret key and the salt on every call, so two signers that
/// only differ in salt never accept each other's tokens.
///
/// ```
/// use token_signer::Signer;
///
/// let signer = Signer::new("secret-key");
/// let token = signer.sign("my value");
/// assert_eq!(signer.unsign(&token).unwrap(), b"my value");
/// ```
#[derive(Clone)]
pub struct Signer {
    secret_key: Vec<u8>,
    salt: Vec<u8>,
    separator: u8,
    key_derivation: KeyDerivation,
    digest_method: DigestMethod,
    algorithm: SigningAlgorithm,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("secret_key", &"<redacted>")
            .field("salt", &String::from_utf8_lossy(&self.salt))
            .field("separator", &(self.separator as char))
            .field("key_derivation", &self.key_derivation)
            .field("digest_method", &self.digest_method)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl Signer {
    /// Signer with every option at its default.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
            salt: DEFAULT_SIGNER_SALT.as_bytes().to_vec(),
            separator: DEFAULT_SEPARATOR as u8,
            key_derivation: KeyDerivation::default(),
            digest_method: DigestMethod::default(),
            algorithm: SigningAlgorithm::default(),
        }
    }

    pub fn builder(secret_key: impl AsRef<[u8]>) -> SignerBuilder {
        SignerBuilder::new(secret_key)
    }

    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn separator(&self) -> char {
        self.separator as char
    }

    pub(crate) fn separator_byte(&self) -> u8 {
        self.separator
    }

    pub fn key_derivation(&self) -> KeyDerivation {
        self.key_derivation
    }

    pub fn digest_method(&self) -> DigestMethod {
        self.digest_method
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Same configuration under another salt.
    pub fn with_salt(&self, salt: impl AsRef<[u8]>) -> Self {
        Self {
            salt: salt.as_ref().to_vec(),
            ..self.clone()
        }
    }

    /// Key used for signing. Recomputed on every call.
    pub fn derive_key(&self) -> Vec<u8> {
        self.key_derivation
            .derive_key(&self.secret_key, &self.salt, self.digest_method)
    }

    /// Base64-encoded signature for `value`.
    pub fn get_signature(&self, value: impl AsRef<[u8]>) -> Vec<u8> {
        let key = self.derive_key();
        base64_encode(self.algorithm.get_signature(&key, value.as_ref()))
    }

    /// Check a base64-encoded signature. Undecodable signatures are simply
    /// invalid.
    pub fn verify_signature(&self, value: impl AsRef<[u8]>, sig: impl AsRef<[u8]>) -> bool {
        let Ok(sig) = base64_decode(sig) else {
            return false;
        };
        let key = self.derive_key();
        self.algorithm.verify_signature(&key, value.as_ref(), &sig)
    }

    pub fn sign(&self, value: impl AsRef<[u8]>) -> Vec<u8> {
        let value = value.as_ref();
        let signature = self.get_signature(value);
        let mut token = Vec::with_capacity(value.len() + 1 + signature.len());
        token.extend_from_slice(value);
        token.push(self.separator);
        token.extend_from_slice(&signature);
        token
    }

    /// Verify `signed_value` and return the value part.
    ///
    /// The value is split off at the last separator, so values may contain
    /// the separator themselves.
    pub fn unsign(&self, signed_value: impl AsRef<[u8]>) -> Result<Vec<u8>, BadData> {
        let signed_value = signed_value.as_ref();
        let (value, sig) = rsplit_once(signed_value, self.separator).ok_or(
            BadData::MissingSeparator {
                separator: self.separator as char,
            },
        )?;

        if self.verify_signature(value, sig) {
            return Ok(value.to_vec());
        }

        debug!(
            salt = %String::from_utf8_lossy(&self.salt),
            "signature does not match"
        );
        Err(BadData::SignatureMismatch {
            signature: String::from_utf8_lossy(sig).into_owned(),
            payload: value.to_vec(),
        })
    }

    /// `unsign` reduced to a yes/no answer.
    pub fn validate(&self, signed_value: impl AsRef<[u8]>) -> bool {
        self.unsign(signed_value).is_ok()
    }
}

/// Builder for [`Signer`]. Validation happens in [`SignerBuilder::build`].
#[derive(Clone)]
pub struct SignerBuilder {
    secret_key: Vec<u8>,
    salt: Vec<u8>,
    separator: char,
    key_derivation: KeyDerivation,
    digest_method: DigestMethod,
    algorithm: Option<SigningAlgorithm>,
}

impl SignerBuilder {
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
            salt: DEFAULT_SIGNER_SALT.as_bytes().to_vec(),
            separator: DEFAULT_SEPARATOR,
            key_derivation: KeyDerivation::default(),
            digest_method: DigestMethod::default(),
            algorithm: None,
        }
    }

    pub fn salt(mut self, salt: impl AsRef<[u8]>) -> Self {
        self.salt = salt.as_ref().to_vec();
        self
    }

    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn key_derivation(mut self, key_derivation: KeyDerivation) -> Self {
        self.key_derivation = key_derivation;
        self
    }

    /// Digest for key derivation, and for HMAC signing unless an algorithm
    /// is set explicitly.
    pub fn digest_method(mut self, digest_method: DigestMethod) -> Self {
        self.digest_method = digest_method;
        self
    }

    pub fn algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn build(self) -> Result<Signer, ConfigError> {
        validate_separator(self.separator)?;
        Ok(Signer {
            secret_key: self.secret_key,
            salt: self.salt,
            separator: self.separator as u8,
            key_derivation: self.key_derivation,
            digest_method: self.digest_method,
            algorithm: self
                .algorithm
                .unwrap_or(SigningAlgorithm::Hmac(self.digest_method)),
        })
    }
}

/// A separator must be a single ASCII byte outside the base64url alphabet,
/// otherwise splitting a token would be ambiguous.
pub fn validate_separator(separator: char) -> Result<(), ConfigError> {
    if !separator.is_ascii() || is_base64_byte(separator as u8) {
        return Err(ConfigError::InvalidSeparator(separator));
    }
    Ok(())
}

pub(crate) fn rsplit_once(data: &[u8], sep: u8) -> Option<(&[u8], &[u8])> {
    let idx = data.iter().rposition(|b| *b == sep)?;
    Some((&data[..idx], &data[idx + 1..]))
}
