//! # Token Signer
//!
//! Signs byte strings with a secret key so they can be handed to untrusted
//! parties and verified when they come back. Optionally embeds the signing
//! time so tokens can expire.
//!
//! Modules:
//! - `signing`: signers, key derivation and signature algorithms
//! - `serializer`: sign structured values as JSON payloads
//! - `encoding`: base64url and integer helpers used in tokens
//! - `config`: YAML configuration for the `token-signer` binary

pub mod config;
pub mod encoding;
pub mod errors;
pub mod helpers;
pub mod serializer;
pub mod signing;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::signer_config::ServiceConfig;
pub use crate::encoding::{base64_decode, base64_encode, bytes_to_int, int_to_bytes};
pub use crate::errors::{BadData, ConfigError};
pub use crate::helpers::time::{Clock, ManualClock, SystemClock};
pub use crate::serializer::{PayloadFormat, Serializer, TimedSerializer};
pub use crate::signing::algorithm::{DigestMethod, SigningAlgorithm};
pub use crate::signing::derivation::KeyDerivation;
pub use crate::signing::signer::{Signer, SignerBuilder};
pub use crate::signing::timed::TimestampSigner;
