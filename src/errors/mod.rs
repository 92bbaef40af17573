//! Error types.
//!
//! `ConfigError` is returned while building signers and serializers and means
//! the caller asked for something impossible. `BadData` is returned while
//! reading tokens and means the input must not be trusted.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Invalid signer configuration. Raised at construction, never while
/// verifying a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The separator collides with the base64url alphabet or is not ASCII.
    #[error(
        "the separator {0:?} cannot be used because it may be contained in the signature itself; \
         ASCII letters, digits, and '-_=' must not be used"
    )]
    InvalidSeparator(char),

    #[error("Unknown key derivation method {0:?}")]
    UnknownKeyDerivation(String),

    #[error("Unknown digest method {0:?}")]
    UnknownDigest(String),

    #[error("Unknown signing algorithm {0:?}")]
    UnknownAlgorithm(String),
}

/// A token (or part of one) was rejected.
///
/// Variants that carry a `payload` expose the bytes that were extracted from
/// the token before verification failed. Those bytes are for diagnostics only
/// and were NOT authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadData {
    #[error("Invalid base64-encoded data")]
    Encoding,

    #[error("No {separator:?} found in value")]
    MissingSeparator { separator: char },

    #[error("Signature {signature:?} does not match")]
    SignatureMismatch { signature: String, payload: Vec<u8> },

    /// The signature was valid but no timestamp segment was present, which
    /// happens when the token came from a plain signer sharing key and salt.
    #[error("timestamp missing")]
    MissingTimestamp { payload: Vec<u8> },

    #[error("Malformed timestamp")]
    MalformedTimestamp { payload: Vec<u8> },

    #[error("{message}")]
    TimeSignatureMismatch {
        message: String,
        payload: Vec<u8>,
        date_signed: Option<DateTime<Utc>>,
    },

    /// The token is authentic but older than `max_age`, or claims to have
    /// been signed in the future (negative age).
    #[error("{}", expired_message(.age, .max_age))]
    Expired {
        age: i64,
        max_age: u64,
        payload: Vec<u8>,
        date_signed: DateTime<Utc>,
    },

    #[error("{message}")]
    Payload {
        message: String,
        original_error: Option<String>,
    },
}

fn expired_message(age: &i64, max_age: &u64) -> String {
    if *age < 0 {
        format!("Signature age {} < 0 seconds", age)
    } else {
        format!("Signature age {} > {} seconds", age, max_age)
    }
}

impl BadData {
    /// Unverified payload extracted from the token, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            BadData::SignatureMismatch { payload, .. }
            | BadData::MissingTimestamp { payload }
            | BadData::MalformedTimestamp { payload }
            | BadData::TimeSignatureMismatch { payload, .. }
            | BadData::Expired { payload, .. } => Some(payload),
            BadData::Encoding | BadData::MissingSeparator { .. } | BadData::Payload { .. } => None,
        }
    }

    pub fn date_signed(&self) -> Option<DateTime<Utc>> {
        match self {
            BadData::TimeSignatureMismatch { date_signed, .. } => *date_signed,
            BadData::Expired { date_signed, .. } => Some(*date_signed),
            _ => None,
        }
    }

    /// True for every rejection of the token's signature or framing.
    /// Encoding and payload decoding errors are not signature errors.
    pub fn is_signature_error(&self) -> bool {
        !matches!(self, BadData::Encoding | BadData::Payload { .. })
    }

    /// True for failures raised by the timestamped signer.
    pub fn is_time_error(&self) -> bool {
        matches!(
            self,
            BadData::MissingTimestamp { .. }
                | BadData::MalformedTimestamp { .. }
                | BadData::TimeSignatureMismatch { .. }
                | BadData::Expired { .. }
        )
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, BadData::Expired { .. })
    }

    pub(crate) fn payload_error(message: impl Into<String>, original: impl ToString) -> Self {
        BadData::Payload {
            message: message.into(),
            original_error: Some(original.to_string()),
        }
    }
}
