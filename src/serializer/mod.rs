//! Signed serialization of structured values.
//!
//! A serializer turns a value into a payload ([`PayloadFormat`]) and signs it
//! with a [`Signer`] or [`TimestampSigner`]. The same payload decoding is
//! applied on the way back, after the signature has been checked.

pub mod payload;

use std::io::{self, Read, Write};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::BadData;
use crate::helpers::time::Clock;
use crate::signing::signer::Signer;
use crate::signing::timed::TimestampSigner;

pub use payload::PayloadFormat;

pub const DEFAULT_SERIALIZER_SALT: &str = "token-signer";

fn default_signer(secret_key: impl AsRef<[u8]>) -> Signer {
    Signer::new(secret_key).with_salt(DEFAULT_SERIALIZER_SALT)
}

fn into_text(token: Vec<u8>) -> Result<String, BadData> {
    String::from_utf8(token).map_err(|e| BadData::payload_error("Signed payload is not valid UTF-8", e))
}

fn into_io_error(err: BadData) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

/// Signs serde values.
///
/// ```
/// use token_signer::Serializer;
///
/// let s = Serializer::url_safe("secret-key");
/// let token = s.dumps(&vec![1, 2, 3]).unwrap();
/// let back: Vec<i32> = s.loads(&token).unwrap();
/// assert_eq!(back, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct Serializer {
    signer: Signer,
    format: PayloadFormat,
}

impl Serializer {
    /// Plain JSON payloads under the default serializer salt.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self::from_signer(default_signer(secret_key), PayloadFormat::Json)
    }

    /// Compressed, base64-encoded payloads safe to put in URLs and cookies.
    pub fn url_safe(secret_key: impl AsRef<[u8]>) -> Self {
        Self::from_signer(default_signer(secret_key), PayloadFormat::UrlSafe)
    }

    pub fn from_signer(signer: Signer, format: PayloadFormat) -> Self {
        Self { signer, format }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    pub fn dumps<T: Serialize + ?Sized>(&self, obj: &T) -> Result<String, BadData> {
        Self::dumps_using(&self.signer, self.format, obj)
    }

    pub fn dumps_with_salt<T: Serialize + ?Sized>(
        &self,
        obj: &T,
        salt: impl AsRef<[u8]>,
    ) -> Result<String, BadData> {
        Self::dumps_using(&self.signer.with_salt(salt), self.format, obj)
    }

    pub fn loads<T: DeserializeOwned>(&self, s: impl AsRef<[u8]>) -> Result<T, BadData> {
        let payload = self.signer.unsign(s)?;
        self.format.load_payload(&payload)
    }

    pub fn loads_with_salt<T: DeserializeOwned>(
        &self,
        s: impl AsRef<[u8]>,
        salt: impl AsRef<[u8]>,
    ) -> Result<T, BadData> {
        let payload = self.signer.with_salt(salt).unsign(s)?;
        self.format.load_payload(&payload)
    }

    /// Never fails. Returns whether the signature was valid and, if the
    /// payload could be decoded, the (possibly untrusted) value.
    pub fn loads_unsafe<T: DeserializeOwned>(&self, s: impl AsRef<[u8]>) -> (bool, Option<T>) {
        match self.signer.unsign(s) {
            Ok(payload) => match self.format.load_payload(&payload) {
                Ok(obj) => (true, Some(obj)),
                Err(_) => (false, None),
            },
            Err(e) => (false, e.payload().and_then(|p| self.format.load_payload(p).ok())),
        }
    }

    /// Write the signed value to `writer`. Rejections surface as
    /// `InvalidData` I/O errors wrapping [`BadData`].
    pub fn dump<T: Serialize + ?Sized, W: Write>(&self, obj: &T, mut writer: W) -> io::Result<()> {
        let token = self.dumps(obj).map_err(into_io_error)?;
        writer.write_all(token.as_bytes())
    }

    pub fn load<T: DeserializeOwned, R: Read>(&self, mut reader: R) -> io::Result<T> {
        let mut token = Vec::new();
        reader.read_to_end(&mut token)?;
        self.loads(&token).map_err(into_io_error)
    }

    fn dumps_using<T: Serialize + ?Sized>(
        signer: &Signer,
        format: PayloadFormat,
        obj: &T,
    ) -> Result<String, BadData> {
        let payload = format.dump_payload(obj)?;
        into_text(signer.sign(payload))
    }
}

/// [`Serializer`] whose tokens carry a signed timestamp.
#[derive(Debug, Clone)]
pub struct TimedSerializer {
    signer: TimestampSigner,
    format: PayloadFormat,
}

impl TimedSerializer {
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self::from_signer(
            TimestampSigner::new(default_signer(secret_key)),
            PayloadFormat::Json,
        )
    }

    pub fn url_safe(secret_key: impl AsRef<[u8]>) -> Self {
        Self::from_signer(
            TimestampSigner::new(default_signer(secret_key)),
            PayloadFormat::UrlSafe,
        )
    }

    pub fn from_signer(signer: TimestampSigner, format: PayloadFormat) -> Self {
        Self { signer, format }
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self {
            signer: TimestampSigner::with_clock(self.signer.signer().clone(), clock),
            format: self.format,
        }
    }

    pub fn signer(&self) -> &TimestampSigner {
        &self.signer
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    pub fn dumps<T: Serialize + ?Sized>(&self, obj: &T) -> Result<String, BadData> {
        let payload = self.format.dump_payload(obj)?;
        into_text(self.signer.sign(payload))
    }

    pub fn dumps_with_salt<T: Serialize + ?Sized>(
        &self,
        obj: &T,
        salt: impl AsRef<[u8]>,
    ) -> Result<String, BadData> {
        let payload = self.format.dump_payload(obj)?;
        into_text(self.signer.with_salt(salt).sign(payload))
    }

    pub fn loads<T: DeserializeOwned>(
        &self,
        s: impl AsRef<[u8]>,
        max_age: Option<u64>,
    ) -> Result<T, BadData> {
        self.loads_with_timestamp(s, max_age).map(|(obj, _)| obj)
    }

    pub fn loads_with_timestamp<T: DeserializeOwned>(
        &self,
        s: impl AsRef<[u8]>,
        max_age: Option<u64>,
    ) -> Result<(T, DateTime<Utc>), BadData> {
        let (payload, signed_at) = self.signer.unsign_with_timestamp(s, max_age)?;
        Ok((self.format.load_payload(&payload)?, signed_at))
    }

    pub fn loads_with_salt<T: DeserializeOwned>(
        &self,
        s: impl AsRef<[u8]>,
        salt: impl AsRef<[u8]>,
        max_age: Option<u64>,
    ) -> Result<T, BadData> {
        let payload = self.signer.with_salt(salt).unsign(s, max_age)?;
        self.format.load_payload(&payload)
    }

    pub fn loads_unsafe<T: DeserializeOwned>(
        &self,
        s: impl AsRef<[u8]>,
        max_age: Option<u64>,
    ) -> (bool, Option<T>) {
        match self.signer.unsign(s, max_age) {
            Ok(payload) => match self.format.load_payload(&payload) {
                Ok(obj) => (true, Some(obj)),
                Err(_) => (false, None),
            },
            Err(e) => (false, e.payload().and_then(|p| self.format.load_payload(p).ok())),
        }
    }
}
