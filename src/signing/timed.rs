use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::encoding::{base64_decode, base64_encode, bytes_to_int, int_to_bytes};
use crate::errors::BadData;
use crate::helpers::time::{timestamp_to_datetime, Clock, SystemClock};
use crate::signing::signer::{rsplit_once, Signer};

/// [`Signer`] that also signs the time of signing and can reject tokens
/// older than a given age.
///
/// Tokens have the shape `value SEP base64(timestamp) SEP base64(signature)`
/// where the signature covers `value SEP base64(timestamp)`.
#[derive(Debug, Clone)]
pub struct TimestampSigner {
    signer: Signer,
    clock: Arc<dyn Clock>,
}

impl TimestampSigner {
    pub fn new(signer: Signer) -> Self {
        Self::with_clock(signer, Arc::new(SystemClock))
    }

    pub fn with_clock(signer: Signer, clock: Arc<dyn Clock>) -> Self {
        Self { signer, clock }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn with_salt(&self, salt: impl AsRef<[u8]>) -> Self {
        Self::with_clock(self.signer.with_salt(salt), self.clock())
    }

    /// Current unix time according to the clock.
    pub fn get_timestamp(&self) -> i64 {
        self.clock.now()
    }

    pub fn timestamp_to_datetime(&self, ts: i64) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(ts)
    }

    pub fn sign(&self, value: impl AsRef<[u8]>) -> Vec<u8> {
        let value = value.as_ref();
        // a clock before the epoch is clamped rather than encoded as a huge unsigned value
        let ts = u64::try_from(self.get_timestamp()).unwrap_or(0);
        let ts = base64_encode(int_to_bytes(ts));

        let mut payload = Vec::with_capacity(value.len() + 1 + ts.len());
        payload.extend_from_slice(value);
        payload.push(self.signer.separator_byte());
        payload.extend_from_slice(&ts);
        self.signer.sign(payload)
    }

    /// Verify the token and, when `max_age` is set, its age in seconds.
    pub fn unsign(
        &self,
        signed_value: impl AsRef<[u8]>,
        max_age: Option<u64>,
    ) -> Result<Vec<u8>, BadData> {
        self.unsign_with_timestamp(signed_value, max_age)
            .map(|(value, _)| value)
    }

    /// Like [`TimestampSigner::unsign`] but also returns when the token was
    /// signed.
    pub fn unsign_with_timestamp(
        &self,
        signed_value: impl AsRef<[u8]>,
        max_age: Option<u64>,
    ) -> Result<(Vec<u8>, DateTime<Utc>), BadData> {
        // signature first; the timestamp is only interpreted afterwards
        let (result, sig_error) = match self.signer.unsign(signed_value) {
            Ok(result) => (result, None),
            Err(e) => (e.payload().map(<[u8]>::to_vec).unwrap_or_default(), Some(e)),
        };

        let Some((value, ts_bytes)) = rsplit_once(&result, self.signer.separator_byte()) else {
            return Err(match sig_error {
                Some(e) => e,
                None => BadData::MissingTimestamp { payload: result },
            });
        };

        let ts = decode_timestamp(ts_bytes);
        let date_signed = ts.and_then(timestamp_to_datetime);

        if let Some(e) = sig_error {
            return Err(BadData::TimeSignatureMismatch {
                message: e.to_string(),
                payload: value.to_vec(),
                date_signed,
            });
        }

        let (Some(ts), Some(date_signed)) = (ts, date_signed) else {
            return Err(BadData::MalformedTimestamp {
                payload: value.to_vec(),
            });
        };

        if let Some(max_age) = max_age {
            let age = self.get_timestamp().saturating_sub(ts);
            // negative age means the token claims to come from the future
            if u64::try_from(age).map_or(true, |age| age > max_age) {
                debug!(age, max_age, "signature expired");
                return Err(BadData::Expired {
                    age,
                    max_age,
                    payload: value.to_vec(),
                    date_signed,
                });
            }
        }

        Ok((value.to_vec(), date_signed))
    }

    pub fn validate(&self, signed_value: impl AsRef<[u8]>, max_age: Option<u64>) -> bool {
        self.unsign(signed_value, max_age).is_ok()
    }
}

/// Timestamps are unsigned on the wire but must fit a signed 64-bit value.
fn decode_timestamp(ts_bytes: &[u8]) -> Option<i64> {
    let raw = base64_decode(ts_bytes).ok()?;
    let ts = bytes_to_int(&raw).ok()?;
    i64::try_from(ts).ok()
}
