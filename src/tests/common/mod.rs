// tests/common/mod.rs
use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::helpers::time::ManualClock;
use crate::signing::signer::Signer;
use crate::signing::timed::TimestampSigner;

pub const SECRET: &[u8] = b"test-secret-key";

/// Timestamp signer whose clock only moves when told to.
pub fn frozen_timed_signer(now: i64) -> (TimestampSigner, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    let signer = TimestampSigner::with_clock(Signer::new(SECRET), clock.clone());
    (signer, clock)
}

/// Copy of `token` with one bit flipped.
pub fn flip_bit(token: &[u8], index: usize, bit: u8) -> Vec<u8> {
    let mut out = token.to_vec();
    out[index] ^= 1 << bit;
    out
}

/// Write `yaml` to a temp file that lives as long as the handle.
pub fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(yaml.as_bytes()).expect("write temp config");
    file
}
