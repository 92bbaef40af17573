//! Text-safe encodings shared by signers and serializers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::errors::BadData;

/// Characters that may appear in base64url output (padding included).
/// A separator must never be one of these.
pub const BASE64_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_=";

/// URL-safe base64 without padding.
pub fn base64_encode(data: impl AsRef<[u8]>) -> Vec<u8> {
    URL_SAFE_NO_PAD.encode(data.as_ref()).into_bytes()
}

/// Decode URL-safe base64. Trailing `=` padding is tolerated.
pub fn base64_decode(data: impl AsRef<[u8]>) -> Result<Vec<u8>, BadData> {
    let data = data.as_ref();
    let end = data
        .iter()
        .rposition(|b| *b != b'=')
        .map(|i| i + 1)
        .unwrap_or(0);
    URL_SAFE_NO_PAD
        .decode(&data[..end])
        .map_err(|_| BadData::Encoding)
}

/// Big-endian bytes with leading zero bytes stripped; `0` encodes as empty.
pub fn int_to_bytes(num: u64) -> Vec<u8> {
    let bytes = num.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Inverse of [`int_to_bytes`]. Input is left-padded with zeros to eight
/// bytes; anything wider than a `u64` is rejected.
pub fn bytes_to_int(data: &[u8]) -> Result<u64, BadData> {
    if data.len() > 8 {
        return Err(BadData::Encoding);
    }
    let mut buf = [0u8; 8];
    buf[8 - data.len()..].copy_from_slice(data);
    Ok(u64::from_be_bytes(buf))
}

pub(crate) fn is_base64_byte(b: u8) -> bool {
    BASE64_ALPHABET.contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_url_safe_and_unpadded() {
        // 0xfb 0xff produces '+' and '/' in the standard alphabet
        let out = base64_encode([0xfbu8, 0xff, 0xfe]);
        assert!(!out.contains(&b'+'));
        assert!(!out.contains(&b'/'));
        assert!(!out.contains(&b'='));
        for len in 1..6 {
            assert!(!base64_encode(vec![7u8; len]).contains(&b'='));
        }
        assert!(base64_encode(b"").is_empty());
    }

    #[test]
    fn decode_accepts_missing_or_present_padding() {
        assert_eq!(base64_decode("aGVsbG8").unwrap(), b"hello");
        assert_eq!(base64_decode("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(base64_decode("dGVzdA").unwrap(), b"test");
        assert!(base64_decode("").unwrap().is_empty());
    }

    #[test]
    fn decode_roundtrips_url_safe_characters() {
        let original = vec![0xfbu8, 0xff, 0xbf, 0x00, 0x10];
        assert_eq!(base64_decode(base64_encode(&original)).unwrap(), original);
    }

    #[test]
    fn decode_rejects_invalid_input() {
        let err = base64_decode("!!!").unwrap_err();
        assert_eq!(err, BadData::Encoding);
        assert!(err.to_string().contains("Invalid base64-encoded data"));
        assert!(base64_decode("ab+/").is_err());
    }

    #[test]
    fn int_to_bytes_strips_leading_zeros() {
        assert_eq!(int_to_bytes(0), Vec::<u8>::new());
        assert_eq!(int_to_bytes(1), vec![1]);
        assert_eq!(int_to_bytes(256), vec![1, 0]);
        assert_eq!(int_to_bytes(u64::MAX).len(), 8);
        assert_ne!(int_to_bytes(1_234_567_890)[0], 0);
    }

    #[test]
    fn bytes_to_int_pads_short_input() {
        assert_eq!(bytes_to_int(&[]).unwrap(), 0);
        assert_eq!(bytes_to_int(&[0x00]).unwrap(), 0);
        assert_eq!(bytes_to_int(&[0xff]).unwrap(), 255);
        assert_eq!(bytes_to_int(&[0x01, 0x00]).unwrap(), 256);
        assert_eq!(bytes_to_int(&[0, 0, 0, 0, 0, 0, 1, 0]).unwrap(), 256);
        assert!(bytes_to_int(&[1; 9]).is_err());
    }

    #[test]
    fn int_bytes_roundtrip_through_full_range() {
        for num in [0, 1, 255, 256, 1 << 16, 1 << 32, 1 << 48, 1 << 63, u64::MAX, 1_234_567_890] {
            assert_eq!(bytes_to_int(&int_to_bytes(num)).unwrap(), num);
        }
    }

    #[test]
    fn alphabet_covers_url_safe_characters() {
        for b in b"AZaz09-_=" {
            assert!(is_base64_byte(*b));
        }
        assert!(!is_base64_byte(b'+'));
        assert!(!is_base64_byte(b'/'));
        assert!(!is_base64_byte(b'.'));
    }
}
