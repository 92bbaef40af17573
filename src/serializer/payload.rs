use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::encoding::{base64_decode, base64_encode};
use crate::errors::BadData;

/// Marks a URL-safe payload whose JSON was zlib-compressed before encoding.
const COMPRESSED_MARKER: u8 = b'.';

/// How structured values become the bytes that get signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// Compact JSON as is.
    #[default]
    Json,
    /// Compact JSON, zlib-compressed when that makes it shorter, then
    /// base64url-encoded. Compressed payloads start with `.`.
    UrlSafe,
}

impl PayloadFormat {
    pub fn dump_payload<T: Serialize + ?Sized>(&self, obj: &T) -> Result<Vec<u8>, BadData> {
        let json = serde_json::to_vec(obj)
            .map_err(|e| BadData::payload_error("Could not serialize the payload", e))?;

        match self {
            PayloadFormat::Json => Ok(json),
            PayloadFormat::UrlSafe => {
                let compressed = zlib_compress(&json)
                    .map_err(|e| BadData::payload_error("Could not zlib compress the payload", e))?;
                if compressed.len() + 1 < json.len() {
                    let mut out = vec![COMPRESSED_MARKER];
                    out.extend_from_slice(&base64_encode(compressed));
                    Ok(out)
                } else {
                    Ok(base64_encode(json))
                }
            }
        }
    }

    pub fn load_payload<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T, BadData> {
        let json = match self {
            PayloadFormat::Json => payload.to_vec(),
            PayloadFormat::UrlSafe => {
                let (compressed, encoded) = match payload.split_first() {
                    Some((&COMPRESSED_MARKER, rest)) => (true, rest),
                    _ => (false, payload),
                };
                let decoded = base64_decode(encoded).map_err(|e| {
                    BadData::payload_error(
                        "Could not base64 decode the payload because of an exception",
                        e,
                    )
                })?;
                if compressed {
                    zlib_decompress(&decoded).map_err(|e| {
                        BadData::payload_error(
                            "Could not zlib decompress the payload before decoding the payload",
                            e,
                        )
                    })?
                } else {
                    decoded
                }
            }
        };

        serde_json::from_slice(&json).map_err(|e| {
            BadData::payload_error(
                "Could not load the payload because an exception occurred on unserializing the data",
                e,
            )
        })
    }
}

fn zlib_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn zlib_decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn json_payload_is_compact() {
        let out = PayloadFormat::Json
            .dump_payload(&json!({"key": "value"}))
            .unwrap();
        assert_eq!(out, br#"{"key":"value"}"#);
    }

    #[test]
    fn small_url_safe_payload_is_not_compressed() {
        let out = PayloadFormat::UrlSafe.dump_payload(&json!({"a": 1})).unwrap();
        assert_ne!(out[0], COMPRESSED_MARKER);
        let back: Value = PayloadFormat::UrlSafe.load_payload(&out).unwrap();
        assert_eq!(back, json!({"a": 1}));
    }

    #[test]
    fn repetitive_url_safe_payload_is_compressed() {
        let data = json!({"data": "x".repeat(1000)});
        let out = PayloadFormat::UrlSafe.dump_payload(&data).unwrap();
        assert_eq!(out[0], COMPRESSED_MARKER);
        assert!(out.len() < 1000);
        let back: Value = PayloadFormat::UrlSafe.load_payload(&out).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn invalid_base64_is_payload_error() {
        let err = PayloadFormat::UrlSafe
            .load_payload::<Value>(b"!!!not base64")
            .unwrap_err();
        match err {
            BadData::Payload { original_error, .. } => assert!(original_error.is_some()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn invalid_zlib_is_payload_error() {
        let mut payload = vec![COMPRESSED_MARKER];
        payload.extend_from_slice(&base64_encode(b"not zlib data"));
        let err = PayloadFormat::UrlSafe
            .load_payload::<Value>(&payload)
            .unwrap_err();
        assert!(err.to_string().contains("decompress"));
    }

    #[test]
    fn invalid_json_is_payload_error() {
        let err = PayloadFormat::Json
            .load_payload::<Value>(b"{not json")
            .unwrap_err();
        assert!(matches!(err, BadData::Payload { .. }));
        assert!(!err.is_signature_error());
    }
}
