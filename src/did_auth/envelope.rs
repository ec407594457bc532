//! Compact signed envelope: `base64url(header).base64url(payload).base64url(sig)`.
//!
//! Segments are kept exactly as received; the signing input is rebuilt from
//! the original encoded text, never re-encoded.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Deserialize;

use super::error::VerifyError;

/// base64url that accepts padded and unpadded input, and encodes unpadded.
pub const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Algorithms accepted in the envelope header.
pub const ALLOWED_ALGORITHMS: &[&str] = &["EdDSA"];

/// Decoded envelope header.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeHeader {
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

/// A parsed compact envelope borrowing the original text.
#[derive(Debug)]
pub struct Envelope<'a> {
    header_segment: &'a str,
    payload_segment: &'a str,
    signature_segment: &'a str,
}

impl<'a> Envelope<'a> {
    /// Split into exactly three dot-separated segments.
    pub fn parse(compact: &'a str) -> Result<Self, VerifyError> {
        let parts: Vec<&str> = compact.split('.').collect();
        if parts.len() != 3 {
            return Err(VerifyError::MalformedEnvelope(format!(
                "expected 3 parts, got {}",
                parts.len()
            )));
        }

        Ok(Self {
            header_segment: parts[0],
            payload_segment: parts[1],
            signature_segment: parts[2],
        })
    }

    /// Decode the header as JSON metadata.
    pub fn header(&self) -> Result<EnvelopeHeader, VerifyError> {
        let bytes = decode_segment(self.header_segment, "header")?;
        serde_json::from_slice(&bytes)
            .map_err(|e| VerifyError::MalformedEnvelope(format!("header is not JSON: {}", e)))
    }

    /// Decode the header and require an allowed algorithm.
    pub fn require_algorithm(&self) -> Result<EnvelopeHeader, VerifyError> {
        let header = self.header()?;
        match header.alg.as_deref() {
            Some(alg) if ALLOWED_ALGORITHMS.contains(&alg) => Ok(header),
            Some(alg) => Err(VerifyError::UnsupportedAlgorithm(alg.to_string())),
            None => Err(VerifyError::UnsupportedAlgorithm("<missing>".into())),
        }
    }

    /// Decoded payload bytes.
    pub fn payload(&self) -> Result<Vec<u8>, VerifyError> {
        decode_segment(self.payload_segment, "payload")
    }

    /// Decoded signature bytes (length is checked by the verifier).
    pub fn signature(&self) -> Result<Vec<u8>, VerifyError> {
        decode_segment(self.signature_segment, "signature")
    }

    /// The exact bytes that were signed: `header_segment "." payload_segment`.
    pub fn signing_input(&self) -> Vec<u8> {
        let mut input =
            Vec::with_capacity(self.header_segment.len() + 1 + self.payload_segment.len());
        input.extend_from_slice(self.header_segment.as_bytes());
        input.push(b'.');
        input.extend_from_slice(self.payload_segment.as_bytes());
        input
    }
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, VerifyError> {
    BASE64URL
        .decode(segment)
        .map_err(|e| VerifyError::MalformedEnvelope(format!("{} is not base64url: {}", what, e)))
}
