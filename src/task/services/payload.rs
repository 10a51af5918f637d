//! Decoding of base64 image payloads returned by the photo processor.
//!
//! Payloads may carry a `data:<mime>;base64,` prefix, embedded line breaks
//! and missing `=` padding.

use crate::error::diagnostic_prefix;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const DATA_URL_MARKER: &str = "base64,";

/// Errors returned while decoding an image payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload is missing or empty after normalization.
    #[error("empty image payload")]
    Empty,

    /// The payload is not valid base64.
    #[error("malformed image payload: {prefix}")]
    Malformed {
        /// Leading characters of the normalized payload.
        prefix: String,
    },
}

impl PayloadError {
    /// Returns the short description embedded in failure reasons.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Empty => "empty",
            Self::Malformed { prefix } => prefix,
        }
    }
}

/// Decodes an optional base64 payload into image bytes.
///
/// # Errors
///
/// Returns [`PayloadError::Empty`] for absent or blank payloads and
/// [`PayloadError::Malformed`] when the text is not base64.
pub fn decode_image_payload(payload: Option<&str>) -> Result<Vec<u8>, PayloadError> {
    let raw = payload.ok_or(PayloadError::Empty)?;
    let body = raw
        .split_once(DATA_URL_MARKER)
        .map_or(raw, |(_, encoded)| encoded);
    let normalized: String = body.chars().filter(|ch| !ch.is_whitespace()).collect();
    if normalized.is_empty() {
        return Err(PayloadError::Empty);
    }
    let bytes = LENIENT
        .decode(normalized.as_bytes())
        .map_err(|_| PayloadError::Malformed {
            prefix: diagnostic_prefix(&normalized),
        })?;
    if bytes.is_empty() {
        return Err(PayloadError::Empty);
    }
    Ok(bytes)
}
