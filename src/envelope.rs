//! Envelope data structures and JSON serialization.
//!
//! Byte fields travel as base64. Encoding always uses the padded standard
//! alphabet; decoding accepts padded standard or padded URL-safe input and
//! nothing else. Decoding ignores line breaks and non-zero trailing bits, and
//! a JSON `null` byte field or signature list reads as empty.

use crate::error::Result;
use crate::pae;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true);

/// Padded standard alphabet, trailing bits allowed.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Padded URL-safe alphabet, trailing bits allowed.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// A payload together with its type and the detached signatures over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The opaque payload bytes.
    #[serde(default, with = "base64_bytes")]
    pub payload: Vec<u8>,

    /// How to interpret the payload, e.g. `application/vnd.in-toto+json`.
    #[serde(rename = "payloadType")]
    pub payload_type: String,

    /// Signatures in signer order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub signatures: Vec<Signature>,
}

/// A single detached signature over the PAE of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Key ID of the signing key, empty when the signer has none.
    #[serde(rename = "kid", default, skip_serializing_if = "String::is_empty")]
    pub key_id: String,

    /// Raw signature bytes.
    #[serde(rename = "sig", default, with = "base64_bytes")]
    pub signature: Vec<u8>,
}

impl Envelope {
    /// Create an unsigned envelope holding its own copy of `payload`.
    pub fn new<S: Into<String>>(payload_type: S, payload: &[u8]) -> Self {
        Self {
            payload: payload.to_vec(),
            payload_type: payload_type.into(),
            signatures: Vec::new(),
        }
    }

    /// The bytes every signature in this envelope must cover.
    pub fn pae(&self) -> Vec<u8> {
        pae::encode(&self.payload_type, &self.payload)
    }

    /// Get the number of signatures.
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Check if there are any signatures.
    pub fn has_signatures(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Parse an envelope from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let envelope: Self = serde_json::from_str(json)?;
        Ok(envelope)
    }

    /// Parse an envelope from JSON bytes.
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        let envelope: Self = serde_json::from_slice(json)?;
        Ok(envelope)
    }

    /// Serialize the envelope to a compact JSON string.
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(json)
    }

    /// Serialize the envelope to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }
}

impl Signature {
    /// Create a signature entry.
    pub fn new<S: Into<String>>(key_id: S, signature: Vec<u8>) -> Self {
        Self {
            key_id: key_id.into(),
            signature,
        }
    }
}

/// Encode bytes the way envelope fields are written.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode an envelope byte field: padded standard alphabet first, then
/// padded URL-safe.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let encoded = strip_line_breaks(encoded);
    match STANDARD_LENIENT.decode(encoded.as_bytes()) {
        Ok(bytes) => Ok(bytes),
        Err(_) => Ok(URL_SAFE_LENIENT.decode(encoded.as_bytes())?),
    }
}

fn strip_line_breaks(encoded: &str) -> Cow<'_, str> {
    if encoded.contains(|c: char| c == '\r' || c == '\n') {
        Cow::Owned(encoded.chars().filter(|&c| c != '\r' && c != '\n').collect())
    } else {
        Cow::Borrowed(encoded)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<Signature>, D::Error> {
    Ok(Option::<Vec<Signature>>::deserialize(deserializer)?.unwrap_or_default())
}

mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_base64(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => super::decode_base64(&encoded).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
