//! Pre-Authentication Encoding (PAE).
//!
//! Signatures are never computed over the raw payload. They cover
//!
//! ```text
//! "DSSEv1" SP LEN(type) SP type SP LEN(payload) SP payload
//! ```
//!
//! where `LEN` is the byte length written as ASCII decimal with no leading
//! zeros. Field boundaries are recovered from the declared lengths alone, so
//! no choice of type or payload bytes can make two different pairs encode to
//! the same string.

use crate::error::{DsseError, Result};

/// Protocol tag at the start of every encoding.
pub const PAE_PREFIX: &[u8] = b"DSSEv1";

const SP: u8 = b' ';

/// Encode a payload type and payload into the bytes that get signed.
///
/// Total and deterministic; an empty payload type or payload encodes with a
/// length of `0` and an empty field.
pub fn encode(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let type_len = payload_type.len().to_string();
    let payload_len = payload.len().to_string();

    let mut pae = Vec::with_capacity(
        PAE_PREFIX.len() + type_len.len() + payload_type.len() + payload_len.len() + payload.len() + 4,
    );
    pae.extend_from_slice(PAE_PREFIX);
    pae.push(SP);
    pae.extend_from_slice(type_len.as_bytes());
    pae.push(SP);
    pae.extend_from_slice(payload_type.as_bytes());
    pae.push(SP);
    pae.extend_from_slice(payload_len.as_bytes());
    pae.push(SP);
    pae.extend_from_slice(payload);
    pae
}

/// Split an encoding back into its payload type and payload.
///
/// Only the declared lengths are used to find the fields. Anything that
/// [`encode`] could not have produced is rejected.
pub fn decode(encoded: &[u8]) -> Result<(&str, &[u8])> {
    let rest = encoded
        .strip_prefix(PAE_PREFIX)
        .and_then(|rest| rest.strip_prefix(&[SP]))
        .ok_or_else(|| DsseError::InvalidFormat("missing DSSEv1 prefix".to_string()))?;

    let (type_len, rest) = read_length(rest)?;
    if rest.len() < type_len {
        return Err(DsseError::InvalidFormat(format!(
            "payload type length {} exceeds remaining {} bytes",
            type_len,
            rest.len()
        )));
    }
    let (payload_type, rest) = rest.split_at(type_len);
    let payload_type = std::str::from_utf8(payload_type)
        .map_err(|e| DsseError::InvalidFormat(format!("payload type is not UTF-8: {}", e)))?;

    let rest = rest
        .strip_prefix(&[SP])
        .ok_or_else(|| DsseError::InvalidFormat("missing separator after payload type".to_string()))?;

    let (payload_len, payload) = read_length(rest)?;
    if payload.len() != payload_len {
        return Err(DsseError::InvalidFormat(format!(
            "payload length mismatch: declared {}, found {}",
            payload_len,
            payload.len()
        )));
    }

    Ok((payload_type, payload))
}

/// Read `<decimal> SP` from the front of `buf`.
fn read_length(buf: &[u8]) -> Result<(usize, &[u8])> {
    let end = buf
        .iter()
        .position(|&b| b == SP)
        .ok_or_else(|| DsseError::InvalidFormat("unterminated length field".to_string()))?;
    let digits = &buf[..end];

    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(DsseError::InvalidFormat("length is not a decimal number".to_string()));
    }
    if digits.len() > 1 && digits[0] == b'0' {
        return Err(DsseError::InvalidFormat("length has leading zeros".to_string()));
    }

    let len = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| DsseError::InvalidFormat("length out of range".to_string()))?;

    Ok((len, &buf[end + 1..]))
}
