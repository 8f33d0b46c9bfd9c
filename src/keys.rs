//! Ed25519 signer and verifier over caller-supplied keys.
//!
//! Key generation and storage are left to the caller; these types only adapt
//! `ed25519-dalek` keys to the [`Signer`] and [`Verifier`] capabilities.

use crate::error::{BoxError, DsseError, Result};
use crate::signer::Signer;
use crate::verifier::Verifier;
use ed25519_dalek::{Signature, Signer as DalekSigner, SigningKey, VerifyingKey};

/// Length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Default key ID for a public key: hex BLAKE3 hash of its bytes.
pub fn key_id_for(public_key: &VerifyingKey) -> String {
    blake3::hash(public_key.as_bytes()).to_hex().to_string()
}

/// Signs with an Ed25519 signing key.
pub struct Ed25519Signer {
    signing_key: SigningKey,
    key_id: String,
}

impl Ed25519Signer {
    /// Wrap a signing key, deriving the key ID from its public half.
    pub fn new(signing_key: SigningKey) -> Self {
        let key_id = key_id_for(&signing_key.verifying_key());
        Self { signing_key, key_id }
    }

    /// Create a signer from raw secret key bytes (32 bytes).
    pub fn from_bytes(secret_bytes: &[u8; 32]) -> Self {
        Self::new(SigningKey::from_bytes(secret_bytes))
    }

    /// Override the key ID. An empty ID turns key identification off.
    pub fn with_key_id<S: Into<String>>(mut self, key_id: S) -> Self {
        self.key_id = key_id.into();
        self
    }

    /// The key ID written into signatures.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// A verifier for this key carrying the same key ID.
    pub fn verifier(&self) -> Ed25519Verifier {
        Ed25519Verifier::new(self.signing_key.verifying_key()).with_key_id(self.key_id.clone())
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> std::result::Result<Vec<u8>, BoxError> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl Verifier for Ed25519Signer {
    fn verify(&self, message: &[u8], signature: &[u8]) -> std::result::Result<(), BoxError> {
        verify_strict(&self.signing_key.verifying_key(), message, signature)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Verifies with an Ed25519 public key.
#[derive(Debug, Clone)]
pub struct Ed25519Verifier {
    verifying_key: VerifyingKey,
    key_id: String,
}

impl Ed25519Verifier {
    /// Wrap a public key, deriving the key ID from it.
    pub fn new(verifying_key: VerifyingKey) -> Self {
        let key_id = key_id_for(&verifying_key);
        Self { verifying_key, key_id }
    }

    /// Create a verifier from raw public key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            DsseError::InvalidKey(format!(
                "Invalid public key length: expected {}, got {}",
                PUBLIC_KEY_LENGTH,
                bytes.len()
            ))
        })?;
        let verifying_key = VerifyingKey::from_bytes(&arr)
            .map_err(|e| DsseError::InvalidKey(e.to_string()))?;
        Ok(Self::new(verifying_key))
    }

    /// Override the key ID. An empty ID turns key identification off.
    pub fn with_key_id<S: Into<String>>(mut self, key_id: S) -> Self {
        self.key_id = key_id.into();
        self
    }

    /// The key ID matched against signatures.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Get the raw bytes of the public key.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.to_bytes()
    }
}

impl Verifier for Ed25519Verifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> std::result::Result<(), BoxError> {
        verify_strict(&self.verifying_key, message, signature)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

fn verify_strict(
    key: &VerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> std::result::Result<(), BoxError> {
    let sig = Signature::from_slice(signature)?;
    key.verify_strict(message, &sig)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn generate() -> Ed25519Signer {
        Ed25519Signer::new(SigningKey::generate(&mut OsRng))
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = generate();
        let verifier = signer.verifier();

        let message = b"Test message";
        let signature = Signer::sign(&signer, message).unwrap();

        assert_eq!(signature.len(), 64);
        assert!(verifier.verify(message, &signature).is_ok());
        assert!(Verifier::verify(&signer, message, &signature).is_ok());
        assert_eq!(verifier.key_id(), signer.key_id());
    }

    #[test]
    fn test_other_key_fails() {
        let signer = generate();
        let other = generate();

        let message = b"Test message";
        let signature = Signer::sign(&other, message).unwrap();

        assert!(signer.verifier().verify(message, &signature).is_err());
    }

    #[test]
    fn test_short_signature_rejected() {
        let verifier = generate().verifier();
        assert!(verifier.verify(b"Test message", &[0u8; 63]).is_err());
    }

    #[test]
    fn test_default_key_id() {
        let signer = Ed25519Signer::from_bytes(&[7u8; 32]);
        let verifier = signer.verifier();

        assert_eq!(signer.key_id().len(), 64);
        assert!(signer.key_id().chars().all(|c| c.is_ascii_hexdigit()));

        let rebuilt = Ed25519Verifier::from_bytes(&verifier.public_key_bytes()).unwrap();
        assert_eq!(rebuilt.key_id(), signer.key_id());
    }

    #[test]
    fn test_key_id_override() {
        let signer = generate().with_key_id("release-2024");
        assert_eq!(signer.key_id(), "release-2024");
        assert_eq!(signer.verifier().key_id(), "release-2024");

        let anonymous = generate().with_key_id("");
        assert_eq!(Signer::key_id(&anonymous), "");
    }

    #[test]
    fn test_invalid_public_key_length() {
        let result = Ed25519Verifier::from_bytes(&[0u8; 16]);
        assert!(matches!(result, Err(DsseError::InvalidKey(_))));
    }
}
