//! # dsse
//!
//! Dead Simple Signing Envelope: attach one or more detached signatures to a
//! typed, opaque payload and verify them.
//!
//! ## Features
//!
//! - **PAE encoding**: signatures cover a length-prefixed encoding of the
//!   payload type and payload, never the raw payload
//! - **Multiple signers**: one envelope, one signature per signer, all or nothing
//! - **Key-ID aware verification**: every signature is checked against every
//!   verifier whose key ID does not rule it out
//! - **Pluggable algorithms** through the [`Signer`] and [`Verifier`] traits,
//!   with Ed25519 adapters included
//! - **JSON envelopes** with base64 byte fields
//!
//! ## Quick Start
//!
//! ### Sign and Verify
//!
//! ```rust
//! use dsse::{Ed25519Signer, EnvelopeSigner, EnvelopeVerifier};
//!
//! let signer = Ed25519Signer::from_bytes(&[1u8; 32]);
//! let verifier = signer.verifier();
//!
//! let envelope = EnvelopeSigner::default()
//!     .with_signer(&signer)
//!     .sign("application/vnd.in-toto+json", b"{\"_type\":\"statement\"}")
//!     .unwrap();
//!
//! let result = EnvelopeVerifier::default()
//!     .with_verifier(&verifier)
//!     .verify(&envelope)
//!     .unwrap();
//! assert_eq!(result.key_ids(), vec![signer.key_id()]);
//! ```
//!
//! ### Multiple Signatures and Thresholds
//!
//! ```rust
//! use dsse::{sign_envelope, verify_envelope, Ed25519Signer, Envelope};
//!
//! let alice = Ed25519Signer::from_bytes(&[1u8; 32]).with_key_id("alice");
//! let bob = Ed25519Signer::from_bytes(&[2u8; 32]).with_key_id("bob");
//!
//! let envelope = sign_envelope(&[&alice, &bob], "text/plain", b"release v1.2.0").unwrap();
//!
//! // Ship it as JSON
//! let json = envelope.to_json().unwrap();
//! let received = Envelope::from_json(&json).unwrap();
//!
//! let (alice_v, bob_v) = (alice.verifier(), bob.verifier());
//! let result = verify_envelope(&[&alice_v, &bob_v], &received).unwrap();
//! assert!(result.distinct_key_ids().len() >= 2);
//! ```

pub mod envelope;
pub mod error;
pub mod keys;
pub mod pae;
pub mod signer;
pub mod verifier;

// Re-export main types for convenience
pub use envelope::{decode_base64, encode_base64, Envelope, Signature};
pub use error::{BoxError, DsseError, Result};
pub use keys::{key_id_for, Ed25519Signer, Ed25519Verifier};
pub use signer::{sign_envelope, EnvelopeSigner, Signer};
pub use verifier::{verify_envelope, EnvelopeVerifier, SignVerifier, VerificationResult, Verifier};
