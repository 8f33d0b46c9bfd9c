//! Envelope verification.

use crate::envelope::Envelope;
use crate::error::{BoxError, DsseError, Result};
use crate::pae;
use crate::signer::Signer;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// A verification capability.
///
/// As with [`Signer`], thread safety is the implementation's business.
pub trait Verifier {
    /// Check that `signature` was made over `message`. `Ok(())` if valid.
    fn verify(&self, message: &[u8], signature: &[u8]) -> std::result::Result<(), BoxError>;

    /// Key ID of the verification key. Empty if not supported.
    fn key_id(&self) -> &str {
        ""
    }
}

/// Something that can both sign and verify, e.g. a key pair.
pub trait SignVerifier: Signer + Verifier {}

impl<T: Signer + Verifier + ?Sized> SignVerifier for T {}

/// The verifiers that recognized an envelope.
///
/// One entry per successful signature/verifier pair, in signature order, so a
/// verifier appears again for every further signature it accepts.
pub struct VerificationResult<'a> {
    recognized: Vec<&'a dyn Verifier>,
}

impl<'a> VerificationResult<'a> {
    /// All recognizing verifiers, duplicates included.
    pub fn recognized(&self) -> &[&'a dyn Verifier] {
        &self.recognized
    }

    /// Number of successful signature/verifier pairs. Never zero.
    pub fn len(&self) -> usize {
        self.recognized.len()
    }

    /// Pairs with [`len`](Self::len). `verify` only returns a result when
    /// at least one pair succeeded, so this is `false` for any such result.
    pub fn is_empty(&self) -> bool {
        self.recognized.is_empty()
    }

    /// Key IDs of the recognizing verifiers, in order.
    pub fn key_ids(&self) -> Vec<&str> {
        self.recognized.iter().map(|v| v.key_id()).collect()
    }

    /// Distinct non-empty key IDs, for threshold checks such as "at least
    /// two different keys".
    pub fn distinct_key_ids(&self) -> BTreeSet<&str> {
        self.recognized
            .iter()
            .map(|v| v.key_id())
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// Take the recognizing verifiers.
    pub fn into_verifiers(self) -> Vec<&'a dyn Verifier> {
        self.recognized
    }
}

impl std::fmt::Debug for VerificationResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationResult")
            .field("key_ids", &self.key_ids())
            .finish()
    }
}

/// An ordered group of verifiers checked against every signature.
#[derive(Default)]
pub struct EnvelopeVerifier<'a> {
    verifiers: Vec<&'a dyn Verifier>,
}

impl<'a> EnvelopeVerifier<'a> {
    /// Group the given verifiers, keeping their order.
    pub fn new<I>(verifiers: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn Verifier>,
    {
        Self {
            verifiers: verifiers.into_iter().collect(),
        }
    }

    /// Append another verifier.
    pub fn with_verifier(mut self, verifier: &'a dyn Verifier) -> Self {
        self.verifiers.push(verifier);
        self
    }

    /// Number of verifiers in the group.
    pub fn len(&self) -> usize {
        self.verifiers.len()
    }

    /// Whether the group has no verifiers.
    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }

    /// Verify the envelope and return every verifier that accepted a
    /// signature.
    ///
    /// Every signature is tried against every verifier, skipping pairs whose
    /// key IDs are both set and differ. There is no early exit on success:
    /// callers applying a threshold need the full list. When nothing verifies
    /// the error carries no detail about which pairs failed.
    pub fn verify(&self, envelope: &Envelope) -> Result<VerificationResult<'a>> {
        if self.verifiers.is_empty() {
            return Err(DsseError::NoVerifiers);
        }

        let pae = pae::encode(&envelope.payload_type, &envelope.payload);

        let mut recognized = Vec::new();
        let mut attempted = 0usize;
        for sig in &envelope.signatures {
            for &verifier in &self.verifiers {
                let verifier_key_id = verifier.key_id();
                if !sig.key_id.is_empty() && !verifier_key_id.is_empty() && sig.key_id != verifier_key_id {
                    trace!(kid = %sig.key_id, "key id mismatch, skipping pair");
                    continue;
                }

                attempted += 1;
                if verifier.verify(&pae, &sig.signature).is_ok() {
                    recognized.push(verifier);
                }
            }
        }

        debug!(
            signatures = envelope.signatures.len(),
            verifiers = self.verifiers.len(),
            attempted,
            recognized = recognized.len(),
            "verified envelope"
        );

        if recognized.is_empty() {
            return Err(DsseError::Verification);
        }
        Ok(VerificationResult { recognized })
    }

    /// Quick check if at least one signature verifies.
    pub fn is_valid(&self, envelope: &Envelope) -> bool {
        self.verify(envelope).is_ok()
    }
}

impl std::fmt::Debug for EnvelopeVerifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeVerifier")
            .field("key_ids", &self.verifiers.iter().map(|v| v.key_id()).collect::<Vec<_>>())
            .finish()
    }
}

/// Convenience function to verify an envelope against a list of verifiers.
pub fn verify_envelope<'a>(
    verifiers: &[&'a dyn Verifier],
    envelope: &Envelope,
) -> Result<VerificationResult<'a>> {
    EnvelopeVerifier::new(verifiers.iter().copied()).verify(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Signature;
    use std::cell::Cell;

    /// Accepts a signature equal to `secret ++ message`.
    struct PrefixVerifier {
        key_id: &'static str,
        secret: &'static [u8],
        calls: Cell<usize>,
    }

    impl PrefixVerifier {
        fn new(key_id: &'static str, secret: &'static [u8]) -> Self {
            Self {
                key_id,
                secret,
                calls: Cell::new(0),
            }
        }

        fn signature_for(&self, envelope: &Envelope) -> Signature {
            Signature::new(self.key_id, [self.secret, envelope.pae().as_slice()].concat())
        }
    }

    impl Verifier for PrefixVerifier {
        fn verify(&self, message: &[u8], signature: &[u8]) -> std::result::Result<(), BoxError> {
            self.calls.set(self.calls.get() + 1);
            if signature.strip_prefix(self.secret) == Some(message) {
                Ok(())
            } else {
                Err("bad signature".into())
            }
        }

        fn key_id(&self) -> &str {
            self.key_id
        }
    }

    #[test]
    fn test_verify_without_verifiers() {
        let envelope = Envelope::new("t", b"p");
        let result = EnvelopeVerifier::default().verify(&envelope);
        assert!(matches!(result, Err(DsseError::NoVerifiers)));
    }

    #[test]
    fn test_verify_unsigned_envelope() {
        let alice = PrefixVerifier::new("alice", b"a");
        let envelope = Envelope::new("t", b"p");

        let result = verify_envelope(&[&alice], &envelope);
        assert!(matches!(result, Err(DsseError::Verification)));
        assert_eq!(alice.calls.get(), 0);
    }

    #[test]
    fn test_key_id_mismatch_is_skipped() {
        let alice = PrefixVerifier::new("alice", b"a");
        let bob = PrefixVerifier::new("bob", b"b");
        let mut envelope = Envelope::new("t", b"p");
        envelope.signatures.push(alice.signature_for(&envelope));

        let result = verify_envelope(&[&bob, &alice], &envelope).unwrap();

        assert_eq!(result.key_ids(), vec!["alice"]);
        assert_eq!(result.len(), 1);
        assert!(!result.is_empty());
        assert_eq!(bob.calls.get(), 0);
        assert_eq!(alice.calls.get(), 1);
    }

    #[test]
    fn test_empty_key_id_tries_everything() {
        let alice = PrefixVerifier::new("alice", b"a");
        let bob = PrefixVerifier::new("bob", b"b");
        let mut envelope = Envelope::new("t", b"p");
        let mut sig = alice.signature_for(&envelope);
        sig.key_id.clear();
        envelope.signatures.push(sig);

        let result = verify_envelope(&[&bob, &alice], &envelope).unwrap();

        assert_eq!(result.key_ids(), vec!["alice"]);
        assert_eq!(bob.calls.get(), 1);
        assert_eq!(alice.calls.get(), 1);
    }

    #[test]
    fn test_no_short_circuit_and_duplicates_kept() {
        let anon = PrefixVerifier::new("", b"x");
        let other = PrefixVerifier::new("other", b"o");
        let mut envelope = Envelope::new("t", b"p");
        let sig = anon.signature_for(&envelope);
        envelope.signatures.push(Signature::new("k1", sig.signature.clone()));
        envelope.signatures.push(Signature::new("k2", sig.signature));

        let result = verify_envelope(&[&anon, &other], &envelope).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(anon.calls.get(), 2);
        assert_eq!(other.calls.get(), 0);
        assert!(result.distinct_key_ids().is_empty());
    }

    #[test]
    fn test_tampered_payload_fails() {
        let alice = PrefixVerifier::new("alice", b"a");
        let mut envelope = Envelope::new("t", b"p");
        envelope.signatures.push(alice.signature_for(&envelope));
        envelope.payload = b"q".to_vec();

        let verifier = EnvelopeVerifier::default().with_verifier(&alice);
        assert!(!verifier.is_valid(&envelope));
        assert!(matches!(verifier.verify(&envelope), Err(DsseError::Verification)));
    }

    #[test]
    fn test_payload_type_is_covered() {
        let alice = PrefixVerifier::new("alice", b"a");
        let mut envelope = Envelope::new("t", b"p");
        envelope.signatures.push(alice.signature_for(&envelope));
        envelope.payload_type = "u".to_string();

        assert!(verify_envelope(&[&alice], &envelope).is_err());
    }
}
