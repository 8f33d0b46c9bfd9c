//! Envelope signing.

use crate::envelope::{Envelope, Signature};
use crate::error::{BoxError, DsseError, Result};
use crate::pae;
use tracing::debug;

/// A signing capability.
///
/// Implementations supply the algorithm and key material; the engine only
/// ever hands them PAE bytes. If a signer is shared across threads it must be
/// safe for concurrent use on its own.
pub trait Signer {
    /// Sign `message` and return the raw signature bytes.
    fn sign(&self, message: &[u8]) -> std::result::Result<Vec<u8>, BoxError>;

    /// Key ID of the signing key. Empty if not supported.
    fn key_id(&self) -> &str {
        ""
    }
}

/// An ordered group of signers producing one envelope.
#[derive(Default)]
pub struct EnvelopeSigner<'a> {
    signers: Vec<&'a dyn Signer>,
}

impl<'a> EnvelopeSigner<'a> {
    /// Group the given signers, keeping their order.
    pub fn new<I>(signers: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn Signer>,
    {
        Self {
            signers: signers.into_iter().collect(),
        }
    }

    /// Append another signer.
    pub fn with_signer(mut self, signer: &'a dyn Signer) -> Self {
        self.signers.push(signer);
        self
    }

    /// Number of signers in the group.
    pub fn len(&self) -> usize {
        self.signers.len()
    }

    /// Whether the group has no signers.
    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    /// Sign `payload` with its type, one signature per signer in order.
    ///
    /// Either every signer succeeds and the envelope is returned, or the
    /// first failure is returned and nothing else.
    pub fn sign(&self, payload_type: &str, payload: &[u8]) -> Result<Envelope> {
        if self.signers.is_empty() {
            return Err(DsseError::NoSigners);
        }

        let mut envelope = Envelope::new(payload_type, payload);
        let pae = pae::encode(&envelope.payload_type, &envelope.payload);

        let mut signatures = Vec::with_capacity(self.signers.len());
        for signer in &self.signers {
            let sig = signer.sign(&pae).map_err(DsseError::Signing)?;
            signatures.push(Signature::new(signer.key_id(), sig));
        }
        envelope.signatures = signatures;

        debug!(
            payload_type = %envelope.payload_type,
            payload_len = envelope.payload.len(),
            signatures = envelope.signatures.len(),
            "signed envelope"
        );
        Ok(envelope)
    }
}

impl std::fmt::Debug for EnvelopeSigner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeSigner")
            .field("key_ids", &self.signers.iter().map(|s| s.key_id()).collect::<Vec<_>>())
            .finish()
    }
}

/// Convenience function to sign a payload with a list of signers.
pub fn sign_envelope(signers: &[&dyn Signer], payload_type: &str, payload: &[u8]) -> Result<Envelope> {
    EnvelopeSigner::new(signers.iter().copied()).sign(payload_type, payload)
}
