//! Ed25519 verification of signed challenge envelopes.
//!
//! Verification is purely local: the key comes out of the DID itself, so
//! nothing here performs I/O. Every parse or crypto failure on attacker
//! supplied input ends as `false` at [`DidVerifier::verify_did_authentication`].

use ed25519_dalek::{Signature, VerifyingKey};
use std::sync::Arc;

use super::did::{KeyResolver, PUBLIC_KEY_LEN, SelfCertifyingResolver};
use super::envelope::Envelope;
use super::error::VerifyError;

/// Verify an Ed25519 signature.
///
/// # Arguments
/// * `public_key` - 32-byte Ed25519 public key
/// * `message` - The message that was signed
/// * `signature` - 64-byte Ed25519 signature
///
/// # Returns
/// `true` if signature is valid, `false` otherwise. Weak keys and
/// non-canonical signatures are rejected.
pub fn verify_ed25519(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let pk_bytes: [u8; PUBLIC_KEY_LEN] = match public_key.try_into() {
        Ok(b) => b,
        Err(_) => return false,
    };

    let sig_bytes: [u8; 64] = match signature.try_into() {
        Ok(b) => b,
        Err(_) => return false,
    };

    let verifying_key = match VerifyingKey::from_bytes(&pk_bytes) {
        Ok(k) => k,
        Err(_) => return false,
    };

    let sig = Signature::from_bytes(&sig_bytes);
    verifying_key.verify_strict(message, &sig).is_ok()
}

/// Signature verifier for DID authentication envelopes.
#[derive(Clone)]
pub struct DidVerifier {
    resolver: Arc<dyn KeyResolver>,
}

impl DidVerifier {
    /// Verifier over self-certifying DIDs of the given methods.
    pub fn self_certifying<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_resolver(Arc::new(SelfCertifyingResolver::new(methods)))
    }

    /// Verifier with a custom key-resolution strategy.
    pub fn with_resolver(resolver: Arc<dyn KeyResolver>) -> Self {
        Self { resolver }
    }

    /// Public key bytes controlling `did`.
    pub fn extract_public_key(&self, did: &str) -> Result<[u8; PUBLIC_KEY_LEN], VerifyError> {
        self.resolver.resolve(did)
    }

    /// Check `envelope` against `challenge` and `public_key`.
    ///
    /// Structural problems are errors; a signature that does not verify is
    /// `Ok(false)`.
    pub fn verify(
        &self,
        challenge: &str,
        envelope: &str,
        public_key: &[u8],
    ) -> Result<bool, VerifyError> {
        let envelope = Envelope::parse(envelope)?;
        envelope.require_algorithm()?;

        let payload = envelope.payload()?;
        if payload != challenge.as_bytes() {
            return Err(VerifyError::ChallengeMismatch);
        }

        let signature = envelope.signature()?;
        Ok(verify_ed25519(
            public_key,
            &envelope.signing_input(),
            &signature,
        ))
    }

    /// Full check for a DID: key extraction then envelope verification.
    /// Never fails; any problem is `false`.
    pub fn verify_did_authentication(&self, did: &str, challenge: &str, envelope: &str) -> bool {
        let outcome = self
            .extract_public_key(did)
            .and_then(|key| self.verify(challenge, envelope, &key));

        match outcome {
            Ok(true) => true,
            Ok(false) => {
                tracing::debug!(did = %did, "envelope signature did not verify");
                false
            }
            Err(e) => {
                tracing::debug!(did = %did, reason = %e, "envelope rejected");
                false
            }
        }
    }
}

impl Default for DidVerifier {
    fn default() -> Self {
        Self::with_resolver(Arc::new(SelfCertifyingResolver::default()))
    }
}

impl std::fmt::Debug for DidVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidVerifier").finish_non_exhaustive()
    }
}

/// Generate a new Ed25519 keypair for testing.
///
/// Returns (private_key_bytes, public_key_bytes).
#[cfg(test)]
pub fn generate_keypair() -> ([u8; 32], [u8; 32]) {
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    let signing_key = SigningKey::generate(&mut OsRng);
    (signing_key.to_bytes(), signing_key.verifying_key().to_bytes())
}

/// Build a signed envelope over `payload` (for testing).
#[cfg(test)]
pub fn sign_envelope(private_key: &[u8; 32], header_json: &str, payload: &[u8]) -> String {
    use base64::Engine;
    use ed25519_dalek::{Signer, SigningKey};

    use super::envelope::BASE64URL;

    let header = BASE64URL.encode(header_json.as_bytes());
    let payload = BASE64URL.encode(payload);
    let signing_input = format!("{}.{}", header, payload);
    let signature = SigningKey::from_bytes(private_key).sign(signing_input.as_bytes());
    format!("{}.{}", signing_input, BASE64URL.encode(signature.to_bytes()))
}
