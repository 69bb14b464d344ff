//! Signed invocation envelope.
//!
//! The node only runs a state-changing call if it arrives wrapped in an
//! envelope signed by the Ed25519 key behind the signer's address. The
//! verified signer becomes the invocation's sole authorization.

use crate::host::{Address, Call};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default invocation expiry window (5 minutes)
pub const INVOCATION_EXPIRY_SECS: u64 = 300;

/// Tolerated clock skew for timestamps from the future
pub const MAX_CLOCK_SKEW_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedInvocation {
    /// Signer's Ed25519 public key (64 hex chars)
    pub signer_pubkey: String,
    /// Must be greater than the last nonce accepted for this signer
    pub nonce: u64,
    /// Unix timestamp when the invocation was signed
    pub timestamp: u64,
    pub call: Call,
    /// Ed25519 signature (128 hex chars)
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignedInvocationError {
    #[error("invalid pubkey: {0}")]
    InvalidPubkey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signature does not match")]
    SignatureMismatch,

    #[error("invocation expired")]
    Expired,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SignedInvocation {
    /// Sign `call` with `key`
    pub fn sign(key: &SigningKey, nonce: u64, timestamp: u64, call: Call) -> Result<Self, SignedInvocationError> {
        let mut invocation = SignedInvocation {
            signer_pubkey: hex::encode(key.verifying_key().as_bytes()),
            nonce,
            timestamp,
            call,
            signature: String::new(),
        };
        let bytes = invocation.to_signing_bytes()?;
        invocation.signature = hex::encode(key.sign(&bytes).to_bytes());
        Ok(invocation)
    }

    /// Canonical bytes to sign:
    /// SHA256(nonce || timestamp || signer_pubkey || call_json)
    pub fn to_signing_bytes(&self) -> Result<Vec<u8>, SignedInvocationError> {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(self.decode_pubkey()?.as_bytes());
        let call_json = serde_json::to_vec(&self.call)
            .map_err(|e| SignedInvocationError::Serialization(e.to_string()))?;
        hasher.update(call_json);
        Ok(hasher.finalize().to_vec())
    }

    fn decode_pubkey(&self) -> Result<VerifyingKey, SignedInvocationError> {
        let bytes = hex::decode(&self.signer_pubkey)
            .map_err(|e| SignedInvocationError::InvalidPubkey(e.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| SignedInvocationError::InvalidPubkey(format!("expected 32 bytes, got {}", b.len())))?;
        VerifyingKey::from_bytes(&array).map_err(|e| SignedInvocationError::InvalidPubkey(e.to_string()))
    }

    /// Address the signature speaks for
    pub fn signer(&self) -> Result<Address, SignedInvocationError> {
        Ok(Address::from_public_key(&self.decode_pubkey()?))
    }

    /// Verify the signature locally using Ed25519
    pub fn verify(&self) -> Result<(), SignedInvocationError> {
        let verifying_key = self.decode_pubkey()?;

        let sig_bytes = hex::decode(&self.signature)
            .map_err(|e| SignedInvocationError::InvalidSignature(e.to_string()))?;
        let sig_array: [u8; 64] = sig_bytes
            .try_into()
            .map_err(|b: Vec<u8>| SignedInvocationError::InvalidSignature(format!("expected 64 bytes, got {}", b.len())))?;
        let signature = Signature::from_bytes(&sig_array);

        verifying_key
            .verify(&self.to_signing_bytes()?, &signature)
            .map_err(|_| SignedInvocationError::SignatureMismatch)
    }

    pub fn is_expired_at(&self, now: u64, window_secs: u64) -> bool {
        if self.timestamp > now.saturating_add(MAX_CLOCK_SKEW_SECS) {
            return true;
        }
        now > self.timestamp.saturating_add(window_secs)
    }

    /// Check expiry and signature; returns the authenticated signer
    pub fn validate_at(&self, now: u64, window_secs: u64) -> Result<Address, SignedInvocationError> {
        if self.is_expired_at(now, window_secs) {
            return Err(SignedInvocationError::Expired);
        }
        self.verify()?;
        self.signer()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SigningKey {
        SigningKey::from_bytes(&[42u8; 32])
    }

    fn call() -> Call {
        Call::ClaimWinnings {
            user: Address::from_public_key(&key().verifying_key()),
            market_id: 0,
        }
    }

    #[test]
    fn test_sign_and_validate() {
        let invocation = SignedInvocation::sign(&key(), 1, 1_000, call()).unwrap();
        let signer = invocation.validate_at(1_010, INVOCATION_EXPIRY_SECS).unwrap();
        assert_eq!(signer, Address::from_public_key(&key().verifying_key()));
    }

    #[test]
    fn test_tampered_call_rejected() {
        let mut invocation = SignedInvocation::sign(&key(), 1, 1_000, call()).unwrap();
        invocation.call = Call::ClaimWinnings {
            user: Address::new("ACCT_MALLORY"),
            market_id: 0,
        };
        assert_eq!(invocation.verify(), Err(SignedInvocationError::SignatureMismatch));
    }

    #[test]
    fn test_tampered_nonce_rejected() {
        let mut invocation = SignedInvocation::sign(&key(), 1, 1_000, call()).unwrap();
        invocation.nonce = 2;
        assert_eq!(invocation.verify(), Err(SignedInvocationError::SignatureMismatch));
    }

    #[test]
    fn test_foreign_pubkey_rejected() {
        let mut invocation = SignedInvocation::sign(&key(), 1, 1_000, call()).unwrap();
        let other = SigningKey::generate(&mut rand_core::OsRng);
        invocation.signer_pubkey = hex::encode(other.verifying_key().as_bytes());
        assert_eq!(invocation.verify(), Err(SignedInvocationError::SignatureMismatch));
    }

    #[test]
    fn test_malformed_signature() {
        let mut invocation = SignedInvocation::sign(&key(), 1, 1_000, call()).unwrap();
        invocation.signature = "abcd".to_string();
        assert!(matches!(invocation.verify(), Err(SignedInvocationError::InvalidSignature(_))));
    }

    #[test]
    fn test_expiry_window() {
        let invocation = SignedInvocation::sign(&key(), 1, 1_000, call()).unwrap();
        assert!(!invocation.is_expired_at(1_300, INVOCATION_EXPIRY_SECS));
        assert!(invocation.is_expired_at(1_301, INVOCATION_EXPIRY_SECS));
        // from the future beyond skew tolerance
        assert!(invocation.is_expired_at(900, INVOCATION_EXPIRY_SECS));
        assert_eq!(
            invocation.validate_at(5_000, INVOCATION_EXPIRY_SECS),
            Err(SignedInvocationError::Expired)
        );
    }

    #[test]
    fn test_huge_expiry_window_does_not_overflow() {
        let invocation = SignedInvocation::sign(&key(), 1, u64::MAX - 10, call()).unwrap();
        assert!(!invocation.is_expired_at(u64::MAX, u64::MAX));
        assert!(!invocation.is_expired_at(u64::MAX - 30, u64::MAX));
        assert_eq!(
            invocation.validate_at(u64::MAX, u64::MAX).unwrap(),
            Address::from_public_key(&key().verifying_key())
        );
    }
}
