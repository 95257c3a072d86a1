// src/keys/custodian.rs
//! Institution keypair custody and signing primitives.
//!
//! One secp256k1 keypair per institution, generated at onboarding and held
//! for the life of the institution (rotation is out of scope). The private
//! key never crosses the custodian boundary: callers get `sign`, the public
//! key, and nothing else. Verification is a free function over the public
//! key alone so the read-only verification path needs no custodian access
//! beyond the key directory.
//!
//! Signing follows the hash-then-sign scheme: the message (the hex data
//! hash) is digested with SHA-256 and the digest is signed with ECDSA
//! (RFC 6979 deterministic nonces). Signatures travel as base64 compact
//! (R || S).

use std::collections::HashMap;
use std::sync::Mutex;

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::error::KeyError;
use crate::utils::crypto::{from_hex, sha256, to_hex};

/// Per-institution keypair registry and signing service.
pub struct KeyCustodian {
    /// Signing keys by institution id. The map is the trust boundary.
    keys: Mutex<HashMap<String, SigningKey>>,
}

impl KeyCustodian {
    pub fn new() -> Self {
        KeyCustodian {
            keys: Mutex::new(HashMap::new()),
        }
    }

    /// Generates and stores the institution's keypair.
    ///
    /// # Returns
    /// The hex-encoded public key (SEC1 compressed point) for mirroring onto
    /// the institution profile.
    ///
    /// # Errors
    /// `KeyError::AlreadyProvisioned` if the institution already holds its
    /// one active keypair.
    pub fn generate_keypair(&self, institution_id: &str) -> Result<String, KeyError> {
        let mut keys = self.keys.lock().unwrap();
        if keys.contains_key(institution_id) {
            return Err(KeyError::AlreadyProvisioned(institution_id.to_string()));
        }
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let public_key = encode_public_key(signing_key.verifying_key());
        keys.insert(institution_id.to_string(), signing_key);
        Ok(public_key)
    }

    /// Whether a keypair exists for the institution.
    pub fn has_keypair(&self, institution_id: &str) -> bool {
        self.keys.lock().unwrap().contains_key(institution_id)
    }

    /// Hex-encoded public key for the institution, if provisioned.
    pub fn public_key(&self, institution_id: &str) -> Option<String> {
        self.keys
            .lock()
            .unwrap()
            .get(institution_id)
            .map(|key| encode_public_key(key.verifying_key()))
    }

    /// Signs `message` on behalf of an institution.
    ///
    /// The message is digested with SHA-256 and the digest is ECDSA-signed.
    ///
    /// # Errors
    /// `KeyError::Missing` when no keypair exists for the institution.
    pub fn sign(&self, institution_id: &str, message: &[u8]) -> Result<String, KeyError> {
        let keys = self.keys.lock().unwrap();
        let signing_key = keys
            .get(institution_id)
            .ok_or_else(|| KeyError::Missing(institution_id.to_string()))?;
        let digest = sha256(message);
        let signature: Signature = signing_key
            .sign_prehash(&digest)
            .map_err(|e| KeyError::Signing(e.to_string()))?;
        Ok(base64::encode(signature.to_vec()))
    }
}

impl Default for KeyCustodian {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks a signature produced by [`KeyCustodian::sign`] against a public
/// key and message.
///
/// Malformed keys or signatures yield `false` rather than an error: for the
/// verification engine an unverifiable signature and an invalid one are the
/// same outcome.
pub fn verify_signature(public_key_hex: &str, message: &[u8], signature_b64: &str) -> bool {
    let Ok(key_bytes) = from_hex(public_key_hex) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&key_bytes) else {
        return false;
    };
    let Ok(signature_bytes) = base64::decode(signature_b64) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&signature_bytes) else {
        return false;
    };
    verifying_key
        .verify_prehash(&sha256(message), &signature)
        .is_ok()
}

fn encode_public_key(key: &VerifyingKey) -> String {
    to_hex(key.to_encoded_point(true).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let custodian = KeyCustodian::new();
        let public_key = custodian.generate_keypair("inst-1").unwrap();

        let message = b"2f77668a9dfbf8d5848b9eeb4a7145ca94c6ed9236e4a773f6dcafa5132b2f91";
        let signature = custodian.sign("inst-1", message).unwrap();
        assert!(verify_signature(&public_key, message, &signature));
    }

    #[test]
    fn signature_fails_for_other_message() {
        let custodian = KeyCustodian::new();
        let public_key = custodian.generate_keypair("inst-1").unwrap();

        let signature = custodian.sign("inst-1", b"original message").unwrap();
        assert!(!verify_signature(&public_key, b"tampered message", &signature));
    }

    #[test]
    fn signature_fails_for_other_key() {
        let custodian = KeyCustodian::new();
        custodian.generate_keypair("inst-1").unwrap();
        let other_public = custodian.generate_keypair("inst-2").unwrap();

        let signature = custodian.sign("inst-1", b"message").unwrap();
        assert!(!verify_signature(&other_public, b"message", &signature));
    }

    #[test]
    fn missing_keypair_is_an_error() {
        let custodian = KeyCustodian::new();
        assert!(matches!(
            custodian.sign("ghost", b"message"),
            Err(KeyError::Missing(id)) if id == "ghost"
        ));
        assert!(custodian.public_key("ghost").is_none());
    }

    #[test]
    fn one_keypair_per_institution() {
        let custodian = KeyCustodian::new();
        let first = custodian.generate_keypair("inst-1").unwrap();
        assert!(matches!(
            custodian.generate_keypair("inst-1"),
            Err(KeyError::AlreadyProvisioned(_))
        ));
        // The original key survives the rejected attempt.
        assert_eq!(custodian.public_key("inst-1").unwrap(), first);
    }

    #[test]
    fn garbage_inputs_verify_false_without_panicking() {
        assert!(!verify_signature("not-hex", b"m", "sig"));
        assert!(!verify_signature("deadbeef", b"m", "sig"));
        let custodian = KeyCustodian::new();
        let public_key = custodian.generate_keypair("inst-1").unwrap();
        assert!(!verify_signature(&public_key, b"m", "not base64 @@@"));
    }
}
