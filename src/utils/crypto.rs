// src/utils/crypto.rs
//! Digest utilities shared by the hashing, signing, and file-check paths.
//!
//! Every digest in the pipeline is SHA-256: the canonical data hash, the
//! rendered-document file hash, and the prehash fed to the signer. Hashes
//! cross process and service boundaries as lowercase hex strings, so the
//! helpers here produce hex directly.

use ethers_core::utils::hex;
use ring::digest::{digest, SHA256};

/// Computes the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest(&SHA256, data).as_ref());
    out
}

/// Computes the SHA-256 digest of `data` as a lowercase hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Encodes bytes as lowercase hex.
pub fn to_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(data)
}

/// Decodes a hex string (with or without leading `0x`).
pub fn from_hex(data: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(data.trim_start_matches("0x"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let first = sha256_hex(b"cmr2510143|Anita Rao|B.Tech|CSE|2025");
        let second = sha256_hex(b"cmr2510143|Anita Rao|B.Tech|CSE|2025");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn digest_matches_known_vector() {
        // SHA-256 of the empty string.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hex_round_trip() {
        let bytes = sha256(b"round trip");
        let encoded = to_hex(bytes);
        assert_eq!(from_hex(&encoded).unwrap(), bytes.to_vec());
        assert_eq!(from_hex(&format!("0x{}", encoded)).unwrap(), bytes.to_vec());
    }
}
