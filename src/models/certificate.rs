// src/models/certificate.rs
//! Certificate data model and canonical hashing.
//!
//! The payload is the validated set of semantic fields constructed once at
//! the issuance boundary; the record adds integrity, anchoring, and trust
//! state on top of it. Canonicalization lives on the payload so every part
//! of the pipeline (issuance, admin re-verification, public verification)
//! derives the data hash the same way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::crypto::sha256_hex;

/// Two-stage trust state distinguishing institution-issued-but-unreviewed
/// from admin-reviewed-and-signed certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureStatus {
    #[serde(rename = "PENDING_ADMIN_VERIFICATION")]
    PendingAdminVerification,
    #[serde(rename = "VERIFIED")]
    Verified,
}

/// Lifecycle state of the record itself. Removed records keep their public
/// identifier and fail all verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "REMOVED")]
    Removed,
}

/// Semantic fields of a certificate, validated at the issuance boundary and
/// passed by value through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificatePayload {
    /// Globally unique identifier, derived from the institution short code,
    /// the two-digit pass-out year, and the roll number.
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub branch: Option<String>,
    pub pass_out_year: u16,
    pub institution_id: String,
    pub institution_name: String,
}

impl CertificatePayload {
    /// Byte-stable serialization of the fields covered by the data hash.
    ///
    /// Fields are joined with `|` in a fixed order. A missing `branch`
    /// normalizes to the empty string rather than being omitted, so the
    /// delimiter positions are stable for every payload.
    pub fn canonical_string(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.certificate_id,
            self.student_name,
            self.course_name,
            self.branch.as_deref().unwrap_or(""),
            self.pass_out_year
        )
    }

    /// SHA-256 of the canonical serialization, lowercase hex.
    ///
    /// Identical payloads always produce identical digests, across process
    /// restarts and across implementations of the canonical form.
    pub fn data_hash(&self) -> String {
        sha256_hex(self.canonical_string().as_bytes())
    }
}

/// Metadata recorded when an administrator verifies a certificate. Only
/// meaningful once the record is `Verified`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMetadata {
    pub verified_at: DateTime<Utc>,
    pub verified_by: String,
    pub reason: String,
    pub location: String,
}

/// A persisted certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    #[serde(flatten)]
    pub payload: CertificatePayload,
    pub issued_at: DateTime<Utc>,
    /// Public verification URL embedded (as a QR target) in the rendered
    /// document.
    pub verify_url: String,
    /// Hash of the canonical payload at issuance time. The signing target
    /// and tamper-detection anchor.
    pub data_hash: String,
    /// Hash of the rendered document bytes. Absent when rendering failed.
    pub file_hash: Option<String>,
    /// Base64 compact ECDSA signature over the data hash. Absent when the
    /// institution had no keypair at issuance time.
    pub digital_signature: Option<String>,
    /// Content address of the uploaded artifact. Absent when the upload
    /// failed.
    pub content_address: Option<String>,
    /// Anchoring transaction handle. Absent when anchoring failed; presence
    /// does not imply finality.
    pub ledger_reference: Option<String>,
    pub signature_status: SignatureStatus,
    pub status: CertificateStatus,
    pub verification: Option<VerificationMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CertificatePayload {
        CertificatePayload {
            certificate_id: "cmr2510143".to_string(),
            student_name: "Anita Rao".to_string(),
            course_name: "B.Tech".to_string(),
            branch: Some("CSE".to_string()),
            pass_out_year: 2025,
            institution_id: "inst-1".to_string(),
            institution_name: "CMR Institute of Technology".to_string(),
        }
    }

    #[test]
    fn canonical_string_has_fixed_field_order() {
        assert_eq!(
            payload().canonical_string(),
            "cmr2510143|Anita Rao|B.Tech|CSE|2025"
        );
    }

    #[test]
    fn missing_branch_keeps_delimiter_position() {
        let mut p = payload();
        p.branch = None;
        assert_eq!(p.canonical_string(), "cmr2510143|Anita Rao|B.Tech||2025");
    }

    #[test]
    fn data_hash_is_deterministic() {
        assert_eq!(payload().data_hash(), payload().data_hash());
    }

    #[test]
    fn any_field_change_moves_the_hash() {
        let base = payload().data_hash();

        let mut p = payload();
        p.student_name = "Anita Rau".to_string();
        assert_ne!(p.data_hash(), base);

        let mut p = payload();
        p.course_name = "M.Tech".to_string();
        assert_ne!(p.data_hash(), base);

        let mut p = payload();
        p.branch = None;
        assert_ne!(p.data_hash(), base);

        let mut p = payload();
        p.pass_out_year = 2026;
        assert_ne!(p.data_hash(), base);
    }

    #[test]
    fn institution_fields_do_not_affect_the_hash() {
        let base = payload().data_hash();
        let mut p = payload();
        p.institution_name = "Renamed Institute".to_string();
        assert_eq!(p.data_hash(), base);
    }

    #[test]
    fn states_serialize_to_wire_strings() {
        assert_eq!(
            serde_json::to_string(&SignatureStatus::PendingAdminVerification).unwrap(),
            "\"PENDING_ADMIN_VERIFICATION\""
        );
        assert_eq!(
            serde_json::to_string(&CertificateStatus::Removed).unwrap(),
            "\"REMOVED\""
        );
    }
}
