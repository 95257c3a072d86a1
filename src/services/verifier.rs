// src/services/verifier.rs
//! Public verification engine.
//!
//! Both entry points are read-only and independently recompute what they
//! check: record verification re-derives the data hash from the stored
//! payload and validates the signature against the institution's public
//! key; file verification hashes the uploaded bytes and classifies them
//! against the stored file hashes. Neither path ever mutates signing state.

use std::sync::Arc;

use serde::Serialize;

use crate::error::VerifyError;
use crate::keys::{verify_signature, KeyCustodian};
use crate::models::certificate::{CertificateRecord, CertificateStatus};
use crate::storage::CertificateStore;
use crate::utils::crypto::sha256_hex;

/// Outcome of record-level verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecordVerification {
    /// The record was removed by its institution. Terminal: no integrity or
    /// signature checks are run.
    Revoked,
    Active(RecordReport),
}

/// Integrity and signature checks, reported separately. A stored hash that
/// no longer matches the payload is an integrity failure regardless of what
/// the signature says, and the reverse holds too.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    pub integrity_verified: bool,
    pub signature_verified: bool,
    pub record: CertificateRecord,
}

/// Outcome of file-level verification, in classification precedence order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum FileVerification {
    /// The identifier resolves to a removed certificate. Terminal.
    #[serde(rename = "REVOKED")]
    Revoked,
    /// The uploaded document matches the record stored under the supplied
    /// identifier.
    #[serde(rename = "GENUINE")]
    Genuine { record: CertificateRecord },
    /// The identifier exists but the uploaded document does not match it:
    /// a tampered or wrong document presented under a real identifier.
    #[serde(rename = "MISMATCH")]
    Mismatch,
    /// The identifier is unknown but the document matches another active
    /// certificate: genuine content under a mistyped identifier.
    #[serde(rename = "WRONG_ID")]
    WrongId { matched_certificate_id: String },
    /// Neither the identifier nor the content is recognized.
    #[serde(rename = "INVALID")]
    Invalid,
}

/// Read-only verification over the certificate store and the public half of
/// the key directory.
pub struct Verifier {
    store: Arc<dyn CertificateStore>,
    custodian: Arc<KeyCustodian>,
}

impl Verifier {
    pub fn new(store: Arc<dyn CertificateStore>, custodian: Arc<KeyCustodian>) -> Self {
        Self { store, custodian }
    }

    /// Verifies the record stored under `certificate_id`.
    ///
    /// # Errors
    /// `VerifyError::NotFound` when no record exists under the identifier.
    pub async fn verify_record(
        &self,
        certificate_id: &str,
    ) -> Result<RecordVerification, VerifyError> {
        let record = self
            .store
            .find_by_id(certificate_id)
            .await?
            .ok_or_else(|| VerifyError::NotFound(certificate_id.to_string()))?;

        if record.status == CertificateStatus::Removed {
            return Ok(RecordVerification::Revoked);
        }

        let integrity_verified = record.payload.data_hash() == record.data_hash;

        // The signature covers the stored hash; a drifted payload therefore
        // fails the integrity check without masking the signature check.
        let public_key = self.custodian.public_key(&record.payload.institution_id);
        let signature_verified = match (record.digital_signature.as_deref(), public_key) {
            (Some(signature), Some(key)) => {
                verify_signature(&key, record.data_hash.as_bytes(), signature)
            }
            // Missing signature or key is an unverified record, not an error.
            _ => false,
        };

        Ok(RecordVerification::Active(RecordReport {
            integrity_verified,
            signature_verified,
            record,
        }))
    }

    /// Classifies an uploaded document against the supplied identifier.
    ///
    /// The identifier lookup always runs first; the content-hash scan is
    /// consulted only for unknown identifiers, so a tampered file that
    /// happens to match another genuine document still reports `Mismatch`.
    pub async fn verify_file(
        &self,
        certificate_id: &str,
        document: &[u8],
    ) -> Result<FileVerification, VerifyError> {
        let uploaded_hash = sha256_hex(document);

        if let Some(record) = self.store.find_by_id(certificate_id).await? {
            if record.status == CertificateStatus::Removed {
                return Ok(FileVerification::Revoked);
            }
            if record.file_hash.as_deref() == Some(uploaded_hash.as_str()) {
                return Ok(FileVerification::Genuine { record });
            }
            return Ok(FileVerification::Mismatch);
        }

        if let Some(record) = self.store.find_active_by_file_hash(&uploaded_hash).await? {
            return Ok(FileVerification::WrongId {
                matched_certificate_id: record.payload.certificate_id,
            });
        }

        Ok(FileVerification::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::fixture;

    #[tokio::test]
    async fn reports_integrity_and_signature_separately() {
        let f = fixture();
        f.custodian.generate_keypair(&f.institution.id).unwrap();
        f.issuer
            .issue(&f.institution, f.input("Anita Rao", "10143"))
            .await
            .unwrap();

        match f.verifier.verify_record("cmr2510143").await.unwrap() {
            RecordVerification::Active(report) => {
                assert!(report.integrity_verified);
                assert!(report.signature_verified);
            }
            other => panic!("expected active report, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_identifier_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.verifier.verify_record("zzz000").await,
            Err(VerifyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn tampering_with_a_stored_field_breaks_integrity() {
        let f = fixture();
        f.custodian.generate_keypair(&f.institution.id).unwrap();
        f.issuer
            .issue(&f.institution, f.input("Anita Rao", "10143"))
            .await
            .unwrap();

        // Simulate out-of-band mutation of a stored payload field.
        f.tamper("cmr2510143", |record| {
            record.payload.student_name = "Anita Rau".to_string();
        });

        match f.verifier.verify_record("cmr2510143").await.unwrap() {
            RecordVerification::Active(report) => {
                assert!(!report.integrity_verified);
                // The signature still covers the stored hash.
                assert!(report.signature_verified);
            }
            other => panic!("expected active report, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsigned_record_reports_signature_unverified() {
        let f = fixture();
        // No keypair: issuance degraded to unsigned.
        f.issuer
            .issue(&f.institution, f.input("Anita Rao", "10143"))
            .await
            .unwrap();

        match f.verifier.verify_record("cmr2510143").await.unwrap() {
            RecordVerification::Active(report) => {
                assert!(report.integrity_verified);
                assert!(!report.signature_verified);
            }
            other => panic!("expected active report, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn removed_records_are_terminally_revoked() {
        let f = fixture();
        f.custodian.generate_keypair(&f.institution.id).unwrap();
        f.issuer
            .issue(&f.institution, f.input("Anita Rao", "10143"))
            .await
            .unwrap();
        let document = f.blob_document("cmr2510143");
        f.issuer.remove(&f.institution.id, "cmr2510143").await.unwrap();

        // Hash and signature would validate; revocation wins regardless.
        assert_eq!(
            f.verifier.verify_record("cmr2510143").await.unwrap(),
            RecordVerification::Revoked
        );
        assert_eq!(
            f.verifier.verify_file("cmr2510143", &document).await.unwrap(),
            FileVerification::Revoked
        );
    }

    #[tokio::test]
    async fn file_classification_follows_precedence() {
        let f = fixture();
        f.custodian.generate_keypair(&f.institution.id).unwrap();

        // Certificate A: cmr2510143. Certificate B: xyz2510099.
        f.issuer
            .issue(&f.institution, f.input("Anita Rao", "10143"))
            .await
            .unwrap();
        let mut other = f.institution.clone();
        other.id = "inst-2".to_string();
        other.name = "XYZ College of Engineering".to_string();
        other.short_code = "XYZ".to_string();
        f.custodian.generate_keypair(&other.id).unwrap();
        f.issuer
            .issue(&other, f.input("Ravi Kumar", "10099"))
            .await
            .unwrap();

        let doc_a = f.blob_document("cmr2510143");

        // Right document under the right identifier.
        assert!(matches!(
            f.verifier.verify_file("cmr2510143", &doc_a).await.unwrap(),
            FileVerification::Genuine { .. }
        ));

        // A's document under B's (real) identifier: tampering verdict, even
        // though the content matches some other genuine certificate.
        assert_eq!(
            f.verifier.verify_file("xyz2510099", &doc_a).await.unwrap(),
            FileVerification::Mismatch
        );

        // A's document under an unknown identifier: recognized content.
        assert_eq!(
            f.verifier.verify_file("zzz000", &doc_a).await.unwrap(),
            FileVerification::WrongId {
                matched_certificate_id: "cmr2510143".to_string()
            }
        );

        // Unrecognized content under an unknown identifier.
        assert_eq!(
            f.verifier
                .verify_file("zzz000", b"random bytes that hash to nothing known")
                .await
                .unwrap(),
            FileVerification::Invalid
        );
    }
}
