// src/services/admin.rs
//! Admin verification workflow.
//!
//! Promotes a certificate from `PENDING_ADMIN_VERIFICATION` to `VERIFIED`,
//! one way and exactly once. The workflow recomputes the data hash from the
//! record's current fields and re-signs it, making that signature the
//! record's signature of truth; it then re-renders and re-uploads the
//! artifact with the verified stamp. Unlike issuance, the external steps
//! here are fatal on failure: a record must not become verified while
//! pointing at a stale or missing artifact. The ledger anchor from issuance
//! time is left untouched so the chain holds a single record per
//! certificate.

use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::error::{AdminVerifyError, StoreError};
use crate::keys::KeyCustodian;
use crate::models::certificate::{
    CertificateRecord, CertificateStatus, SignatureStatus, VerificationMetadata,
};
use crate::services::renderer::{DocumentRenderer, SignatureStamp};
use crate::storage::{BlobStore, CertificateStore, VerifiedUpdate};
use crate::utils::crypto::sha256_hex;

/// Reviewer identity and context recorded on the verified record.
#[derive(Debug, Clone)]
pub struct AdminReview {
    pub verified_by: String,
    pub reason: String,
    pub location: String,
}

pub struct AdminVerifier {
    custodian: Arc<KeyCustodian>,
    store: Arc<dyn CertificateStore>,
    blob_store: Arc<dyn BlobStore>,
    renderer: Arc<dyn DocumentRenderer>,
}

impl AdminVerifier {
    pub fn new(
        custodian: Arc<KeyCustodian>,
        store: Arc<dyn CertificateStore>,
        blob_store: Arc<dyn BlobStore>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            custodian,
            store,
            blob_store,
            renderer,
        }
    }

    /// Runs the verification workflow for one certificate.
    ///
    /// # Errors
    /// - `NotFound` / `Removed` when the record cannot be verified at all
    /// - `AlreadyVerified` on re-invocation (idempotency guard), including
    ///   when a concurrent verification wins the compare-and-swap
    /// - `Key` when the institution has no signing key (re-verification
    ///   requires signing)
    /// - `Render` / `Upload` when the verified artifact cannot be produced
    ///   or stored; the record stays pending in that case
    pub async fn verify(
        &self,
        certificate_id: &str,
        review: AdminReview,
    ) -> Result<CertificateRecord, AdminVerifyError> {
        let record = self
            .store
            .find_by_id(certificate_id)
            .await
            .map_err(AdminVerifyError::Store)?
            .ok_or_else(|| AdminVerifyError::NotFound(certificate_id.to_string()))?;

        if record.status == CertificateStatus::Removed {
            return Err(AdminVerifyError::Removed(certificate_id.to_string()));
        }
        if record.signature_status == SignatureStatus::Verified {
            return Err(AdminVerifyError::AlreadyVerified(certificate_id.to_string()));
        }

        // Recompute from current fields rather than trusting the hash stored
        // at issuance time. If the payload drifted, the stored hash stays as
        // is and verification surfaces the mismatch.
        let data_hash = record.payload.data_hash();
        let digital_signature = self
            .custodian
            .sign(&record.payload.institution_id, data_hash.as_bytes())?;

        let verification = VerificationMetadata {
            verified_at: Utc::now(),
            verified_by: review.verified_by,
            reason: review.reason,
            location: review.location,
        };

        let stamp = SignatureStamp {
            institution_name: &record.payload.institution_name,
            digital_signature: Some(&digital_signature),
            verification: Some(&verification),
        };
        let artifact = self
            .renderer
            .render(&record.payload, &record.verify_url, &stamp)?;
        let file_hash = sha256_hex(&artifact);

        let name = format!("{certificate_id}-verified.json");
        let content_address = self.blob_store.put(&artifact, &name).await?;

        let update = VerifiedUpdate {
            content_address,
            file_hash,
            digital_signature,
            verification,
        };
        let updated = match self.store.promote_to_verified(certificate_id, update).await {
            Ok(updated) => updated,
            Err(StoreError::AlreadyVerified(id)) => {
                return Err(AdminVerifyError::AlreadyVerified(id))
            }
            Err(StoreError::NotFound(id)) => return Err(AdminVerifyError::NotFound(id)),
            Err(err) => return Err(AdminVerifyError::Store(err)),
        };

        info!(
            "certificate {} verified by {}",
            certificate_id,
            updated
                .verification
                .as_ref()
                .map(|v| v.verified_by.as_str())
                .unwrap_or("unknown")
        );
        Ok(updated)
    }
}
