// src/services/issuer.rs
//! Certificate issuance orchestration.
//!
//! The issuer coordinates hashing, signing, rendering, blob upload, ledger
//! anchoring, and record creation into one certificate entity. Issuance is
//! resilient to partial external failures: a missing signing key, a failed
//! render or upload, and a failed anchor each degrade the record (the
//! corresponding field stays empty) without aborting the operation. Only
//! invalid input and a duplicate identifier at the local store are fatal.
//!
//! Every certificate is created in `PENDING_ADMIN_VERIFICATION`; promotion
//! to `VERIFIED` belongs to the admin workflow.

use std::sync::Arc;

use chrono::Utc;
use log::{error, warn};
use serde::Serialize;

use crate::blockchain::LedgerAnchor;
use crate::error::{IssueError, KeyError, LedgerError, StoreError, ValidationError};
use crate::keys::KeyCustodian;
use crate::models::certificate::{
    CertificatePayload, CertificateRecord, CertificateStatus, SignatureStatus,
};
use crate::models::institution::Institution;
use crate::services::notifier::Notifier;
use crate::services::renderer::{DocumentRenderer, SignatureStamp};
use crate::storage::{BlobStore, CertificateStore, RequestStore};
use crate::utils::cert_id::generate_certificate_id;
use crate::utils::crypto::sha256_hex;

/// Input accepted from the issuing institution for one certificate.
#[derive(Debug, Clone)]
pub struct IssueInput {
    pub student_name: String,
    pub course_name: String,
    pub branch: Option<String>,
    pub pass_out_year: u16,
    pub roll_number: String,
    /// Student email for the best-effort issuance notification.
    pub email: Option<String>,
    /// Pending certificate request fulfilled by this issuance, if any.
    pub request_id: Option<String>,
}

/// Per-item results of a bulk issuance. One item's failure never aborts its
/// siblings.
#[derive(Debug, Serialize)]
pub struct BulkReport {
    pub total: usize,
    pub issued: Vec<BulkIssued>,
    pub failures: Vec<BulkFailure>,
}

#[derive(Debug, Serialize)]
pub struct BulkIssued {
    pub student_name: String,
    pub certificate_id: String,
}

#[derive(Debug, Serialize)]
pub struct BulkFailure {
    pub student_name: String,
    pub error: String,
}

/// Issuance orchestrator over the injected collaborators.
pub struct CertificateIssuer {
    custodian: Arc<KeyCustodian>,
    store: Arc<dyn CertificateStore>,
    requests: Arc<dyn RequestStore>,
    blob_store: Arc<dyn BlobStore>,
    ledger: Arc<dyn LedgerAnchor>,
    renderer: Arc<dyn DocumentRenderer>,
    notifier: Arc<dyn Notifier>,
    verify_base_url: String,
}

impl CertificateIssuer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        custodian: Arc<KeyCustodian>,
        store: Arc<dyn CertificateStore>,
        requests: Arc<dyn RequestStore>,
        blob_store: Arc<dyn BlobStore>,
        ledger: Arc<dyn LedgerAnchor>,
        renderer: Arc<dyn DocumentRenderer>,
        notifier: Arc<dyn Notifier>,
        verify_base_url: impl Into<String>,
    ) -> Self {
        Self {
            custodian,
            store,
            requests,
            blob_store,
            ledger,
            renderer,
            notifier,
            verify_base_url: verify_base_url.into(),
        }
    }

    /// Issues a single certificate.
    ///
    /// # Errors
    /// `IssueError::Validation` for rejected input and
    /// `IssueError::DuplicateId` when the identifier already exists in the
    /// store. External-service failures are logged and leave the matching
    /// record fields empty.
    pub async fn issue(
        &self,
        institution: &Institution,
        input: IssueInput,
    ) -> Result<CertificateRecord, IssueError> {
        validate_input(&input)?;
        let certificate_id = generate_certificate_id(
            &institution.short_code,
            input.pass_out_year,
            &input.roll_number,
        )?;

        let payload = CertificatePayload {
            certificate_id: certificate_id.clone(),
            student_name: input.student_name.trim().to_string(),
            course_name: input.course_name.trim().to_string(),
            branch: input.branch.clone(),
            pass_out_year: input.pass_out_year,
            institution_id: institution.id.clone(),
            institution_name: institution.name.clone(),
        };
        let data_hash = payload.data_hash();

        let digital_signature = match self.custodian.sign(&institution.id, data_hash.as_bytes()) {
            Ok(signature) => Some(signature),
            Err(KeyError::Missing(_)) => {
                warn!(
                    "no signing key for institution {}; issuing {} unsigned",
                    institution.id, certificate_id
                );
                None
            }
            Err(err) => {
                warn!("signing failed for {}: {}", certificate_id, err);
                None
            }
        };

        let verify_url = format!(
            "{}/verify/{}",
            self.verify_base_url.trim_end_matches('/'),
            certificate_id
        );

        let stamp = SignatureStamp {
            institution_name: &institution.name,
            digital_signature: digital_signature.as_deref(),
            verification: None,
        };
        let artifact = match self.renderer.render(&payload, &verify_url, &stamp) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!("document render failed for {}: {}", certificate_id, err);
                None
            }
        };
        let file_hash = artifact.as_deref().map(sha256_hex);

        let content_address = match artifact.as_deref() {
            Some(bytes) => {
                let name = format!("{certificate_id}.json");
                match self.blob_store.put(bytes, &name).await {
                    Ok(address) => Some(address),
                    Err(err) => {
                        warn!("blob upload failed for {}: {}", certificate_id, err);
                        None
                    }
                }
            }
            None => None,
        };

        let issued_at = Utc::now();
        let ledger_reference = match self
            .ledger
            .anchor(&payload, issued_at, content_address.as_deref())
            .await
        {
            Ok(reference) => Some(reference),
            Err(LedgerError::DuplicateId(id)) => {
                // The local store is the identifier authority; a ledger
                // collision is an audit-trail gap, not a failed issuance.
                warn!("ledger already holds an anchor under {}", id);
                None
            }
            Err(err) => {
                error!("ledger anchor failed for {}: {}", certificate_id, err);
                None
            }
        };

        let record = CertificateRecord {
            payload,
            issued_at,
            verify_url,
            data_hash,
            file_hash,
            digital_signature,
            content_address,
            ledger_reference,
            signature_status: SignatureStatus::PendingAdminVerification,
            status: CertificateStatus::Active,
            verification: None,
        };

        match self.store.insert(record.clone()).await {
            Ok(()) => {}
            Err(StoreError::DuplicateId(id)) => return Err(IssueError::DuplicateId(id)),
            Err(err) => return Err(IssueError::Store(err)),
        }

        if let Some(request_id) = input.request_id.as_deref() {
            if let Err(err) = self.requests.approve(request_id, &certificate_id).await {
                warn!(
                    "could not link request {} to {}: {}",
                    request_id, certificate_id, err
                );
            }
        }

        if let Some(email) = input.email {
            let notifier = self.notifier.clone();
            let notify_record = record.clone();
            tokio::spawn(async move {
                if let Err(err) = notifier.notify_issued(&email, &notify_record).await {
                    warn!(
                        "notification for {} failed: {}",
                        notify_record.payload.certificate_id, err
                    );
                }
            });
        }

        Ok(record)
    }

    /// Issues a batch of certificates, isolating failures per item.
    pub async fn issue_bulk(
        &self,
        institution: &Institution,
        inputs: Vec<IssueInput>,
    ) -> BulkReport {
        let total = inputs.len();
        let mut issued = Vec::new();
        let mut failures = Vec::new();

        for input in inputs {
            let student_name = input.student_name.clone();
            match self.issue(institution, input).await {
                Ok(record) => issued.push(BulkIssued {
                    student_name,
                    certificate_id: record.payload.certificate_id,
                }),
                Err(err) => {
                    error!("bulk issuance failed for {}: {}", student_name, err);
                    failures.push(BulkFailure {
                        student_name,
                        error: err.to_string(),
                    });
                }
            }
        }

        BulkReport {
            total,
            issued,
            failures,
        }
    }

    /// Soft-deletes a certificate owned by the institution. The record keeps
    /// its public identifier and fails all verification from here on.
    pub async fn remove(
        &self,
        institution_id: &str,
        certificate_id: &str,
    ) -> Result<(), IssueError> {
        let record = self
            .store
            .find_by_id(certificate_id)
            .await
            .map_err(IssueError::Store)?
            .filter(|record| record.payload.institution_id == institution_id)
            .ok_or_else(|| IssueError::Store(StoreError::NotFound(certificate_id.to_string())))?;

        self.store
            .mark_removed(&record.payload.certificate_id)
            .await
            .map_err(IssueError::Store)
    }
}

fn validate_input(input: &IssueInput) -> Result<(), ValidationError> {
    if input.student_name.trim().is_empty() {
        return Err(ValidationError::MissingField("student_name"));
    }
    if input.course_name.trim().is_empty() {
        return Err(ValidationError::MissingField("course_name"));
    }
    if input.roll_number.trim().is_empty() {
        return Err(ValidationError::MissingField("roll_number"));
    }
    if !(1950..=2100).contains(&input.pass_out_year) {
        return Err(ValidationError::InvalidYear(input.pass_out_year));
    }
    Ok(())
}
