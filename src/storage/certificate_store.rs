// src/storage/certificate_store.rs
//! Certificate persistence.
//!
//! The store is the only cross-request coordination point in the pipeline:
//! the unique index on `certificate_id` rejects duplicate issuance, and the
//! promotion to `Verified` is a compare-and-swap on `signature_status` so
//! that concurrent admin verifications cannot both succeed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::certificate::{
    CertificateRecord, CertificateStatus, SignatureStatus, VerificationMetadata,
};

/// Fields written by the admin verification workflow, applied atomically
/// with the status transition.
#[derive(Debug, Clone)]
pub struct VerifiedUpdate {
    pub content_address: String,
    pub file_hash: String,
    pub digital_signature: String,
    pub verification: VerificationMetadata,
}

/// Document collection keyed by `certificate_id`.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// Inserts a new record. `certificate_id` is a unique index; a duplicate
    /// insert fails with `StoreError::DuplicateId`.
    async fn insert(&self, record: CertificateRecord) -> Result<(), StoreError>;

    async fn find_by_id(&self, certificate_id: &str)
        -> Result<Option<CertificateRecord>, StoreError>;

    /// Finds an active record whose stored file hash matches. Removed
    /// records are excluded so a revoked document can never resolve as a
    /// genuine one under another identifier.
    async fn find_active_by_file_hash(
        &self,
        file_hash: &str,
    ) -> Result<Option<CertificateRecord>, StoreError>;

    /// Transitions `signature_status` from pending to verified and applies
    /// `update` in the same step. The check-and-set is atomic: if the record
    /// is already verified the call fails with `StoreError::AlreadyVerified`
    /// and the stored fields are untouched.
    async fn promote_to_verified(
        &self,
        certificate_id: &str,
        update: VerifiedUpdate,
    ) -> Result<CertificateRecord, StoreError>;

    /// Soft delete: flips `status` to `Removed`. The record stays resolvable
    /// by its public identifier.
    async fn mark_removed(&self, certificate_id: &str) -> Result<(), StoreError>;
}

/// In-memory store backed by a mutexed map. Suitable for tests and
/// single-process deployments; a database-backed implementation must honor
/// the same unique-index and compare-and-swap contracts.
pub struct MemoryCertificateStore {
    records: Mutex<HashMap<String, CertificateRecord>>,
}

impl MemoryCertificateStore {
    pub fn new() -> Self {
        MemoryCertificateStore {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored records, regardless of status.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Test hook: reads a record without going through the trait.
    #[cfg(test)]
    pub(crate) fn get_sync(&self, certificate_id: &str) -> Option<CertificateRecord> {
        self.records.lock().unwrap().get(certificate_id).cloned()
    }

    /// Test hook: mutates a stored record in place, simulating out-of-band
    /// drift between issuance and verification.
    #[cfg(test)]
    pub(crate) fn update_in_place(
        &self,
        certificate_id: &str,
        mutate: impl FnOnce(&mut CertificateRecord),
    ) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(certificate_id) {
            mutate(record);
        }
    }
}

impl Default for MemoryCertificateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CertificateStore for MemoryCertificateStore {
    async fn insert(&self, record: CertificateRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let certificate_id = record.payload.certificate_id.clone();
        if records.contains_key(&certificate_id) {
            return Err(StoreError::DuplicateId(certificate_id));
        }
        records.insert(certificate_id, record);
        Ok(())
    }

    async fn find_by_id(
        &self,
        certificate_id: &str,
    ) -> Result<Option<CertificateRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(certificate_id).cloned())
    }

    async fn find_active_by_file_hash(
        &self,
        file_hash: &str,
    ) -> Result<Option<CertificateRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|record| {
                record.status == CertificateStatus::Active
                    && record.file_hash.as_deref() == Some(file_hash)
            })
            .cloned())
    }

    async fn promote_to_verified(
        &self,
        certificate_id: &str,
        update: VerifiedUpdate,
    ) -> Result<CertificateRecord, StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(certificate_id)
            .ok_or_else(|| StoreError::NotFound(certificate_id.to_string()))?;
        if record.signature_status == SignatureStatus::Verified {
            return Err(StoreError::AlreadyVerified(certificate_id.to_string()));
        }
        record.signature_status = SignatureStatus::Verified;
        record.content_address = Some(update.content_address);
        record.file_hash = Some(update.file_hash);
        record.digital_signature = Some(update.digital_signature);
        record.verification = Some(update.verification);
        Ok(record.clone())
    }

    async fn mark_removed(&self, certificate_id: &str) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(certificate_id)
            .ok_or_else(|| StoreError::NotFound(certificate_id.to_string()))?;
        record.status = CertificateStatus::Removed;
        Ok(())
    }
}
