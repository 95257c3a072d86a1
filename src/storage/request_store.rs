// src/storage/request_store.rs
//! Certificate request persistence.
//!
//! Requests feed the issuance pipeline but never gate it: the approve-link
//! step during issuance is best-effort, so this store's failures are logged
//! by callers rather than propagated.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::request::{CertificateRequest, RequestStatus};

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn submit(&self, request: CertificateRequest) -> Result<(), StoreError>;

    async fn find(&self, request_id: &str) -> Result<Option<CertificateRequest>, StoreError>;

    /// Pending requests addressed to an institution, newest first.
    async fn list_pending(
        &self,
        institution_id: &str,
    ) -> Result<Vec<CertificateRequest>, StoreError>;

    /// Marks the request approved and links the issued certificate.
    async fn approve(&self, request_id: &str, certificate_id: &str) -> Result<(), StoreError>;

    async fn reject(&self, request_id: &str, reason: Option<String>) -> Result<(), StoreError>;

    /// Most recent request submitted under an email address, for public
    /// status lookups.
    async fn latest_by_email(&self, email: &str)
        -> Result<Option<CertificateRequest>, StoreError>;
}

/// In-memory request store backed by a mutexed map.
pub struct MemoryRequestStore {
    requests: Mutex<HashMap<String, CertificateRequest>>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        MemoryRequestStore {
            requests: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryRequestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn submit(&self, request: CertificateRequest) -> Result<(), StoreError> {
        let mut requests = self.requests.lock().unwrap();
        if requests.contains_key(&request.request_id) {
            return Err(StoreError::DuplicateId(request.request_id));
        }
        requests.insert(request.request_id.clone(), request);
        Ok(())
    }

    async fn find(&self, request_id: &str) -> Result<Option<CertificateRequest>, StoreError> {
        Ok(self.requests.lock().unwrap().get(request_id).cloned())
    }

    async fn list_pending(
        &self,
        institution_id: &str,
    ) -> Result<Vec<CertificateRequest>, StoreError> {
        let requests = self.requests.lock().unwrap();
        let mut pending: Vec<CertificateRequest> = requests
            .values()
            .filter(|request| {
                request.institution_id == institution_id
                    && request.status == RequestStatus::Pending
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(pending)
    }

    async fn approve(&self, request_id: &str, certificate_id: &str) -> Result<(), StoreError> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(request_id)
            .ok_or_else(|| StoreError::NotFound(request_id.to_string()))?;
        request.status = RequestStatus::Approved;
        request.issued_certificate_id = Some(certificate_id.to_string());
        Ok(())
    }

    async fn reject(&self, request_id: &str, reason: Option<String>) -> Result<(), StoreError> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(request_id)
            .ok_or_else(|| StoreError::NotFound(request_id.to_string()))?;
        request.status = RequestStatus::Rejected;
        request.rejection_reason = reason;
        Ok(())
    }

    async fn latest_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CertificateRequest>, StoreError> {
        let needle = email.to_lowercase();
        let requests = self.requests.lock().unwrap();
        Ok(requests
            .values()
            .filter(|request| request.email == needle)
            .max_by_key(|request| request.submitted_at)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(request_id: &str, email: &str) -> CertificateRequest {
        CertificateRequest::new(
            request_id,
            "inst-1",
            "Anita Rao",
            email,
            "B.Tech",
            Some("CSE".to_string()),
            2025,
            "10143",
        )
    }

    #[test]
    fn approve_links_certificate() {
        tokio_test::block_on(async {
            let store = MemoryRequestStore::new();
            store.submit(request("req-1", "anita@example.edu")).await.unwrap();

            store.approve("req-1", "cmr2510143").await.unwrap();

            let stored = store.find("req-1").await.unwrap().unwrap();
            assert_eq!(stored.status, RequestStatus::Approved);
            assert_eq!(stored.issued_certificate_id.as_deref(), Some("cmr2510143"));
        });
    }

    #[test]
    fn reject_records_reason_and_leaves_pending_list() {
        tokio_test::block_on(async {
            let store = MemoryRequestStore::new();
            store.submit(request("req-1", "anita@example.edu")).await.unwrap();
            store.submit(request("req-2", "ravi@example.edu")).await.unwrap();

            store
                .reject("req-1", Some("duplicate submission".to_string()))
                .await
                .unwrap();

            let pending = store.list_pending("inst-1").await.unwrap();
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].request_id, "req-2");

            let rejected = store.find("req-1").await.unwrap().unwrap();
            assert_eq!(rejected.status, RequestStatus::Rejected);
            assert_eq!(
                rejected.rejection_reason.as_deref(),
                Some("duplicate submission")
            );
        });
    }

    #[test]
    fn email_lookup_is_case_insensitive() {
        tokio_test::block_on(async {
            let store = MemoryRequestStore::new();
            store.submit(request("req-1", "Anita@Example.EDU")).await.unwrap();

            let found = store.latest_by_email("anita@example.edu").await.unwrap();
            assert_eq!(found.unwrap().request_id, "req-1");
        });
    }
}
