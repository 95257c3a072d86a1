// src/services/testing.rs
//! Shared in-memory fakes and a wired pipeline fixture for service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::blockchain::LedgerAnchor;
use crate::error::{BlobError, LedgerError};
use crate::keys::KeyCustodian;
use crate::models::certificate::{CertificatePayload, CertificateRecord};
use crate::models::institution::Institution;
use crate::services::admin::AdminVerifier;
use crate::services::issuer::{CertificateIssuer, IssueInput};
use crate::services::notifier::LogNotifier;
use crate::services::renderer::JsonRenderer;
use crate::services::verifier::Verifier;
use crate::storage::{BlobStore, MemoryCertificateStore, MemoryRequestStore};
use crate::utils::crypto::sha256_hex;

/// Content-addressed in-memory blob store. The failing variant reports the
/// store as unavailable on every call.
pub(crate) struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail: bool,
}

impl MemoryBlobStore {
    pub(crate) fn new() -> Self {
        MemoryBlobStore {
            blobs: Mutex::new(HashMap::new()),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        MemoryBlobStore {
            blobs: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    pub(crate) fn get_sync(&self, content_address: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(content_address).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bytes: &[u8], _name: &str) -> Result<String, BlobError> {
        if self.fail {
            return Err(BlobError::Unavailable("blob store offline".to_string()));
        }
        let address = format!("Qm{}", &sha256_hex(bytes)[..20]);
        self.blobs
            .lock()
            .unwrap()
            .insert(address.clone(), bytes.to_vec());
        Ok(address)
    }

    async fn get(&self, content_address: &str) -> Result<Vec<u8>, BlobError> {
        self.get_sync(content_address)
            .ok_or_else(|| BlobError::Unavailable(format!("unknown address {content_address}")))
    }
}

#[derive(Clone, Copy)]
pub(crate) enum LedgerBehavior {
    Anchor,
    Duplicate,
    Unavailable,
}

/// Ledger fake with a scripted outcome per fixture.
pub(crate) struct ScriptedLedger {
    behavior: LedgerBehavior,
    counter: AtomicU64,
}

impl ScriptedLedger {
    pub(crate) fn new(behavior: LedgerBehavior) -> Self {
        ScriptedLedger {
            behavior,
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl LedgerAnchor for ScriptedLedger {
    async fn anchor(
        &self,
        payload: &CertificatePayload,
        _issued_at: DateTime<Utc>,
        _content_address: Option<&str>,
    ) -> Result<String, LedgerError> {
        match self.behavior {
            LedgerBehavior::Anchor => {
                let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("0x{n:064x}"))
            }
            LedgerBehavior::Duplicate => {
                Err(LedgerError::DuplicateId(payload.certificate_id.clone()))
            }
            LedgerBehavior::Unavailable => {
                Err(LedgerError::Unavailable("ledger offline".to_string()))
            }
        }
    }
}

/// A fully wired pipeline over in-memory collaborators.
pub(crate) struct Fixture {
    pub(crate) institution: Institution,
    pub(crate) custodian: Arc<KeyCustodian>,
    pub(crate) store: Arc<MemoryCertificateStore>,
    pub(crate) requests: Arc<MemoryRequestStore>,
    pub(crate) blob_store: Arc<MemoryBlobStore>,
    pub(crate) issuer: CertificateIssuer,
    pub(crate) admin: AdminVerifier,
    pub(crate) verifier: Verifier,
}

impl Fixture {
    /// Issuance input for the fixture institution's standard course.
    pub(crate) fn input(&self, student_name: &str, roll_number: &str) -> IssueInput {
        IssueInput {
            student_name: student_name.to_string(),
            course_name: "B.Tech".to_string(),
            branch: Some("CSE".to_string()),
            pass_out_year: 2025,
            roll_number: roll_number.to_string(),
            email: None,
            request_id: None,
        }
    }

    /// Mutates a stored record in place, bypassing the pipeline.
    pub(crate) fn tamper(
        &self,
        certificate_id: &str,
        mutate: impl FnOnce(&mut CertificateRecord),
    ) {
        self.store.update_in_place(certificate_id, mutate);
    }

    /// Fetches the stored artifact bytes for a certificate.
    pub(crate) fn blob_document(&self, certificate_id: &str) -> Vec<u8> {
        let record = self
            .store
            .get_sync(certificate_id)
            .expect("certificate not stored");
        let address = record.content_address.expect("no artifact uploaded");
        self.blob_store
            .get_sync(&address)
            .expect("artifact missing from blob store")
    }
}

pub(crate) fn fixture() -> Fixture {
    fixture_with(LedgerBehavior::Anchor, false)
}

pub(crate) fn fixture_with(ledger: LedgerBehavior, blob_fails: bool) -> Fixture {
    let custodian = Arc::new(KeyCustodian::new());
    let store = Arc::new(MemoryCertificateStore::new());
    let requests = Arc::new(MemoryRequestStore::new());
    let blob_store = Arc::new(if blob_fails {
        MemoryBlobStore::failing()
    } else {
        MemoryBlobStore::new()
    });
    let renderer = Arc::new(JsonRenderer);

    let issuer = CertificateIssuer::new(
        custodian.clone(),
        store.clone(),
        requests.clone(),
        blob_store.clone(),
        Arc::new(ScriptedLedger::new(ledger)),
        renderer.clone(),
        Arc::new(LogNotifier),
        "https://certichain.test",
    );
    let admin = AdminVerifier::new(
        custodian.clone(),
        store.clone(),
        blob_store.clone(),
        renderer,
    );
    let verifier = Verifier::new(store.clone(), custodian.clone());

    Fixture {
        institution: Institution::new("inst-1", "CMR Institute of Technology", "CMR"),
        custodian,
        store,
        requests,
        blob_store,
        issuer,
        admin,
        verifier,
    }
}
