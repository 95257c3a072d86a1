// src/error.rs
//! Error taxonomy for the issuance and verification pipeline.
//!
//! The split follows the pipeline's failure semantics: validation rejects
//! input before any hashing, key and store errors are fatal to the operation
//! that hit them, and external-service errors (blob store, ledger) are
//! tolerated during issuance but fatal during admin re-verification.
//! Integrity mismatches are never errors; they surface as booleans or
//! classifications from the verification engine.

use thiserror::Error;

/// Input rejected before any hashing or signing takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required payload field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The pass-out year is outside the plausible range.
    #[error("pass-out year {0} is out of range")]
    InvalidYear(u16),
}

/// Keypair custody failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// No keypair has been provisioned for the institution. Issuance
    /// degrades to unsigned; admin re-verification treats this as fatal.
    #[error("no keypair provisioned for institution {0}")]
    Missing(String),

    /// The institution already holds its one active keypair.
    #[error("institution {0} already has an active keypair")]
    AlreadyProvisioned(String),

    /// The signing primitive itself failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Failures from the certificate / request data store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Unique-identifier conflict on insert. Fatal at the persistence layer.
    #[error("certificate {0} already exists")]
    DuplicateId(String),

    #[error("record {0} not found")]
    NotFound(String),

    /// Compare-and-swap on the signature status observed a record that is
    /// already verified.
    #[error("certificate {0} is already verified")]
    AlreadyVerified(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Blob store (content-addressed file storage) failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    #[error("invalid blob store endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

/// Ledger anchoring failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger already holds an anchor under this identifier. Logged and
    /// swallowed by the issuance pipeline; the local record stays
    /// authoritative.
    #[error("certificate {0} already anchored")]
    DuplicateId(String),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Document rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("failed to render certificate document: {0}")]
    Failed(String),
}

/// Notification dispatch failures. Always best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("notification dispatch failed: {0}")]
    Failed(String),
}

/// Fatal outcomes of a single issuance.
///
/// External-service failures do not appear here: a certificate can be issued
/// with no signature, no artifact, and no anchor, and those gaps are recorded
/// as `None` fields on the persisted record.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The local store already holds this certificate identifier.
    #[error("certificate {0} already exists")]
    DuplicateId(String),

    #[error("storage failure: {0}")]
    Store(StoreError),
}

/// Fatal outcomes of the admin verification workflow.
#[derive(Debug, Error)]
pub enum AdminVerifyError {
    #[error("certificate {0} not found")]
    NotFound(String),

    #[error("certificate {0} has been removed")]
    Removed(String),

    /// Idempotency guard: the record is already verified, either observed
    /// up front or lost to a concurrent verification at the CAS.
    #[error("certificate {0} is already verified")]
    AlreadyVerified(String),

    /// Re-verification must re-sign, so a missing keypair is fatal here.
    #[error("cannot re-sign: {0}")]
    Key(#[from] KeyError),

    #[error("failed to render verified artifact: {0}")]
    Render(#[from] RenderError),

    /// The record must not become verified while pointing at a stale
    /// artifact, so the re-upload is fatal when it fails.
    #[error("failed to upload verified artifact: {0}")]
    Upload(#[from] BlobError),

    #[error("storage failure: {0}")]
    Store(StoreError),
}

/// Fatal outcomes of the read-only verification entry points.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("certificate {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
