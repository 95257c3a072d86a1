// src/lib.rs

//! # CertiChain Core
//!
//! Certificate issuance, signing, and integrity verification for academic
//! institutions.
//!
//! ## Architecture Overview
//! 1. **Keys Layer**: per-institution keypair custody and ECDSA signing
//! 2. **Services Layer**: issuance orchestration, admin verification, and
//!    the public verification engine
//! 3. **Storage Layer**: certificate/request stores and IPFS blob storage
//! 4. **Blockchain Layer**: best-effort ledger anchoring of issued
//!    certificates
//!
//! ## Pipeline
//! Issuance canonicalizes and hashes the certificate payload, signs the
//! hash with the institution's private key, renders and uploads the
//! document, anchors the record to the ledger, and persists the certificate
//! in `PENDING_ADMIN_VERIFICATION`. The admin workflow re-derives the hash,
//! re-signs, replaces the artifact, and promotes the record to `VERIFIED`
//! exactly once. Verification is read-only: it recomputes hashes and checks
//! the signature to report integrity and authenticity separately, and
//! classifies uploaded documents as genuine, mismatched, wrong-identifier,
//! or unrecognized.
//!
//! The HTTP surface, PDF/QR rendering, email delivery, and database engine
//! are collaborator concerns injected through the traits in [`storage`],
//! [`blockchain`], and [`services`].

// Module declarations (organized by functional domain)
pub mod blockchain; // ledger anchoring
pub mod config; // environment-driven settings
pub mod error; // error taxonomy
pub mod keys; // institution keypair custody
pub mod models; // data structures
pub mod services; // issuance, admin verification, public verification
pub mod storage; // certificate/request stores and blob storage
pub mod utils; // digest and identifier helpers
