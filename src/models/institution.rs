// src/models/institution.rs
//! Issuing institution identity.
//!
//! Onboarding (registration, approval, profile review) happens outside the
//! pipeline; issuance receives an already-verified institution. The keypair
//! itself lives in the key custodian and only the public half is ever
//! mirrored here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
    /// Short code used as the certificate identifier prefix, e.g. "cmr".
    pub short_code: String,
    /// Hex-encoded public key, present once a keypair has been provisioned.
    pub public_key: Option<String>,
}

impl Institution {
    pub fn new(id: impl Into<String>, name: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_code: short_code.into(),
            public_key: None,
        }
    }
}
