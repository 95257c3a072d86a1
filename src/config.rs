// src/config.rs
//! Environment-driven settings.
//!
//! The embedding service loads settings at startup and constructs the
//! pipeline's collaborators from them. Variables use the `CERTICHAIN_`
//! prefix with `__` as the section separator, e.g.
//! `CERTICHAIN_LEDGER__RPC_URL`. The ledger section is optional: without it
//! anchoring runs disabled and issuance proceeds with no ledger reference.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    pub rpc_url: String,
    pub private_key: String,
    pub contract_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpfsSettings {
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base of the public verification URL embedded in rendered documents.
    pub verify_base_url: String,
    pub ipfs: IpfsSettings,
    pub ledger: Option<LedgerSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("verify_base_url", "http://localhost:5173")?
            .set_default("ipfs.api_url", "http://localhost:5001")?
            .add_source(Environment::with_prefix("CERTICHAIN").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_environment() {
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.ipfs.api_url, "http://localhost:5001");
        assert!(settings.ledger.is_none());
    }
}
