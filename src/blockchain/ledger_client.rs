// src/blockchain/ledger_client.rs
//! Ledger anchoring client.
//!
//! Anchoring writes the certificate's public fields and content address to
//! an EVM contract as a best-effort, append-only audit trail. The write is
//! optimistic: `anchor` returns as soon as the transaction is accepted by
//! the node, and confirmation is watched on a detached task whose outcome
//! is only logged. Callers must not read finality into a returned
//! transaction handle.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers_contract::Contract;
use ethers_core::abi::Abi;
use ethers_core::types::{Address, H256, U256};
use log::{info, warn};

use crate::error::LedgerError;
use crate::models::certificate::CertificatePayload;

/// Polling cadence for the detached confirmation watcher.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(6);
const CONFIRM_POLL_ATTEMPTS: u32 = 20;

/// External anchoring service.
#[async_trait]
pub trait LedgerAnchor: Send + Sync {
    /// Submits an anchoring transaction and returns its handle without
    /// awaiting confirmation.
    async fn anchor(
        &self,
        payload: &CertificatePayload,
        issued_at: DateTime<Utc>,
        content_address: Option<&str>,
    ) -> Result<String, LedgerError>;
}

type LedgerMiddleware = SignerMiddleware<Provider<Http>, LocalWallet>;

/// EVM-backed anchoring client: JSON-RPC provider, local signing wallet,
/// and the certificate registry contract.
pub struct LedgerClient {
    client: Arc<LedgerMiddleware>,
    contract: Contract<LedgerMiddleware>,
}

impl LedgerClient {
    /// Connects to the chain and binds the registry contract.
    ///
    /// # Arguments
    /// * `rpc_url` - JSON-RPC endpoint of the chain node
    /// * `private_key` - Hex-encoded wallet key funding the anchor writes
    /// * `contract_address` - Deployed registry contract address
    ///
    /// # Errors
    /// Returns `LedgerError::Unavailable` if the endpoint, key, or address
    /// cannot be used.
    pub async fn new(
        rpc_url: &str,
        private_key: &str,
        contract_address: &str,
    ) -> Result<Self, LedgerError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?
            .as_u64();
        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?
            .with_chain_id(chain_id);
        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        let abi = Abi::load(include_bytes!("abi/CertiChain.json").as_ref())
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        let address = Address::from_str(contract_address)
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        let contract = Contract::new(address, abi, client.clone());

        Ok(Self { client, contract })
    }
}

#[async_trait]
impl LedgerAnchor for LedgerClient {
    async fn anchor(
        &self,
        payload: &CertificatePayload,
        issued_at: DateTime<Utc>,
        content_address: Option<&str>,
    ) -> Result<String, LedgerError> {
        let params = (
            payload.certificate_id.clone(),
            payload.student_name.clone(),
            payload.institution_name.clone(),
            payload.course_name.clone(),
            payload.branch.clone().unwrap_or_default(),
            U256::from(payload.pass_out_year),
            U256::from(issued_at.timestamp().max(0) as u64),
            content_address.unwrap_or_default().to_string(),
        );

        let call = self
            .contract
            .method::<_, ()>("issueCertificate", params)
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        let pending = call
            .send()
            .await
            .map_err(|e| classify_send_error(&payload.certificate_id, &e.to_string()))?;
        let tx_hash: H256 = *pending;

        info!(
            "anchor tx sent for {}: {:#x} (optimistic, not awaiting confirmation)",
            payload.certificate_id, tx_hash
        );

        // Confirmation is observed out of band; the caller is not blocked.
        let client = self.client.clone();
        tokio::spawn(async move {
            watch_confirmation(client, tx_hash).await;
        });

        Ok(format!("{tx_hash:#x}"))
    }
}

/// Maps a node rejection to the taxonomy. Registry contracts revert on a
/// duplicate identifier, which callers swallow; everything else is an
/// availability failure.
fn classify_send_error(certificate_id: &str, message: &str) -> LedgerError {
    if message.contains("already exists") || message.contains("execution reverted") {
        LedgerError::DuplicateId(certificate_id.to_string())
    } else {
        LedgerError::Unavailable(message.to_string())
    }
}

async fn watch_confirmation(client: Arc<LedgerMiddleware>, tx_hash: H256) {
    for _ in 0..CONFIRM_POLL_ATTEMPTS {
        tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        match client.get_transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => {
                info!(
                    "anchor tx {:#x} mined in block {:?}",
                    tx_hash, receipt.block_number
                );
                return;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("anchor tx {:#x} receipt lookup failed: {}", tx_hash, e);
                return;
            }
        }
    }
    warn!(
        "anchor tx {:#x} still unconfirmed after {} polls",
        tx_hash, CONFIRM_POLL_ATTEMPTS
    );
}

/// Stand-in used when anchoring is not configured. Every anchor attempt
/// reports unavailability, which the issuance pipeline logs and tolerates.
pub struct DisabledLedger;

#[async_trait]
impl LedgerAnchor for DisabledLedger {
    async fn anchor(
        &self,
        _payload: &CertificatePayload,
        _issued_at: DateTime<Utc>,
        _content_address: Option<&str>,
    ) -> Result<String, LedgerError> {
        Err(LedgerError::Unavailable(
            "ledger anchoring is not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revert_messages_classify_as_duplicates() {
        assert_eq!(
            classify_send_error("cmr2510143", "execution reverted: Certificate already exists"),
            LedgerError::DuplicateId("cmr2510143".to_string())
        );
        assert!(matches!(
            classify_send_error("cmr2510143", "connection refused"),
            LedgerError::Unavailable(_)
        ));
    }

    #[test]
    fn registry_abi_parses() {
        let abi = Abi::load(include_bytes!("abi/CertiChain.json").as_ref()).unwrap();
        assert!(abi.function("issueCertificate").is_ok());
    }
}
