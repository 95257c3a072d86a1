// src/blockchain/mod.rs

pub mod ledger_client;

pub use ledger_client::{DisabledLedger, LedgerAnchor, LedgerClient};
