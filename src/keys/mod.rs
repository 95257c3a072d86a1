// src/keys/mod.rs

pub mod custodian;

pub use custodian::{verify_signature, KeyCustodian};
