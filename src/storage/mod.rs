// src/storage/mod.rs

pub mod certificate_store;
pub mod ipfs_client;
pub mod request_store;

pub use certificate_store::{CertificateStore, MemoryCertificateStore, VerifiedUpdate};
pub use ipfs_client::{BlobStore, IpfsStorage};
pub use request_store::{MemoryRequestStore, RequestStore};
