// src/storage/ipfs_client.rs
//! Content-addressed blob storage over IPFS.
//!
//! Rendered certificate artifacts are pinned to an IPFS node and referenced
//! from the record by CID. Everything stored here is public; the artifact
//! carries no secrets by construction (it embeds the signature, which is a
//! public value).

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::BytesMut;
use futures::TryStreamExt;
use ipfs_api_backend_hyper::{IpfsApi, IpfsClient, TryFromUri};
use log::debug;

use crate::error::BlobError;

/// Content-addressed file storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` and returns the content address. `name` is advisory
    /// metadata for the backing store.
    async fn put(&self, bytes: &[u8], name: &str) -> Result<String, BlobError>;

    /// Retrieves the bytes behind a content address.
    async fn get(&self, content_address: &str) -> Result<Vec<u8>, BlobError>;
}

/// IPFS-backed blob store.
#[derive(Clone)]
pub struct IpfsStorage {
    /// Shared IPFS client instance (thread-safe via Arc).
    client: Arc<IpfsClient>,
}

impl IpfsStorage {
    /// Connects to the default local IPFS API (`http://localhost:5001`).
    pub fn new() -> Self {
        IpfsStorage {
            client: Arc::new(IpfsClient::default()),
        }
    }

    /// Connects to a specific IPFS API endpoint.
    pub fn with_api_url(api_url: &str) -> Result<Self, BlobError> {
        let client = IpfsClient::from_str(api_url)
            .map_err(|e| BlobError::InvalidEndpoint(e.to_string()))?;
        Ok(IpfsStorage {
            client: Arc::new(client),
        })
    }
}

impl Default for IpfsStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for IpfsStorage {
    async fn put(&self, bytes: &[u8], name: &str) -> Result<String, BlobError> {
        let reader = Cursor::new(bytes.to_vec());
        let response = self
            .client
            .add(reader)
            .await
            .map_err(|e| BlobError::Unavailable(e.to_string()))?;
        debug!("pinned {} as {}", name, response.hash);
        Ok(response.hash)
    }

    async fn get(&self, content_address: &str) -> Result<Vec<u8>, BlobError> {
        let data = self
            .client
            .cat(content_address)
            .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .map_err(|e| BlobError::Unavailable(e.to_string()))?;
        Ok(data.to_vec())
    }
}
