// src/services/notifier.rs
//! Issuance notification seam.
//!
//! Outbound email delivery is an embedding-service concern; the pipeline
//! dispatches best-effort on a detached task and only logs failures.

use async_trait::async_trait;
use log::info;

use crate::error::NotifyError;
use crate::models::certificate::CertificateRecord;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_issued(&self, email: &str, record: &CertificateRecord)
        -> Result<(), NotifyError>;
}

/// Logs the notification instead of dispatching it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_issued(
        &self,
        email: &str,
        record: &CertificateRecord,
    ) -> Result<(), NotifyError> {
        info!(
            "certificate {} issued; notification queued for {} ({})",
            record.payload.certificate_id, email, record.verify_url
        );
        Ok(())
    }
}
