// src/services/renderer.rs
//! Certificate document rendering seam.
//!
//! Rendering stamps the payload, the public verification URL (the QR
//! collaborator encodes it into an image), and a single signature block into
//! a document. The pending and verified stages stamp different blocks, and
//! a document only ever carries one: re-rendering at admin verification
//! replaces the pending block rather than adding a second.

use serde::Serialize;

use crate::error::RenderError;
use crate::models::certificate::{CertificatePayload, VerificationMetadata};

/// Signature and trust metadata stamped into the rendered document.
///
/// `verification` is present only for admin-verified artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureStamp<'a> {
    pub institution_name: &'a str,
    pub digital_signature: Option<&'a str>,
    pub verification: Option<&'a VerificationMetadata>,
}

/// Renders certificate documents. PDF layout and QR imaging live behind
/// this seam.
pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        payload: &CertificatePayload,
        verify_url: &str,
        stamp: &SignatureStamp<'_>,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Renders the certificate as a canonical JSON document.
///
/// Field order is fixed by the struct, so the same payload and stamp always
/// produce the same bytes and therefore the same file hash.
pub struct JsonRenderer;

#[derive(Serialize)]
struct Document<'a> {
    #[serde(flatten)]
    payload: &'a CertificatePayload,
    verify_url: &'a str,
    stamp_status: &'a str,
    stamp: &'a SignatureStamp<'a>,
}

impl DocumentRenderer for JsonRenderer {
    fn render(
        &self,
        payload: &CertificatePayload,
        verify_url: &str,
        stamp: &SignatureStamp<'_>,
    ) -> Result<Vec<u8>, RenderError> {
        let stamp_status = if stamp.verification.is_some() {
            "VERIFIED"
        } else {
            "PENDING_ADMIN_VERIFICATION"
        };
        let document = Document {
            payload,
            verify_url,
            stamp_status,
            stamp,
        };
        serde_json::to_vec_pretty(&document).map_err(|e| RenderError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn payload() -> CertificatePayload {
        CertificatePayload {
            certificate_id: "cmr2510143".to_string(),
            student_name: "Anita Rao".to_string(),
            course_name: "B.Tech".to_string(),
            branch: Some("CSE".to_string()),
            pass_out_year: 2025,
            institution_id: "inst-1".to_string(),
            institution_name: "CMR Institute of Technology".to_string(),
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let stamp = SignatureStamp {
            institution_name: "CMR Institute of Technology",
            digital_signature: Some("c2lnbmF0dXJl"),
            verification: None,
        };
        let first = JsonRenderer
            .render(&payload(), "https://certichain.test/verify/cmr2510143", &stamp)
            .unwrap();
        let second = JsonRenderer
            .render(&payload(), "https://certichain.test/verify/cmr2510143", &stamp)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn exactly_one_stamp_block_per_stage() {
        let url = "https://certichain.test/verify/cmr2510143";

        let pending = SignatureStamp {
            institution_name: "CMR Institute of Technology",
            digital_signature: None,
            verification: None,
        };
        let pending_doc: serde_json::Value =
            serde_json::from_slice(&JsonRenderer.render(&payload(), url, &pending).unwrap())
                .unwrap();
        assert_eq!(pending_doc["stamp_status"], "PENDING_ADMIN_VERIFICATION");
        assert!(pending_doc["stamp"]["verification"].is_null());

        let verification = VerificationMetadata {
            verified_at: Utc::now(),
            verified_by: "registrar@certichain.test".to_string(),
            reason: "transcript audit".to_string(),
            location: "Hyderabad".to_string(),
        };
        let verified = SignatureStamp {
            institution_name: "CMR Institute of Technology",
            digital_signature: Some("c2lnbmF0dXJl"),
            verification: Some(&verification),
        };
        let verified_doc: serde_json::Value =
            serde_json::from_slice(&JsonRenderer.render(&payload(), url, &verified).unwrap())
                .unwrap();
        assert_eq!(verified_doc["stamp_status"], "VERIFIED");
        assert_eq!(
            verified_doc["stamp"]["verification"]["verified_by"],
            "registrar@certichain.test"
        );
        // The document holds a single stamp object, replaced between stages.
        assert!(verified_doc["stamp"].is_object());
    }
}
