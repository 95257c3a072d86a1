// src/models/request.rs
//! Student-submitted certificate requests.
//!
//! Requests supply the payload fields ahead of issuance. On approval the
//! request is linked to the issued certificate identifier; the linking step
//! in the issuance pipeline is best-effort and never rolls back an issued
//! certificate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "REJECTED")]
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub request_id: String,
    pub institution_id: String,
    pub student_name: String,
    pub email: String,
    pub course_name: String,
    pub branch: Option<String>,
    pub pass_out_year: u16,
    pub roll_number: String,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
    pub issued_certificate_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl CertificateRequest {
    /// Creates a new pending request. Emails are normalized to lowercase so
    /// status lookups by email behave consistently.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request_id: impl Into<String>,
        institution_id: impl Into<String>,
        student_name: impl Into<String>,
        email: &str,
        course_name: impl Into<String>,
        branch: Option<String>,
        pass_out_year: u16,
        roll_number: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            institution_id: institution_id.into(),
            student_name: student_name.into(),
            email: email.to_lowercase(),
            course_name: course_name.into(),
            branch,
            pass_out_year,
            roll_number: roll_number.into(),
            message: None,
            status: RequestStatus::Pending,
            rejection_reason: None,
            issued_certificate_id: None,
            submitted_at: Utc::now(),
        }
    }
}
