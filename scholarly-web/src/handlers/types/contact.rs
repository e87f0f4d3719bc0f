//! Contact form types

use scholarly_mail::ContactSubmission;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Contact form submission
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ContactRequest {
    #[serde(default)]
    #[schema(example = "ana@example.org")]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(example = "Research collaboration")]
    pub subject: Option<String>,
    #[serde(default)]
    #[schema(example = "Ana Lima")]
    pub full_name: Option<String>,
}

impl From<ContactRequest> for ContactSubmission {
    fn from(request: ContactRequest) -> Self {
        Self {
            email: request.email,
            subject: request.subject,
            full_name: request.full_name,
        }
    }
}

/// Acknowledgement that the submission was accepted
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    #[schema(example = "Email successfully processed.")]
    pub message: String,
}
