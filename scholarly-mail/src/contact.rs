//! Contact form submissions and the jobs they produce

use crate::error::{MailError, MailResult};
use chrono::{DateTime, Utc};
use lettre::Address;
use scholarly_core::EmailSettings;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw contact form fields as submitted by a visitor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub email: Option<String>,
    pub subject: Option<String>,
    pub full_name: Option<String>,
}

/// Links embedded in the acknowledgement email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLinks {
    pub website_url: String,
    pub logo_url: String,
}

impl From<&EmailSettings> for SiteLinks {
    fn from(settings: &EmailSettings) -> Self {
        Self {
            website_url: settings.frontend_url.clone(),
            logo_url: settings.logo_url.clone(),
        }
    }
}

/// Values rendered into the acknowledgement template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactContext {
    pub recipient_name: String,
    pub website_url: String,
    pub logo_url: String,
}

/// A queued acknowledgement email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEmailJob {
    pub id: Uuid,
    pub to_email: String,
    pub subject: String,
    pub context: ContactContext,
    pub submitted_at: DateTime<Utc>,
}

fn required<'a>(field: &'static str, label: &str, value: &'a Option<String>) -> MailResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MailError::validation(field, format!("{} is required.", label))),
    }
}

impl ContactEmailJob {
    /// Validate a submission and build the job for it.
    ///
    /// All three fields must be present and non-blank, and `email` must be a
    /// well-formed address.
    pub fn from_submission(submission: &ContactSubmission, links: &SiteLinks) -> MailResult<Self> {
        let email = required("email", "Email", &submission.email)?;
        let subject = required("subject", "Subject", &submission.subject)?;
        let full_name = required("full_name", "Full name", &submission.full_name)?;

        email
            .parse::<Address>()
            .map_err(|_| MailError::validation("email", "Enter a valid email address."))?;

        if subject.contains(['\r', '\n']) {
            return Err(MailError::validation(
                "subject",
                "Subject must be a single line.",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            to_email: email.to_string(),
            subject: subject.to_string(),
            context: ContactContext {
                recipient_name: full_name.to_string(),
                website_url: links.website_url.clone(),
                logo_url: links.logo_url.clone(),
            },
            submitted_at: Utc::now(),
        })
    }
}
