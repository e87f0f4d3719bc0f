//! Contact form handler

use super::types::{ContactRequest, ContactResponse, ErrorResponse};
use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use scholarly_mail::{ContactEmailJob, ContactSubmission};
use tracing::info;

pub const CONTACT_ACCEPTED: &str = "Email successfully processed.";

/// Queue an acknowledgement email for a contact form submission
#[utoipa::path(
    post,
    path = "/api/contact-us-email/",
    tag = "Contact",
    summary = "Submit the contact form",
    description = "Validate the submission and queue an acknowledgement email to the sender",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Submission accepted", body = ContactResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 503, description = "Too many pending messages", body = ErrorResponse)
    )
)]
pub async fn contact_us_email(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ApiResult<Json<ContactResponse>> {
    let Json(request) = payload?;

    let submission = ContactSubmission::from(request);
    let job = ContactEmailJob::from_submission(&submission, &state.site_links)?;
    let job_id = job.id;

    state.contact_queue.submit(job)?;
    info!(job_id = %job_id, "Contact email accepted");

    Ok(Json(ContactResponse {
        message: CONTACT_ACCEPTED.to_string(),
    }))
}
