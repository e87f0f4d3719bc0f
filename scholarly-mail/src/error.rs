//! Error types for contact email handling

use scholarly_core::ScholarlyError;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Contact queue is full")]
    QueueFull,

    #[error("Contact queue is closed")]
    QueueClosed,

    #[error("Core error: {0}")]
    Core(Box<ScholarlyError>),
}

impl MailError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        MailError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<ScholarlyError> for MailError {
    fn from(err: ScholarlyError) -> Self {
        MailError::Core(Box::new(err))
    }
}

pub type MailResult<T> = Result<T, MailError>;
