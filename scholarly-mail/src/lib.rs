//! Scholarly Mail - contact form acknowledgements
//!
//! Validates contact submissions, renders the acknowledgement email and
//! delivers it from a bounded background queue.

pub mod contact;
pub mod error;
pub mod mailer;
pub mod queue;
pub mod template;

pub use contact::{ContactContext, ContactEmailJob, ContactSubmission, SiteLinks};
pub use error::{MailError, MailResult};
pub use mailer::{Mailer, OutgoingEmail, SmtpMailer};
pub use queue::{ContactQueue, EmailQueue, QueueSettings, QueueSnapshot};
pub use template::render_contact_response;
