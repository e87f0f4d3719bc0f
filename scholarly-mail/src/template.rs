//! Acknowledgement email rendering using Askama

use crate::contact::ContactContext;
use crate::error::MailResult;
use askama::Template;

/// Contact acknowledgement sent to the visitor
#[derive(Template)]
#[template(path = "emails/contact-us-response.html")]
pub struct ContactUsResponseTemplate<'a> {
    pub recipient_name: &'a str,
    pub website_url: &'a str,
    pub logo_url: &'a str,
}

impl<'a> From<&'a ContactContext> for ContactUsResponseTemplate<'a> {
    fn from(context: &'a ContactContext) -> Self {
        Self {
            recipient_name: &context.recipient_name,
            website_url: &context.website_url,
            logo_url: &context.logo_url,
        }
    }
}

pub fn render_contact_response(context: &ContactContext) -> MailResult<String> {
    Ok(ContactUsResponseTemplate::from(context).render()?)
}
