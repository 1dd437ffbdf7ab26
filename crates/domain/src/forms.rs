//! Contact form submission following the Netlify forms convention.
//!
//! Netlify identifies the target form by a hidden `form-name` field and drops
//! submissions whose `bot-field` honeypot is filled in. We mirror both so that
//! spam never leaves the client.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use validator::Validate;

/// Default Netlify form name used by the contact page.
pub const CONTACT_FORM_NAME: &str = "contact";

/// Honeypot field name (must stay empty for humans).
pub const HONEYPOT_FIELD: &str = "bot-field";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactSubmission {
    #[validate(length(min = 1, max = 100, message = "Please enter your name"))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(max = 200, message = "Subject is too long"))]
    #[serde(default)]
    pub subject: Option<String>,

    #[validate(length(min = 10, max = 5000, message = "Message must be between 10 and 5000 characters"))]
    pub message: String,

    #[serde(rename = "bot-field", default)]
    pub bot_field: String,
}

impl ContactSubmission {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            subject: None,
            message: message.into(),
            bot_field: String::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// The honeypot was filled in.
    pub fn is_spam(&self) -> bool {
        !self.bot_field.trim().is_empty()
    }

    /// Encode as an `application/x-www-form-urlencoded` body for Netlify.
    pub fn to_netlify_body(&self, form_name: &str) -> String {
        let mut body = form_urlencoded::Serializer::new(String::new());
        body.append_pair("form-name", form_name);
        body.append_pair("name", self.name.trim());
        body.append_pair("email", self.email.trim());
        if let Some(subject) = self.subject.as_deref() {
            body.append_pair("subject", subject.trim());
        }
        body.append_pair("message", self.message.trim());
        body.append_pair(HONEYPOT_FIELD, &self.bot_field);
        body.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ContactSubmission {
        ContactSubmission::new("Ada", "ada@example.com", "I'd love to talk about a rebrand.")
    }

    #[test]
    fn test_valid_submission_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut form = valid();
        form.email = "not-an-email".into();
        let errors = form.validate().expect_err("email must be rejected");
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_short_message_rejected() {
        let mut form = valid();
        form.message = "hi".into();
        let errors = form.validate().expect_err("message too short");
        assert!(errors.field_errors().contains_key("message"));
    }

    #[test]
    fn test_honeypot_detection() {
        let mut form = valid();
        assert!(!form.is_spam());
        form.bot_field = "http://spam.example".into();
        assert!(form.is_spam());
    }

    #[test]
    fn test_netlify_body_encoding() {
        let body = valid().with_subject("Hello & welcome").to_netlify_body(CONTACT_FORM_NAME);
        assert!(body.starts_with("form-name=contact&"));
        assert!(body.contains("email=ada%40example.com"));
        assert!(body.contains("subject=Hello+%26+welcome"));
        assert!(body.ends_with("bot-field="));
    }
}
