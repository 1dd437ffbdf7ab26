//! Contact form submission
//!
//! Validates a submission, then posts it to the forms endpoint using the
//! Netlify encoding. A successful post raises the success overlay flag in
//! `ui`. Honeypot hits are never posted but look exactly like a success to
//! the sender.

use std::sync::Arc;

use folio_domain::{ContactSubmission, CONTACT_FORM_NAME};
use folio_ports::outbound::FormSubmissionPort;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::application::error::FormError;
use crate::application::state::AppState;

pub struct ContactFormService {
    client: Arc<dyn FormSubmissionPort>,
    state: Arc<AppState>,
    form_name: String,
}

impl ContactFormService {
    pub fn new(client: Arc<dyn FormSubmissionPort>, state: Arc<AppState>) -> Self {
        Self {
            client,
            state,
            form_name: CONTACT_FORM_NAME.to_string(),
        }
    }

    pub fn with_form_name(mut self, name: impl Into<String>) -> Self {
        self.form_name = name.into();
        self
    }

    /// Validate without submitting.
    pub fn validate(&self, submission: &ContactSubmission) -> Result<(), FormError> {
        submission
            .validate()
            .map_err(|e| FormError::Invalid(describe(&e)))
    }

    pub async fn submit(&self, submission: &ContactSubmission) -> Result<(), FormError> {
        if submission.is_spam() {
            tracing::info!(form = %self.form_name, "Honeypot filled; dropping submission");
            self.show_success();
            return Ok(());
        }
        self.validate(submission)?;

        let body = submission.to_netlify_body(&self.form_name);
        self.client.post_form(body).await?;

        tracing::info!(form = %self.form_name, "Contact form submitted");
        self.show_success();
        Ok(())
    }

    fn show_success(&self) {
        if let Err(e) = self.state.set("ui.form_success_visible", Value::Bool(true)) {
            tracing::warn!(error = %e, "Failed to raise form success flag");
        }
    }
}

/// Flatten field errors into "field: message" pairs, sorted by field.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{field}: {message}")
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
