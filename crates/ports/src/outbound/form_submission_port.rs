//! Form Submission Port - url-encoded POST to the forms endpoint

use async_trait::async_trait;

use crate::error::SubmissionError;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FormSubmissionPort: Send + Sync {
    /// POST an `application/x-www-form-urlencoded` body.
    async fn post_form(&self, body: String) -> Result<(), SubmissionError>;
}
