//! Netlify forms client

use anyhow::{Context, Result};
use async_trait::async_trait;
use folio_ports::outbound::FormSubmissionPort;
use folio_ports::SubmissionError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

/// Posts url-encoded submissions to a Netlify-style forms endpoint.
#[derive(Debug, Clone)]
pub struct NetlifyFormClient {
    client: Client,
    endpoint: Url,
}

impl NetlifyFormClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid form endpoint '{endpoint}'"))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl FormSubmissionPort for NetlifyFormClient {
    async fn post_form(&self, body: String) -> Result<(), SubmissionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), endpoint = %self.endpoint, "Form posted");
        if status.is_success() {
            Ok(())
        } else {
            Err(SubmissionError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_must_be_a_url() {
        assert!(NetlifyFormClient::new("not a url").is_err());
        let client = NetlifyFormClient::new("https://studio.example/").expect("client");
        assert_eq!(client.endpoint().host_str(), Some("studio.example"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_network_error() {
        let client = NetlifyFormClient::new("http://127.0.0.1:9/").expect("client");
        let err = client
            .post_form("form-name=contact".into())
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(err, SubmissionError::Network(_)));
    }
}
