//! Text-generation HTTP client
//!
//! Posts a fixed prompt to a local generate endpoint (non-streaming) and
//! returns the `response` field of the JSON reply.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AdviceError, AdviceSource};
use crate::config::AdviceConfig;

/// Client for the advice endpoint
pub struct AdviceClient {
    client: Client,
    endpoint: String,
    model: String,
    prompt: String,
}

impl AdviceClient {
    pub fn new(config: &AdviceConfig) -> Result<Self, AdviceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AdviceError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            prompt: config.prompt.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request one line of advice
    pub async fn generate(&self) -> Result<String, AdviceError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: &self.prompt,
            stream: false,
        };

        debug!("Sending advice request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Advice endpoint error: {} - {}", status, body);
            return Err(AdviceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        parse_generate_response(&body)
    }
}

impl AdviceSource for AdviceClient {
    fn fetch(&self) -> impl Future<Output = Result<String, AdviceError>> + Send {
        self.generate()
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AdviceError {
    if e.is_timeout() {
        AdviceError::Timeout
    } else {
        AdviceError::Request(e.to_string())
    }
}

/// Extract the generated text from a non-streaming reply
fn parse_generate_response(body: &str) -> Result<String, AdviceError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| AdviceError::Decode(e.to_string()))?;

    let text = parsed.response.ok_or(AdviceError::Empty)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AdviceError::Empty);
    }
    Ok(text.to_string())
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"{"model":"llama3.1","created_at":"2024-08-01T00:00:00Z","response":" Let go of all buttons. ","done":true}"#;
        assert_eq!(parse_generate_response(body).unwrap(), "Let go of all buttons.");
    }

    #[test]
    fn test_parse_missing_field() {
        assert_eq!(parse_generate_response(r#"{"done":true}"#), Err(AdviceError::Empty));
        assert_eq!(parse_generate_response(r#"{"response":"   "}"#), Err(AdviceError::Empty));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_generate_response("<html>502</html>"),
            Err(AdviceError::Decode(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            model: "llama3.1",
            prompt: "be unhelpful",
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.1");
        assert_eq!(json["prompt"], "be unhelpful");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let config = AdviceConfig {
            endpoint: "http://127.0.0.1:9/api/generate".to_string(),
            request_timeout_ms: 2_000,
            ..AdviceConfig::default()
        };
        let client = AdviceClient::new(&config).unwrap();
        let result = tokio_test::block_on(client.generate());
        assert!(matches!(
            result,
            Err(AdviceError::Request(_)) | Err(AdviceError::Timeout)
        ));
    }
}
