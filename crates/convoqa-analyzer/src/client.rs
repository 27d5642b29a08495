// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the analyzer service.
//!
//! [`AnalyzerClient`] posts transcript deltas to `{base_url}/analyze`,
//! retries transient statuses, and parses the structured verdict.

use std::time::Duration;

use convoqa_core::{AnalysisRequest, ConvoqaError, Verdict};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

/// Pause before retrying a transient failure.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Error envelope the analyzer uses for non-2xx responses (`{"detail": ...}`).
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    detail: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct AnalyzerClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl AnalyzerClient {
    /// Creates a client for the analyzer at `base_url`.
    ///
    /// `api_key`, when set, is sent as a bearer token on every request.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, ConvoqaError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    ConvoqaError::Config(format!("invalid analyzer API key header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ConvoqaError::Analyzer {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            retry_delay: RETRY_DELAY,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shortens the retry pause (tests).
    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sends one delta for analysis.
    ///
    /// Transport failures, non-2xx statuses (after retrying 429/500/502/503),
    /// and bodies that do not parse as a [`Verdict`] all return `Err`.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Verdict, ConvoqaError> {
        let url = format!("{}/analyze", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying analyzer request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| ConvoqaError::Analyzer {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "analyzer response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| ConvoqaError::Analyzer {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str::<Verdict>(&body).map_err(|e| {
                    ConvoqaError::Analyzer {
                        message: format!("malformed verdict: {e}"),
                        source: Some(Box::new(e)),
                    }
                });
            }

            let body = response.text().await.unwrap_or_default();
            let error_msg = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("analyzer returned {status}: {}", api_err.detail),
                Err(_) => format!("analyzer returned {status}: {body}"),
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(ConvoqaError::analyzer(error_msg));
                continue;
            }

            return Err(ConvoqaError::analyzer(error_msg));
        }

        Err(last_error
            .unwrap_or_else(|| ConvoqaError::analyzer("analyzer request failed after retries")))
    }

    /// `GET {base_url}/health`; `Ok(true)` on any 2xx.
    pub async fn ping(&self) -> Result<bool, ConvoqaError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ConvoqaError::Analyzer {
                message: format!("health request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(response.status().is_success())
    }
}

/// Statuses worth one more attempt.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoqa_core::TagRef;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str, api_key: Option<&str>) -> AnalyzerClient {
        AnalyzerClient::new(base_url, api_key, Duration::from_secs(5), 1)
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    fn test_request() -> AnalysisRequest {
        AnalysisRequest {
            transcript_delta: "[2026-01-01T10:00:00Z] Linh: is the 3pm slot free?".into(),
            previous_summary: String::new(),
            available_tags: vec![TagRef {
                id: "7".into(),
                name: "Booking".into(),
            }],
        }
    }

    fn verdict_body() -> serde_json::Value {
        serde_json::json!({
            "sentiment_label": "Positive",
            "risk_level": "low",
            "rep_quality": "Good",
            "user_intent": "Booking",
            "audit_evidence": [{"category": "intent", "quote": "is the 3pm slot free?"}],
            "new_summary": "S1"
        })
    }

    #[tokio::test]
    async fn analyze_success_sends_wire_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_partial_json(serde_json::json!({
                "previous_summary": "",
                "available_tags": [{"id": "7", "name": "Booking"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body()))
            .expect(1)
            .mount(&server)
            .await;

        let verdict = test_client(&server.uri(), None)
            .analyze(&test_request())
            .await
            .unwrap();
        assert_eq!(verdict.sentiment_label, "Positive");
        assert_eq!(verdict.new_summary, "S1");
        assert_eq!(verdict.audit_evidence.len(), 1);
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body()))
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        assert!(test_client(&base, None).analyze(&test_request()).await.is_ok());
    }

    #[tokio::test]
    async fn bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(header("authorization", "Bearer k-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body()))
            .mount(&server)
            .await;

        let result = test_client(&server.uri(), Some("k-123"))
            .analyze(&test_request())
            .await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn retries_once_on_503_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(verdict_body()))
            .mount(&server)
            .await;

        let verdict = test_client(&server.uri(), None)
            .analyze(&test_request())
            .await
            .unwrap();
        assert_eq!(verdict.user_intent, "Booking");
    }

    #[tokio::test]
    async fn exhausted_retries_return_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"detail": "LLM down"})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let err = test_client(&server.uri(), None)
            .analyze(&test_request())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("LLM down"), "got: {err}");
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(422))
            .expect(1)
            .mount(&server)
            .await;

        assert!(test_client(&server.uri(), None)
            .analyze(&test_request())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn malformed_verdict_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"sentiment_label": "Positive"})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server.uri(), None)
            .analyze(&test_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed verdict"));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        // Port 9 (discard) on localhost is almost never listening.
        let client = test_client("http://127.0.0.1:9", None);
        assert!(client.analyze(&test_request()).await.is_err());
    }
}
