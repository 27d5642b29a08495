// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analyzer adapter backed by the external HTTP analysis service.

pub mod client;

use std::time::Duration;

use async_trait::async_trait;
use convoqa_config::model::AnalyzerConfig;
use convoqa_core::{
    AdapterType, AnalysisRequest, AnalyzerAdapter, ConvoqaError, HealthStatus, PluginAdapter,
    Verdict,
};
use tracing::info;

pub use client::AnalyzerClient;

/// [`AnalyzerAdapter`] that talks to the analysis service over HTTP.
pub struct HttpAnalyzer {
    client: AnalyzerClient,
}

impl HttpAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ConvoqaError> {
        let client = AnalyzerClient::new(
            &config.base_url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?;
        info!(base_url = %client.base_url(), "HTTP analyzer initialized");
        Ok(Self { client })
    }
}

#[async_trait]
impl PluginAdapter for HttpAnalyzer {
    fn name(&self) -> &str {
        "http-analyzer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Analyzer
    }

    async fn health_check(&self) -> Result<HealthStatus, ConvoqaError> {
        Ok(match self.client.ping().await {
            Ok(true) => HealthStatus::Healthy,
            Ok(false) => HealthStatus::Degraded("analyzer health endpoint returned non-2xx".into()),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), ConvoqaError> {
        Ok(())
    }
}

#[async_trait]
impl AnalyzerAdapter for HttpAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Verdict, ConvoqaError> {
        self.client.analyze(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> AnalyzerConfig {
        AnalyzerConfig {
            base_url: base_url.to_string(),
            api_key: None,
            timeout_secs: 5,
            max_retries: 0,
        }
    }

    #[tokio::test]
    async fn health_reflects_service_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let analyzer = HttpAnalyzer::new(&config(&server.uri())).unwrap();
        assert_eq!(analyzer.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(analyzer.adapter_type(), AdapterType::Analyzer);
    }

    #[tokio::test]
    async fn missing_health_endpoint_is_degraded() {
        let server = MockServer::start().await;
        let analyzer = HttpAnalyzer::new(&config(&server.uri())).unwrap();
        assert!(matches!(
            analyzer.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}
