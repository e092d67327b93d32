//! Remote checklist source over HTTP

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ChecklistSource, ChecklistTable, DomainError, PipelineKind};

/// Settings for the remote checklist service
#[derive(Debug, Clone)]
pub struct HttpChecklistConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpChecklistConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_millis(2000),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches `GET {base_url}/checklists/{kind}`, answering `{stage: [items]}`
#[derive(Debug)]
pub struct HttpChecklistSource {
    config: HttpChecklistConfig,
    http_client: reqwest::Client,
}

impl HttpChecklistSource {
    pub fn new(config: HttpChecklistConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build checklist HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url_for(&self, kind: PipelineKind) -> String {
        format!(
            "{}/checklists/{}",
            self.config.base_url.trim_end_matches('/'),
            kind
        )
    }
}

#[async_trait]
impl ChecklistSource for HttpChecklistSource {
    async fn fetch(&self, kind: PipelineKind) -> Result<ChecklistTable, DomainError> {
        let url = self.url_for(kind);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("Checklist request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::upstream(format!(
                "Checklist service returned status {}",
                response.status()
            )));
        }

        response
            .json::<ChecklistTable>()
            .await
            .map_err(|e| DomainError::upstream(format!("Invalid checklist payload: {}", e)))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> HttpChecklistSource {
        HttpChecklistSource::new(
            HttpChecklistConfig::new(server.uri()).with_timeout(Duration::from_millis(500)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/checklists/receivables"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recebido": ["Arquivo CNAB conferido", "Lastro anexado"]
            })))
            .mount(&server)
            .await;

        let table = source(&server).fetch(PipelineKind::Receivables).await.unwrap();
        assert_eq!(table.items("recebido").len(), 2);
        assert_eq!(table.items("recebido")[0], "Arquivo CNAB conferido");
    }

    #[tokio::test]
    async fn test_error_status_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = source(&server).fetch(PipelineKind::Allocation).await.unwrap_err();
        assert!(matches!(err, DomainError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"recebido": "nope"})))
            .mount(&server)
            .await;

        let err = source(&server).fetch(PipelineKind::Receivables).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let source =
            HttpChecklistSource::new(HttpChecklistConfig::new("http://checklists.local/")).unwrap();
        assert_eq!(
            source.url_for(PipelineKind::Monitoring),
            "http://checklists.local/checklists/monitoring"
        );
    }
}
