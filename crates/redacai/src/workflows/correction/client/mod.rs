pub mod normalizer;

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use tracing::debug;

use super::domain::{EvaluationRequest, EvaluationResult, FailureReason};

/// Outbound boundary to the remote scoring service.
#[async_trait]
pub trait EvaluationGateway: Send + Sync {
    async fn submit(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError>;
}

/// Failures talking to the scoring boundary. Neither variant consumes quota.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("evaluation service unavailable: {0}")]
    Network(String),
    #[error("evaluation response not understood: {0}")]
    Protocol(String),
}

impl EvaluationError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn failure_reason(&self) -> FailureReason {
        match self {
            Self::Network(detail) => FailureReason::Network(detail.clone()),
            Self::Protocol(detail) => FailureReason::Protocol(detail.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScoringPayload<'a> {
    redacao: &'a str,
}

/// JSON-over-HTTP client for the scoring webhook.
#[derive(Debug, Clone)]
pub struct HttpEvaluationClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpEvaluationClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EvaluationGateway for HttpEvaluationClient {
    async fn submit(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        debug!(endpoint = %self.endpoint, chars = request.essay_text().len(), "posting essay");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ScoringPayload {
                redacao: request.essay_text(),
            })
            .send()
            .await
            .map_err(|err| EvaluationError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EvaluationError::Network(format!(
                "evaluation service returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| EvaluationError::Network(err.to_string()))?;

        normalizer::normalize_body(&body)
    }
}
