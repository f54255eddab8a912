use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::EvaluationGateway;
use super::controller::{ControllerError, EvaluationController};
use super::domain::{EvaluationResult, EvaluationState};
use super::quota::{QuotaSnapshot, QuotaStore};
use super::session::SessionProvider;

/// Where the presentation layer sends users who must sign in first.
pub const SIGN_IN_PATH: &str = "/auth";

/// Body accepted by the correction endpoint. `redacao` mirrors the boundary's field name.
#[derive(Debug, Deserialize)]
pub struct CorrectionRequest {
    #[serde(alias = "redacao")]
    pub essay: String,
}

#[derive(Debug, Serialize)]
pub struct CorrectionResponse {
    pub result: EvaluationResult,
    pub score_progress: f32,
    pub quota: QuotaView,
}

#[derive(Debug, Serialize)]
pub struct QuotaView {
    #[serde(flatten)]
    pub snapshot: QuotaSnapshot,
    pub badge: String,
}

impl From<QuotaSnapshot> for QuotaView {
    fn from(snapshot: QuotaSnapshot) -> Self {
        Self {
            badge: snapshot.badge_label(),
            snapshot,
        }
    }
}

impl ControllerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ControllerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ControllerError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            ControllerError::InFlight => StatusCode::CONFLICT,
            ControllerError::Evaluation(_) => StatusCode::BAD_GATEWAY,
            ControllerError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ControllerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        let mut payload = json!({
            "error": self.to_string(),
            "notice": self.notice(),
        });

        match &self {
            ControllerError::QuotaExceeded(limit) => {
                payload["limit_reached"] = json!(limit);
            }
            ControllerError::AuthenticationRequired => {
                payload["redirect"] = json!(SIGN_IN_PATH);
            }
            _ => {}
        }

        (self.status_code(), axum::Json(payload)).into_response()
    }
}

/// Router builder exposing the correction and quota endpoints.
pub fn correction_router<S, E, P>(controller: Arc<EvaluationController<S, E, P>>) -> Router
where
    S: QuotaStore + 'static,
    E: EvaluationGateway + 'static,
    P: SessionProvider + 'static,
{
    Router::new()
        .route("/api/v1/corrections", post(submit_handler::<S, E, P>))
        .route("/api/v1/corrections/state", get(state_handler::<S, E, P>))
        .route("/api/v1/quota", get(quota_handler::<S, E, P>))
        .route("/api/v1/quota/bonus", post(bonus_handler::<S, E, P>))
        .with_state(controller)
}

pub(crate) async fn submit_handler<S, E, P>(
    State(controller): State<Arc<EvaluationController<S, E, P>>>,
    axum::Json(request): axum::Json<CorrectionRequest>,
) -> Response
where
    S: QuotaStore + 'static,
    E: EvaluationGateway + 'static,
    P: SessionProvider + 'static,
{
    match controller.submit(&request.essay).await {
        Ok(result) => {
            let body = CorrectionResponse {
                score_progress: result.score_progress(),
                result,
                quota: controller.quota().into(),
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn state_handler<S, E, P>(
    State(controller): State<Arc<EvaluationController<S, E, P>>>,
) -> axum::Json<EvaluationState>
where
    S: QuotaStore + 'static,
    E: EvaluationGateway + 'static,
    P: SessionProvider + 'static,
{
    axum::Json(controller.state())
}

pub(crate) async fn quota_handler<S, E, P>(
    State(controller): State<Arc<EvaluationController<S, E, P>>>,
) -> axum::Json<QuotaView>
where
    S: QuotaStore + 'static,
    E: EvaluationGateway + 'static,
    P: SessionProvider + 'static,
{
    axum::Json(controller.quota().into())
}

pub(crate) async fn bonus_handler<S, E, P>(
    State(controller): State<Arc<EvaluationController<S, E, P>>>,
) -> Response
where
    S: QuotaStore + 'static,
    E: EvaluationGateway + 'static,
    P: SessionProvider + 'static,
{
    match controller.grant_bonus() {
        Ok(snapshot) => (StatusCode::OK, axum::Json(QuotaView::from(snapshot))).into_response(),
        Err(err) => err.into_response(),
    }
}
