//! HTTP routes for casebookd.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::types::{
    AuditCaseData, CaseData, MentorFeedback, PlayerPrompt, RectificationOption, VerdictData,
};
use crate::{CaseGateway, CaseRequestOptions, CasebookError};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn CaseGateway>,
    /// Upper bound on a single request, retries included.
    pub request_timeout: Duration,
    /// Serve `/debug/*`.
    pub debug_endpoints: bool,
}

impl AppState {
    pub fn new(gateway: Arc<dyn CaseGateway>) -> Self {
        Self {
            gateway,
            request_timeout: Duration::from_secs(120),
            debug_endpoints: false,
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn debug_endpoints(mut self, enabled: bool) -> Self {
        self.debug_endpoints = enabled;
        self
    }
}

/// Handler error, rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    /// Generation failed.
    Gateway(CasebookError),
    /// The request exceeded `request_timeout`.
    Timeout(Duration),
}

impl From<CasebookError> for ApiError {
    fn from(err: CasebookError) -> Self {
        ApiError::Gateway(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Gateway(err) => {
                error!(error = %err, "request failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::Timeout(after) => {
                warn!(timeout_secs = after.as_secs(), "request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    format!("generation timed out after {}s", after.as_secs()),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn bounded<T>(
    state: &AppState,
    fut: impl Future<Output = crate::Result<T>>,
) -> Result<T, ApiError> {
    tokio::time::timeout(state.request_timeout, fut)
        .await
        .map_err(|_| ApiError::Timeout(state.request_timeout))?
        .map_err(ApiError::from)
}

/// Build the router. `/debug/*` is only mounted when enabled.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api/case", post(create_case))
        .route("/api/audit-case", post(create_audit_case))
        .route("/api/options", post(create_options))
        .route("/api/mentor", post(mentor))
        .route("/api/evaluate", post(evaluate));

    if state.debug_endpoints {
        router = router
            .route("/debug/case", get(debug_case))
            .route("/debug/audit-case", get(debug_audit_case));
    }

    router.with_state(state)
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseBody {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub force_new: bool,
}

impl CaseBody {
    fn options(&self) -> CaseRequestOptions {
        CaseRequestOptions {
            force_new: self.force_new,
        }
    }
}

/// POST /api/case
async fn create_case(
    State(state): State<AppState>,
    Json(body): Json<CaseBody>,
) -> Result<Json<CaseData>, ApiError> {
    let case = bounded(
        &state,
        state
            .gateway
            .generate_case(body.session_id.as_deref(), body.options()),
    )
    .await?;
    Ok(Json(case))
}

/// POST /api/audit-case
async fn create_audit_case(
    State(state): State<AppState>,
    Json(body): Json<CaseBody>,
) -> Result<Json<AuditCaseData>, ApiError> {
    let case = bounded(
        &state,
        state
            .gateway
            .generate_audit_case(body.session_id.as_deref(), body.options()),
    )
    .await?;
    Ok(Json(case))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsBody {
    pub case_data: CaseData,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// POST /api/options
async fn create_options(
    State(state): State<AppState>,
    Json(body): Json<OptionsBody>,
) -> Result<Json<Vec<RectificationOption>>, ApiError> {
    let options = bounded(
        &state,
        state
            .gateway
            .generate_rectification_options(&body.case_data, body.session_id.as_deref()),
    )
    .await?;
    Ok(Json(options))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorBody {
    pub prompt_text: String,
}

/// POST /api/mentor
async fn mentor(
    State(state): State<AppState>,
    Json(body): Json<MentorBody>,
) -> Result<Json<MentorFeedback>, ApiError> {
    let feedback = bounded(&state, state.gateway.mentor_feedback(&body.prompt_text)).await?;
    Ok(Json(feedback))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateBody {
    pub case_data: CaseData,
    pub player_prompt: PlayerPrompt,
}

/// POST /api/evaluate
async fn evaluate(
    State(state): State<AppState>,
    Json(body): Json<EvaluateBody>,
) -> Result<Json<VerdictData>, ApiError> {
    let verdict = bounded(
        &state,
        state
            .gateway
            .evaluate_rectification(&body.case_data, &body.player_prompt),
    )
    .await?;
    Ok(Json(verdict))
}

/// Query for the debug routes. Flags are on when set to `1`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugQuery {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub force: Option<String>,
    #[serde(default)]
    pub options: Option<String>,
}

fn flag(value: Option<&str>) -> bool {
    value == Some("1")
}

impl DebugQuery {
    fn request_options(&self) -> CaseRequestOptions {
        CaseRequestOptions {
            force_new: flag(self.force.as_deref()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CaseWithOptions {
    case_data: CaseData,
    rectification_options: Vec<RectificationOption>,
}

/// GET /debug/case?sessionId=&force=1&options=1
///
/// One `request_timeout` covers the case and, when requested, its options.
async fn debug_case(
    State(state): State<AppState>,
    Query(query): Query<DebugQuery>,
) -> Result<Json<Value>, ApiError> {
    let gateway = &state.gateway;
    let session_id = query.session_id.as_deref();

    let body = bounded(&state, async {
        let case_data = gateway
            .generate_case(session_id, query.request_options())
            .await?;
        if !flag(query.options.as_deref()) {
            return Ok::<_, CasebookError>(json!(case_data));
        }

        let rectification_options = gateway
            .generate_rectification_options(&case_data, session_id)
            .await?;
        Ok::<_, CasebookError>(json!(CaseWithOptions {
            case_data,
            rectification_options,
        }))
    })
    .await?;
    Ok(Json(body))
}

/// GET /debug/audit-case?sessionId=&force=1
async fn debug_audit_case(
    State(state): State<AppState>,
    Query(query): Query<DebugQuery>,
) -> Result<Json<AuditCaseData>, ApiError> {
    let case = bounded(
        &state,
        state
            .gateway
            .generate_audit_case(query.session_id.as_deref(), query.request_options()),
    )
    .await?;
    Ok(Json(case))
}
