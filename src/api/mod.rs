// api/mod.rs - HTTP API

//! HTTP layer over the scenario store and the batch evaluator.
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | `/` | greeting |
//! | GET | `/api` | endpoint index |
//! | GET | `/health` | `{ status, version }` |
//! | GET | `/api/getAllScenarios` | stored scenario names |
//! | GET | `/api/getScenarioDetails/{scenario_number}` | stored document |
//! | POST | `/api/startEvaluation` | `{ message, results }` |
//!
//! Errors are returned as `{ "error": message }` with 400 for unreadable
//! requests, 404 for unknown scenarios, 422 for scenarios that cannot be
//! evaluated and 500 otherwise. Every route allows cross-origin requests.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::scenario::{Scenario, ScenarioDocument};
use crate::store::{scenario_name, ScenarioStore, StoreError};
use crate::trust::{BatchEvaluator, TrustError, TrustResult};

/// Errors returned by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Trust(#[from] TrustError),

    #[error(transparent)]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => ApiError::NotFound(format!("Scenario {} not found", name)),
            other => ApiError::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Trust(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Shared handler state
pub struct AppState {
    store: ScenarioStore,
    evaluator: BatchEvaluator,
}

impl AppState {
    pub fn new(store: ScenarioStore, evaluator: BatchEvaluator) -> Self {
        Self { store, evaluator }
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }
}

/// Scenario reference in an evaluation request: a number or a name
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScenarioRef {
    Number(u64),
    Name(String),
}

impl ScenarioRef {
    /// Store key for this reference
    pub fn store_name(&self) -> String {
        match self {
            ScenarioRef::Number(n) => scenario_name(*n),
            ScenarioRef::Name(name) => match name.parse::<u64>() {
                Ok(n) => scenario_name(n),
                Err(_) if name.starts_with("scenario_") => name.clone(),
                Err(_) => format!("scenario_{}", name),
            },
        }
    }
}

impl fmt::Display for ScenarioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioRef::Number(n) => write!(f, "{}", n),
            ScenarioRef::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StartEvaluationRequest {
    pub scenario: ScenarioRef,
}

#[derive(Debug, Serialize)]
pub struct StartEvaluationResponse {
    pub message: String,
    pub results: Vec<TrustResult>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api", get(api_index))
        .route("/health", get(health))
        .route("/api/getAllScenarios", get(get_all_scenarios))
        .route("/api/getScenarioDetails/{scenario_number}", get(get_scenario_details))
        .route("/api/startEvaluation", post(start_evaluation))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html("<b><big>Hello From Travos lab</big></b>")
}

#[derive(Serialize)]
struct EndpointIndex {
    service: &'static str,
    version: &'static str,
    endpoints: [&'static str; 3],
}

async fn api_index() -> Json<EndpointIndex> {
    Json(EndpointIndex {
        service: "travos-trust",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: [
            "GET /api/getAllScenarios",
            "GET /api/getScenarioDetails/{scenario_number}",
            "POST /api/startEvaluation",
        ],
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn get_all_scenarios(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.store.list_scenarios()?))
}

async fn get_scenario_details(
    State(state): State<Arc<AppState>>,
    scenario_number: Result<Path<u64>, PathRejection>,
) -> Result<Json<ScenarioDocument>, ApiError> {
    let Path(scenario_number) = scenario_number?;
    state
        .store
        .get_scenario(&scenario_name(scenario_number))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Scenario {} not found", scenario_number)))
}

async fn start_evaluation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartEvaluationRequest>, JsonRejection>,
) -> Result<Json<StartEvaluationResponse>, ApiError> {
    let Json(request) = payload?;
    let label = request.scenario.to_string();
    if label.trim().is_empty() {
        return Err(ApiError::BadRequest("scenario must not be empty".into()));
    }
    let document = state
        .store
        .get_scenario(&request.scenario.store_name())?
        .ok_or_else(|| ApiError::NotFound(format!("Selected scenario {} not found", label)))?;

    let worker = state.clone();
    let results = tokio::task::spawn_blocking(move || {
        let scenario = Scenario::try_from(document)?;
        worker.evaluator.evaluate(&scenario)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .inspect_err(|e| warn!(scenario = %label, error = %e, "Evaluation rejected"))?;

    info!(scenario = %label, results = results.len(), "Evaluation completed");
    Ok(Json(StartEvaluationResponse {
        message: format!("Evaluation started for scenario {}", label),
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_ref_store_name() {
        assert_eq!(ScenarioRef::Number(3).store_name(), "scenario_3");
        assert_eq!(ScenarioRef::Name("4".into()).store_name(), "scenario_4");
        assert_eq!(ScenarioRef::Name("scenario_5".into()).store_name(), "scenario_5");
        assert_eq!(ScenarioRef::Name("demo".into()).store_name(), "scenario_demo");
    }

    #[test]
    fn test_request_accepts_number_or_string() {
        let numeric: StartEvaluationRequest = serde_json::from_str(r#"{"scenario": 2}"#).unwrap();
        assert_eq!(numeric.scenario, ScenarioRef::Number(2));

        let text: StartEvaluationRequest = serde_json::from_str(r#"{"scenario": "2"}"#).unwrap();
        assert_eq!(text.scenario, ScenarioRef::Name("2".into()));
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(TrustError::MalformedScenario("x".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(StoreError::NotFound("scenario_1".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Serialization("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
