use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use studyplan_core::models::StudyPlanRequest;
use studyplan_core::plan::{PlanError, ValidationPolicy, generate_validated};
use studyplan_core::timetable::build_timetable_validated;

use crate::config::StudyPlanConfig;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.into(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        Self::unprocessable(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Read-only state shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub policy: ValidationPolicy,
    /// Pinned "today"; `None` reads the local date per request.
    pub today: Option<NaiveDate>,
}

impl AppState {
    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

impl From<&StudyPlanConfig> for AppState {
    fn from(config: &StudyPlanConfig) -> Self {
        Self {
            policy: config.policy,
            today: config.today,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/study-plan", post(create_study_plan))
        .route("/timetable", post(create_timetable))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(config: &StudyPlanConfig) -> Result<()> {
    let app = build_router(AppState::from(config));
    // Bare IPv6 addresses need brackets before the port.
    let addr = format!("{}:{}", config.bind, config.port)
        .parse::<SocketAddr>()
        .or_else(|_| format!("[{}]:{}", config.bind, config.port).parse::<SocketAddr>())
        .with_context(|| format!("invalid bind address {}:{}", config.bind, config.port))?;

    tracing::info!(
        reject_empty = config.policy.reject_empty,
        reject_blank_names = config.policy.reject_blank_names,
        max_timetable_days = config.policy.max_timetable_days,
        pinned_today = ?config.today,
        "studyplan serve listening on http://{addr}"
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("studyplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_study_plan(
    State(state): State<AppState>,
    payload: Result<Json<StudyPlanRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = payload?;
    let today = state.today();

    let response = generate_validated(&request, today, state.policy).inspect_err(|e| {
        tracing::warn!("rejected study plan request: {e}");
    })?;

    tracing::info!(
        subjects = request.subjects.len(),
        tasks = response.plan.len(),
        %today,
        "study plan generated"
    );
    Ok(Json(response).into_response())
}

async fn create_timetable(
    State(state): State<AppState>,
    payload: Result<Json<StudyPlanRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = payload?;
    let today = state.today();

    let timetable = build_timetable_validated(&request, today, state.policy).inspect_err(|e| {
        tracing::warn!("rejected timetable request: {e}");
    })?;

    tracing::info!(
        subjects = request.subjects.len(),
        days = timetable.days.len(),
        %today,
        "timetable generated"
    );
    Ok(Json(timetable).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
