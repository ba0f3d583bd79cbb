use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;

use vaxsird::projection::DEFAULT_MAX_DAYS;
use vaxsird::{
    Divergence, ModelParams, ProjectionError, ProjectionRequest, Projector, VaccinationRate,
};

#[derive(Clone)]
struct AppState {
    projector: Arc<Projector>,
}

/// Dashboard-shaped request: vaccination is a percentage, as users type it.
#[derive(Debug, Deserialize)]
struct RunRequest {
    cases: Vec<u64>,
    population: u64,
    cumulative_deaths: u64,
    vaccination_percent: f64,
    days: u32,
    strict: Option<bool>,
}

#[derive(Debug, Serialize)]
struct RunResponse {
    new_cases: i64,
    new_deaths: i64,
    diagnostics: Vec<Divergence>,
}

type ApiError = (StatusCode, serde_json::Value);

fn error_body(e: &ProjectionError) -> ApiError {
    let code = match e {
        ProjectionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ProjectionError::Divergence(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (code, json!({"error": e.to_string()}))
}

impl RunRequest {
    fn into_projection_request(self) -> Result<ProjectionRequest, ApiError> {
        let vaccination_rate =
            VaccinationRate::from_percent(self.vaccination_percent).map_err(|e| error_body(&e))?;
        Ok(ProjectionRequest {
            cases: self.cases,
            population: self.population,
            cumulative_deaths: self.cumulative_deaths,
            vaccination_rate,
            days: self.days,
            strict: self.strict.unwrap_or(false),
        })
    }
}

fn load_params() -> anyhow::Result<ModelParams> {
    match std::env::var("VAXSIRD_PARAMS") {
        Ok(path) => ModelParams::load_json(&path),
        Err(_) => Ok(ModelParams::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);

    let params = load_params()?;
    info!("model params: {:?}", params);
    let max_days: u32 = std::env::var("VAXSIRD_MAX_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_DAYS);
    let projector = Projector::new(params)
        .context("invalid model params")?
        .with_max_days(max_days)
        .context("invalid VAXSIRD_MAX_DAYS")?;
    info!("horizon limit: {} days", projector.max_days());
    let state = AppState { projector: Arc::new(projector) };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/projection", post(run_projection))
        .route("/trajectory", post(run_trajectory))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse().context("invalid HOST/PORT")?;
    info!("[vaxsird-api] listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.context("bind failed")?;
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"ok": true}))
}

async fn run_projection(State(st): State<AppState>, Json(req): Json<RunRequest>) -> impl IntoResponse {
    // Long horizons are CPU work; keep them off the async workers.
    let join = tokio::task::spawn_blocking(move || {
        let req = req.into_projection_request()?;
        let projection = st.projector.project(&req).map_err(|e| error_body(&e))?;
        Ok::<_, ApiError>(RunResponse {
            new_cases: projection.result.new_cases,
            new_deaths: projection.result.new_deaths,
            diagnostics: projection.diagnostics,
        })
    });

    match join.await {
        Ok(Ok(resp)) => (StatusCode::OK, Json(resp)).into_response(),
        Ok(Err((code, body))) => (code, Json(body)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("join error: {e}")})),
        )
            .into_response(),
    }
}

async fn run_trajectory(State(st): State<AppState>, Json(req): Json<RunRequest>) -> impl IntoResponse {
    let join = tokio::task::spawn_blocking(move || {
        let req = req.into_projection_request()?;
        st.projector.trajectory(&req).map_err(|e| error_body(&e))
    });

    match join.await {
        Ok(Ok(days)) => (StatusCode::OK, Json(json!({"days": days}))).into_response(),
        Ok(Err((code, body))) => (code, Json(body)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("join error: {e}")})),
        )
            .into_response(),
    }
}
