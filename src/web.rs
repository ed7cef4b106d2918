use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::dashboard::{Dashboard, DashboardSnapshot, ErrorReport};
use crate::models::{AqiCategory, City};

#[derive(Serialize)]
pub struct ApiAqiLevel {
    pub category: AqiCategory,
    pub label: &'static str,
    pub advisory: &'static str,
}

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/cities", get(get_cities))
        .route("/api/aqi-levels", get(get_aqi_levels))
        .route("/api/dashboard/{city}", get(get_dashboard))
        .with_state(dashboard)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(120),
        ))
        .layer(cors)
}

pub async fn run(dashboard: Arc<Dashboard>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Dashboard API running at http://localhost:{}", port);
    axum::serve(listener, router(dashboard))
        .await
        .context("Server terminated unexpectedly")
}

async fn get_cities() -> Json<Vec<&'static str>> {
    Json(City::ALL.iter().map(|city| city.name()).collect())
}

async fn get_aqi_levels() -> Json<Vec<ApiAqiLevel>> {
    Json(
        AqiCategory::ALL
            .iter()
            .map(|&category| ApiAqiLevel {
                category,
                label: category.label(),
                advisory: category.advisory(),
            })
            .collect(),
    )
}

async fn get_dashboard(
    State(dashboard): State<Arc<Dashboard>>,
    Path(city): Path<String>,
) -> Result<Json<DashboardSnapshot>, (StatusCode, Json<ErrorReport>)> {
    let city: City = city
        .parse()
        .map_err(|e| (StatusCode::NOT_FOUND, Json(ErrorReport::from(&e))))?;
    Ok(Json(dashboard.snapshot(city.name()).await))
}
