//! End-to-end tests for the dashboard pipeline against canned provider responses

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use smartcity::{
    ApiRequest, Coordinates, Dashboard, DashboardConfig, DashboardError, Endpoint, ErrorCode,
    JsonSource, MarkerColor, Outcome, web,
};
use tower::ServiceExt;

/// Serves one canned document (or error) per endpoint and records every request
#[derive(Default)]
struct CannedSource {
    responses: HashMap<Endpoint, Value>,
    failures: HashMap<Endpoint, String>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl CannedSource {
    fn respond(mut self, endpoint: Endpoint, body: Value) -> Self {
        self.responses.insert(endpoint, body);
        self
    }

    fn fail(mut self, endpoint: Endpoint, message: &str) -> Self {
        self.failures.insert(endpoint, message.to_string());
        self
    }

    fn requests_to(&self, endpoint: Endpoint) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JsonSource for CannedSource {
    async fn get_json(&self, request: &ApiRequest) -> smartcity::Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = self.failures.get(&request.endpoint) {
            return Err(DashboardError::transport(request.endpoint, message.clone()));
        }
        Ok(self
            .responses
            .get(&request.endpoint)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

fn delhi_source() -> CannedSource {
    CannedSource::default()
        .respond(
            Endpoint::Weather,
            json!({ "coord": { "lat": 28.6, "lon": 77.2 }, "name": "Delhi", "cod": 200 }),
        )
        .respond(
            Endpoint::AirPollution,
            json!({ "coord": { "lat": 28.6, "lon": 77.2 },
                    "list": [{ "main": { "aqi": 4 }, "components": { "pm2_5": 45.2, "co": 200.1 }, "dt": 1709280000 }] }),
        )
        .respond(
            Endpoint::Directions,
            json!({ "features": [{ "properties": { "summary": { "distance": 2000.0, "duration": 216.0 } } }] }),
        )
        .respond(Endpoint::AqiFeed, waqi_feed(16))
}

fn waqi_feed(days: u32) -> Value {
    let pm25: Vec<Value> = (1..=days)
        .map(|day| json!({ "avg": 100 + day, "day": format!("2024-03-{day:02}"), "max": 200, "min": 50 }))
        .collect();
    json!({ "status": "ok", "data": { "aqi": 162, "forecast": { "daily": { "pm25": pm25 } } } })
}

fn dashboard(source: Arc<CannedSource>) -> Dashboard {
    Dashboard::new(source, Arc::new(DashboardConfig::default()))
}

#[tokio::test]
async fn test_delhi_pollution_lookup() {
    let source = Arc::new(delhi_source());
    let dashboard = dashboard(source.clone());

    let report = dashboard.pollution().lookup("Delhi").await.unwrap();

    assert_eq!(report.coordinates, Coordinates::new(28.6, 77.2));
    assert_eq!(report.reading.len(), 2);
    assert_eq!(report.reading.get("pm2_5"), Some(45.2));
    assert_eq!(report.reading.get("co"), Some(200.1));

    let geocode = source.requests_to(Endpoint::Weather);
    assert_eq!(geocode.len(), 1);
    assert_eq!(geocode[0].get_param("q"), Some("Delhi"));
    let pollution = source.requests_to(Endpoint::AirPollution);
    assert_eq!(pollution[0].get_param("lat"), Some("28.6"));
    assert_eq!(pollution[0].get_param("lon"), Some("77.2"));
}

#[tokio::test]
async fn test_unknown_city_skips_pollution_request() {
    let source = Arc::new(
        CannedSource::default()
            .respond(Endpoint::Weather, json!({ "cod": "404", "message": "city not found" })),
    );
    let dashboard = dashboard(source.clone());

    let err = dashboard.pollution().lookup("Atlantis").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::CityNotFound);
    assert!(source.requests_to(Endpoint::AirPollution).is_empty());
}

#[tokio::test]
async fn test_empty_pollution_list() {
    let source = Arc::new(
        delhi_source().respond(Endpoint::AirPollution, json!({ "coord": {}, "list": [] })),
    );
    let err = dashboard(source).pollution().lookup("Delhi").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PollutionUnavailable);
}

#[tokio::test]
async fn test_traffic_probe_destination_and_congestion() {
    let source = Arc::new(delhi_source());
    let dashboard = dashboard(source.clone());
    let origin = Coordinates::new(28.6, 77.2);

    let estimate = dashboard.traffic().estimate(origin).await.unwrap();

    // 2 km at 50 km/h is 144 s; 216 s is 50% slower
    assert_eq!(estimate.expected_duration_s, 144.0);
    assert_eq!(estimate.congestion_pct, Some(50.0));

    let requests = source.requests_to(Endpoint::Directions);
    assert_eq!(requests.len(), 1);
    let destination = Coordinates::new(28.6 + 0.01, 77.2 + 0.01);
    assert_eq!(requests[0].get_param("start"), Some("77.2,28.6"));
    assert_eq!(
        requests[0].get_param("end"),
        Some(destination.to_lon_lat().as_str())
    );
    assert_eq!(dashboard.traffic().destination_for(origin), destination);
}

#[tokio::test]
async fn test_no_route_found() {
    let source = Arc::new(delhi_source().respond(Endpoint::Directions, json!({ "type": "FeatureCollection" })));
    let err = dashboard(source)
        .traffic()
        .estimate(Coordinates::new(28.6, 77.2))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoRouteFound);
    assert_eq!(err.user_message(), "No route found in the API response.");
}

#[tokio::test]
async fn test_aqi_status_error() {
    let source = Arc::new(
        delhi_source().respond(Endpoint::AqiFeed, json!({ "status": "error", "data": "Invalid key" })),
    );
    let dashboard = dashboard(source);

    let err = dashboard.air_quality().history("Delhi").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AqiUnavailable);

    let snapshot = dashboard.snapshot("Delhi").await;
    assert!(snapshot.air_quality.ready().is_none());
    assert_eq!(snapshot.category, None);
    assert_eq!(snapshot.marker, None);
    // the other sections are unaffected
    assert!(snapshot.pollution.ready().is_some());
}

#[tokio::test]
async fn test_aqi_history_window() {
    let source = Arc::new(delhi_source());
    let history = dashboard(source.clone())
        .air_quality()
        .history("New Delhi")
        .await
        .unwrap();

    assert_eq!(history.current, Some(162.0));
    assert_eq!(history.samples.len(), 16);
    let trend: Vec<u32> = history.trend(7).iter().map(|s| s.aqi as u32).collect();
    assert_eq!(trend, vec![110, 111, 112, 113, 114, 115, 116]);

    let feed = source.requests_to(Endpoint::AqiFeed);
    assert!(feed[0].url.ends_with("/feed/New%20Delhi/"));
}

#[tokio::test]
async fn test_full_snapshot() {
    let snapshot = dashboard(Arc::new(delhi_source())).snapshot("Delhi").await;

    assert_eq!(snapshot.city, "Delhi");
    assert_eq!(snapshot.pm2_5(), Some(45.2));
    assert_eq!(snapshot.marker, Some(MarkerColor::Red));
    match snapshot.traffic {
        Some(Outcome::Ready(estimate)) => assert_eq!(estimate.congestion_pct, Some(50.0)),
        other => panic!("expected a traffic estimate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failures_never_abort_the_snapshot() {
    let source = Arc::new(
        delhi_source()
            .fail(Endpoint::Weather, "dns error")
            .fail(Endpoint::AqiFeed, "connection reset"),
    );
    let snapshot = dashboard(source.clone()).snapshot("Delhi").await;

    assert_eq!(
        snapshot.pollution.error().map(|e| e.code),
        Some(ErrorCode::Transport)
    );
    assert_eq!(
        snapshot.air_quality.error().map(|e| e.code),
        Some(ErrorCode::Transport)
    );
    // no coordinates, so no routing request
    assert!(snapshot.traffic.is_none());
    assert!(source.requests_to(Endpoint::Directions).is_empty());
}

#[tokio::test]
async fn test_routing_transport_failure_is_contained() {
    let source = Arc::new(delhi_source().fail(Endpoint::Directions, "timed out"));
    let snapshot = dashboard(source).snapshot("Delhi").await;

    let error = snapshot.traffic.as_ref().and_then(Outcome::error).unwrap();
    assert_eq!(error.code, ErrorCode::Transport);
    assert_eq!(error.message, "Failed to retrieve traffic data: timed out");
    assert!(snapshot.pollution.ready().is_some());
}

#[tokio::test]
async fn test_api_dashboard_route() {
    let app = web::router(Arc::new(dashboard(Arc::new(delhi_source()))));

    let response = app
        .oneshot(Request::get("/api/dashboard/delhi").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let snapshot: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(snapshot["city"], "Delhi");
    assert_eq!(snapshot["pollution"]["state"], "ready");
    assert_eq!(snapshot["pollution"]["value"]["coordinates"]["latitude"], 28.6);
    assert_eq!(snapshot["marker"], "red");
}

#[tokio::test]
async fn test_api_rejects_unsupported_city() {
    let app = web::router(Arc::new(dashboard(Arc::new(delhi_source()))));

    let response = app
        .oneshot(Request::get("/api/dashboard/Paris").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], "unsupported_city");
    let message = error["message"].as_str().unwrap();
    assert!(message.contains("Mumbai"));
    assert!(!message.contains("API key"));
}

#[tokio::test]
async fn test_api_lists_cities_and_levels() {
    let app = web::router(Arc::new(dashboard(Arc::new(CannedSource::default()))));

    let response = app
        .clone()
        .oneshot(Request::get("/api/cities").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let cities: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(cities.len(), 10);
    assert_eq!(cities[0], "Delhi");

    let response = app
        .oneshot(Request::get("/api/aqi-levels").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let levels: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(levels.as_array().map(Vec::len), Some(6));
    assert_eq!(levels[5]["label"], "Hazardous (301+)");
}

/// The `cities` subcommand needs no network access
#[test]
fn test_cli_lists_cities() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_smartcity"))
        .arg("cities")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Delhi"));
    assert!(stdout.contains("Lucknow"));
}

#[test]
fn test_cli_rejects_unsupported_city() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_smartcity"))
        .args(["report", "--city", "Paris"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'Paris' is not a supported city"));
    assert!(stderr.contains("Delhi"));
}
