//! API Route Tests
//!
//! Builds the router in-process and drives it with `tower::ServiceExt::oneshot`.

use analyzer::AnalysisConfig;
use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::f64::consts::PI;
use std::sync::Arc;
use tower::ServiceExt;

fn create_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(AnalysisConfig::default()));
    (create_router(Arc::clone(&state)), state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn sine(freq: f64, sample_rate: f64, n: usize, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate).sin())
        .collect()
}

#[tokio::test]
async fn test_health_returns_json_object() {
    let (app, _) = create_app();
    let (status, json) = send(app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["alerts"]["total"], 0);
}

#[tokio::test]
async fn test_malformed_body_answers_with_json_error() {
    let (app, _) = create_app();
    let request = Request::post("/api/v1/spectrum")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!json["error"].as_str().unwrap().is_empty());

    // Well-formed JSON of the wrong shape
    let (app, _) = create_app();
    let (status, json) = send(app, post("/api/v1/cepstrum", json!({ "samples": "x" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].is_string());

    let (app, _) = create_app();
    let request = Request::post("/api/v1/analyze")
        .body(Body::from("{}"))
        .unwrap();
    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_spectrum_finds_50hz_tone() {
    let (app, _) = create_app();
    let body = json!({
        "samples": sine(50.0, 1000.0, 1024, 1.0),
        "sample_rate": 1000.0,
        "window": "hanning",
        "overlap_percent": 0.0
    });
    let (status, json) = send(app, post("/api/v1/spectrum", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fft_size"], 1024);
    assert_eq!(json["magnitudes"].as_array().unwrap().len(), 512);
    let peak = json["peak"]["frequency"].as_f64().unwrap();
    assert!((peak - 50.0).abs() < 1.0);
}

#[tokio::test]
async fn test_empty_signal_is_unprocessable() {
    let (app, _) = create_app();
    let body = json!({ "samples": [], "sample_rate": 1000.0 });
    let (status, json) = send(app, post("/api/v1/spectrum", body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_diagnose_reports_harmonics() {
    let (app, _) = create_app();
    let mut magnitudes = vec![0.001; 256];
    magnitudes[30] = 1.0;
    magnitudes[60] = 0.5;
    magnitudes[90] = 0.3;
    let frequencies: Vec<f64> = (0..256).map(|i| i as f64).collect();
    let body = json!({ "magnitudes": magnitudes, "frequencies": frequencies, "rpm": 1800.0 });

    let (status, json) = send(app, post("/api/v1/diagnose", body)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<u64> = json["harmonics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["order"].as_u64().unwrap())
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(json["faults"]["unbalance"], true);
    assert_eq!(json["peak"]["frequency"], 30.0);
}

#[tokio::test]
async fn test_diagnose_rejects_zero_rpm() {
    let (app, _) = create_app();
    let body = json!({ "magnitudes": [0.1, 1.0], "frequencies": [0.0, 1.0], "rpm": 0.0 });
    let (status, _) = send(app, post("/api/v1/diagnose", body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_statistics_bundle() {
    let (app, _) = create_app();
    let body = json!({
        "samples": [1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0],
        "magnitudes": [0.1, 0.2, 0.8, 0.3, 0.1],
        "frequencies": [10.0, 20.0, 30.0, 40.0, 50.0]
    });
    let (status, json) = send(app, post("/api/v1/statistics", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["temporal"]["rms"].as_f64().unwrap() > 0.0);
    assert_eq!(json["spectral"]["rolloff"], 30.0);
}

#[tokio::test]
async fn test_constant_signal_statistics_fail() {
    let (app, _) = create_app();
    let body = json!({
        "samples": [2.0, 2.0, 2.0, 2.0],
        "magnitudes": [0.1, 0.2],
        "frequencies": [10.0, 20.0]
    });
    let (status, json) = send(app, post("/api/v1/statistics", body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json.get("temporal").is_none());
}

#[tokio::test]
async fn test_cepstrum_of_echo() {
    let (app, _) = create_app();
    let mut samples = vec![0.0; 1024];
    samples[0] = 1.0;
    samples[16] = 0.5;
    let body = json!({ "samples": samples, "sample_rate": 1024.0 });
    let (status, json) = send(app, post("/api/v1/cepstrum", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!json["rahmonics"].as_array().unwrap().is_empty());
    assert_eq!(json["cepstrum"].as_array().unwrap().len(), 1024);
}

#[tokio::test]
async fn test_envelope_finds_modulation() {
    let (app, _) = create_app();
    let samples: Vec<f64> = (0..2048)
        .map(|i| {
            let t = i as f64 / 2048.0;
            (1.0 + 0.5 * (2.0 * PI * 20.0 * t).cos()) * (2.0 * PI * 200.0 * t).sin()
        })
        .collect();
    let body = json!({ "samples": samples, "sample_rate": 2048.0 });
    let (status, json) = send(app, post("/api/v1/envelope", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["modulation_peaks"][0]["frequency"], 20.0);
}

#[tokio::test]
async fn test_coherence_length_mismatch() {
    let (app, _) = create_app();
    let body = json!({ "signal_a": [1.0, 2.0, 3.0], "signal_b": [1.0, 2.0] });
    let (status, json) = send(app, post("/api/v1/coherence", body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("3"));
}

#[tokio::test]
async fn test_coherence_of_scaled_copy() {
    let (app, _) = create_app();
    let a = sine(10.0, 256.0, 256, 1.0);
    let b: Vec<f64> = a.iter().map(|v| 2.0 * v).collect();
    let body = json!({ "signal_a": a, "signal_b": b });
    let (status, json) = send(app, post("/api/v1/coherence", body)).await;
    assert_eq!(status, StatusCode::OK);
    let value = json["coherence"][10].as_f64().unwrap();
    assert!((value - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_orbit_of_circle() {
    let (app, _) = create_app();
    let t: Vec<f64> = (0..1000).map(|i| 2.0 * PI * i as f64 / 100.0).collect();
    let x: Vec<f64> = t.iter().map(|t| t.cos()).collect();
    let y: Vec<f64> = t.iter().map(|t| t.sin()).collect();
    let (status, json) = send(app, post("/api/v1/orbit", json!({ "x": x, "y": y }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["eccentricity"].as_f64().unwrap() < 0.2);
}

#[tokio::test]
async fn test_analyze_deduplicates_alerts() {
    let (_, state) = create_app();
    let body = json!({
        "equipment_id": "fan-7",
        "samples": sine(30.0, 1024.0, 1024, 10.0),
        "sample_rate": 1024.0,
        "rpm": 1800.0
    });

    let app = create_router(Arc::clone(&state));
    let (status, first) = send(app, post("/api/v1/analyze", body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["equipment_id"], "fan-7");
    let fired = first["fired_alerts"].as_array().unwrap().len();
    assert!(fired > 0);
    assert!(first["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["kind"] == "excessive_vibration"));

    let app = create_router(Arc::clone(&state));
    let (status, second) = send(app, post("/api/v1/analyze", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(second["fired_alerts"].as_array().unwrap().is_empty());

    let app = create_router(Arc::clone(&state));
    let (status, alerts) = send(app, get("/api/v1/alerts?severity=CRITICAL")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(alerts["count"].as_u64().unwrap() >= 1);
    assert_eq!(alerts["summary"]["total"].as_u64().unwrap() as usize, fired);

    let app = create_router(Arc::clone(&state));
    let ack = json!({ "kind": "excessive_vibration" });
    let (status, json) = send(app, post("/api/v1/alerts/acknowledge", ack)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["acknowledged"], true);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = create_app();
    let resp = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
