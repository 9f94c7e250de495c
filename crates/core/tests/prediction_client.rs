//! Prediction client against a one-shot local HTTP stub
#![cfg(feature = "ml")]

use firewatch_core::prediction::{
    initialize_ml, EnvironmentalData, MlClientConfig, MlError, PredictionClient, PredictionSource,
    RiskCategory,
};
use firewatch_core::{EnvironmentalSnapshot, NotificationLevel, NotificationLog, SimulationContext};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const PREDICTION_BODY: &str = r#"{
    "success": true,
    "predictions": {
        "ensemble_risk_score": 0.72,
        "ml_prediction": {"overall_risk": 0.7, "confidence": 0.9, "risk_category": "high"},
        "confidence_interval": {"confidence_level": 0.9, "lower_bound": 0.62, "upper_bound": 0.82},
        "fire_weather_index": 0.44,
        "recommendations": ["Increase fire patrol frequency"]
    }
}"#;

const SIMULATION_BODY: &str = r#"{
    "success": true,
    "simulation": {
        "hourly_progression": [
            {"hour": 1, "burned_area_hectares": 3.5, "fire_perimeter_km": 1.2, "fire_intensity": 0.4, "spread_rate": 3.5},
            {"hour": 2, "burned_area_hectares": 8.0, "fire_perimeter_km": 2.1, "fire_intensity": 0.5, "spread_rate": 4.5}
        ],
        "final_state": {"hour": 2, "burned_area_hectares": 8.0},
        "fire_map": [[0.0, 1.0], [1.0, 0.0]]
    }
}"#;

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Read one request: head plus `Content-Length` bytes of body
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answer one connection per canned response, in order; yields the raw requests
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut stream).await);
            let response = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                reason_phrase(status),
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }
        requests
    });
    (format!("http://{addr}"), handle)
}

fn client(base_url: &str) -> PredictionClient {
    PredictionClient::new(
        MlClientConfig::default()
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(2)),
    )
}

fn env() -> EnvironmentalData {
    EnvironmentalData::from_snapshot(&EnvironmentalSnapshot::default(), 0.6, 1700.0, 20.0)
}

#[tokio::test]
async fn test_predict_success_is_service_tagged() {
    let (base, server) = serve(vec![(200, PREDICTION_BODY)]).await;
    let mut rng = StdRng::seed_from_u64(1);

    let prediction = client(&base).predict(&env(), &mut rng).await.unwrap();
    assert_eq!(prediction.source, PredictionSource::Service);
    assert_eq!(prediction.ensemble_risk_score, 0.72);
    assert_eq!(prediction.ml_prediction.risk_category, RiskCategory::High);
    assert_eq!(prediction.confidence_display(), "90.0%");
    assert!(prediction.risk_factors.is_none());

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /api/ml/predict "));
    assert!(requests[0].contains(r#""wind_direction":"NE""#));
    assert!(requests[0].contains(r#""vegetation_density":"moderate""#));
}

#[tokio::test]
async fn test_predict_failures_fall_back() {
    let cases: [(u16, &'static str, fn(&MlError) -> bool); 3] = [
        (200, r#"{"success": false, "error": "model not loaded"}"#, |e| *e == MlError::Unsuccessful),
        (500, r#"{"success": false}"#, |e| *e == MlError::Status(500)),
        (200, "<html>oops</html>", |e| matches!(e, MlError::MalformedBody(_))),
    ];
    let mut rng = StdRng::seed_from_u64(2);

    for (status, body, expected) in cases {
        let (base, server) = serve(vec![(status, body)]).await;
        let fallback = client(&base).predict(&env(), &mut rng).await.unwrap_err();
        assert!(expected(&fallback.reason), "unexpected reason {:?}", fallback.reason);

        let prediction = fallback.into_prediction();
        assert_eq!(prediction.source, PredictionSource::Fallback);
        assert!((0.0..=1.0).contains(&prediction.ensemble_risk_score));
        assert_eq!(
            prediction.ml_prediction.risk_category,
            RiskCategory::from_fallback_score(prediction.ensemble_risk_score)
        );
        server.await.unwrap();
    }
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut rng = StdRng::seed_from_u64(3);
    let fallback = client(&format!("http://{addr}"))
        .predict(&env(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(fallback.reason, MlError::Network(_)));
    assert!(fallback.prediction.is_fallback());
}

#[tokio::test]
async fn test_silent_service_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(stream);
    });

    let client = PredictionClient::new(
        MlClientConfig::default()
            .with_base_url(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(200)),
    );
    assert_eq!(client.model_info().await.unwrap_err(), MlError::Timeout);
    server.abort();
}

#[tokio::test]
async fn test_simulate_sends_location_and_duration() {
    let (base, server) = serve(vec![(200, SIMULATION_BODY)]).await;

    let simulation = client(&base).simulate(30.0668, 79.0193, &env()).await.unwrap();
    assert_eq!(simulation.hourly_progression.len(), 2);
    assert_eq!(simulation.final_state.burned_area_hectares, 8.0);
    assert_eq!(simulation.final_state.temperature, 0.0);
    assert_eq!(simulation.fire_map.len(), 2);

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /api/ml/simulate "));
    assert!(requests[0].contains(r#""duration":6"#));
    assert!(requests[0].contains(r#""lat":30.0668"#));
    assert!(requests[0].contains(r#""temperature":32.0"#));
}

#[tokio::test]
async fn test_initialize_with_service_available() {
    let (base, server) = serve(vec![
        (200, r#"{"success": true, "message": "Real-time updates started"}"#),
        (200, r#"{"success": true, "models": {"convlstm_unet": {"accuracy": "94.2%"}}}"#),
    ])
    .await;
    let log = NotificationLog::new();
    let mut ctx = SimulationContext::new().with_notifier(log.clone());

    initialize_ml(&client(&base), &mut ctx).await;

    assert!(ctx.predictions.realtime_active());
    assert_eq!(ctx.predictions.accuracy_display().as_deref(), Some("94.2%"));
    let messages: Vec<_> = log.entries().into_iter().map(|n| n.message).collect();
    assert_eq!(
        messages,
        vec!["Real-time AI predictions activated", "AI/ML models initialized successfully"]
    );

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /api/ml/start-realtime "));
    assert!(requests[1].starts_with("GET /api/ml/model-info "));
}

#[tokio::test]
async fn test_initialize_with_service_down() {
    let (base, server) = serve(vec![(503, "{}"), (503, "{}")]).await;
    let log = NotificationLog::new();
    let mut ctx = SimulationContext::new().with_notifier(log.clone());

    initialize_ml(&client(&base), &mut ctx).await;

    assert!(!ctx.predictions.realtime_active());
    assert!(ctx.predictions.model_info().is_none());
    assert_eq!(log.count(NotificationLevel::Warning), 1);
    assert_eq!(log.entries()[0].message, "Using local AI predictions");
    server.await.unwrap();
}
