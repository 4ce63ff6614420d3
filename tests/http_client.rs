use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::Url;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use research_report_client::{
    Config, FailureKind, GenerationController, GenerationRequest, GenerationState, ReportClient,
    ReportError, ReportSource, ReportStyle, Resolution, ResultCount,
};

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    request_ids: Arc<Mutex<Vec<String>>>,
}

fn research_response() -> Value {
    json!({
        "research_results": [
            {
                "url": "https://x.test",
                "title": "EV battery market",
                "snippet": "Prices fell",
                "content_preview": "Lithium prices fell sharply",
                "fetched_text_length": 2048
            }
        ],
        "analysis_summary": "Battery costs keep falling.",
        "analysis_tables": {
            "sources": [{"URL": "https://x.test", "Score": 0.9}],
            "key_terms": [{"term": "LFP", "count": 3}]
        },
        "draft_report": "Draft body",
        "final_report": "Final body",
        "review_notes": "Tightened the intro",
        "processing_time": 18.25
    })
}

async fn research_ok(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        recorded.request_ids.lock().unwrap().push(id.to_string());
    }
    recorded.bodies.lock().unwrap().push(body);
    Json(research_response())
}

async fn research_failing() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": "Research process failed: search quota exceeded"})),
    )
}

async fn research_garbage() -> impl IntoResponse {
    (StatusCode::OK, "<html>not json</html>")
}

async fn research_wrong_shape() -> Json<Value> {
    Json(json!({"status": "queued"}))
}

async fn spawn_backend(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr) -> Config {
    Config {
        api_base_url: format!("http://{addr}/api"),
        ..Config::default()
    }
}

fn request() -> GenerationRequest {
    GenerationRequest::new(
        "EV battery trends 2025",
        ResultCount::Five,
        ReportStyle::Concise,
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_report_sends_wire_body() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/api/research", post(research_ok))
        .with_state(recorded.clone());
    let addr = spawn_backend(router).await;

    let client = ReportClient::new(&config_for(addr)).unwrap();
    let raw = client.fetch_report(&request()).await.unwrap();

    assert_eq!(raw, research_response());

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "topic": "EV battery trends 2025",
            "num_results": 5,
            "report_style": "concise"
        })
    );

    let ids = recorded.request_ids.lock().unwrap();
    assert_eq!(ids.len(), 1);
    assert!(uuid::Uuid::parse_str(&ids[0]).is_ok());
}

#[tokio::test]
async fn test_fetch_report_server_error_carries_detail() {
    let router = Router::new().route("/api/research", post(research_failing));
    let addr = spawn_backend(router).await;

    let client = ReportClient::new(&config_for(addr)).unwrap();
    let err = client.fetch_report(&request()).await.unwrap_err();

    assert_eq!(
        err,
        ReportError::Server {
            status: 500,
            detail: Some("Research process failed: search quota exceeded".to_string()),
        }
    );
}

#[tokio::test]
async fn test_fetch_report_invalid_json_is_decode_failure() {
    let router = Router::new().route("/api/research", post(research_garbage));
    let addr = spawn_backend(router).await;

    let client = ReportClient::new(&config_for(addr)).unwrap();
    let err = client.fetch_report(&request()).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Decode);
}

#[tokio::test]
async fn test_fetch_report_connection_refused_is_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ReportClient::with_endpoint(
        Url::parse(&format!("http://{addr}/api/research")).unwrap(),
    );
    let err = client.fetch_report(&request()).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Network);
}

#[tokio::test]
async fn test_fetch_report_unknown_route_is_server_error() {
    let router = Router::new().route("/api/research", post(research_failing));
    let addr = spawn_backend(router).await;

    let client = ReportClient::with_endpoint(
        Url::parse(&format!("http://{addr}/elsewhere/research")).unwrap(),
    );
    let err = client.fetch_report(&request()).await.unwrap_err();

    assert!(matches!(err, ReportError::Server { status: 404, .. }));
}

#[tokio::test]
async fn test_controller_end_to_end_success() {
    let router = Router::new()
        .route("/api/research", post(research_ok))
        .with_state(Recorded::default());
    let addr = spawn_backend(router).await;

    let controller = GenerationController::from_config(&config_for(addr)).unwrap();
    let resolution = controller
        .submit("EV battery trends 2025", ResultCount::Five, ReportStyle::Concise)
        .await
        .unwrap();
    assert_eq!(resolution, Resolution::Applied);

    let state = controller.state();
    assert_eq!(state.request(), Some(&request()));

    let result = state.result().expect("state should be Succeeded");
    let names: Vec<_> = result
        .analysis_tables
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["sources", "key_terms"]);

    let sources = &result.analysis_tables[0];
    assert_eq!(
        sources.rows[0].keys().collect::<Vec<_>>(),
        vec!["URL", "Score"]
    );
    assert!(sources.cells(&sources.rows[0]).next().unwrap().link);

    assert_eq!(result.search_entries[0].fetched_text_length, Some(2048));
    assert_eq!(
        result.processing_time_label().as_deref(),
        Some("Generated in 18.25 seconds")
    );
}

#[tokio::test]
async fn test_controller_end_to_end_server_error() {
    let router = Router::new().route("/api/research", post(research_failing));
    let addr = spawn_backend(router).await;

    let controller = GenerationController::from_config(&config_for(addr)).unwrap();
    controller
        .submit("EV battery trends 2025", ResultCount::Five, ReportStyle::Concise)
        .await
        .unwrap();

    match controller.state() {
        GenerationState::Failed {
            error_message,
            kind,
            ..
        } => {
            assert_eq!(kind, FailureKind::Server);
            assert!(error_message.contains("500"), "{error_message}");
            assert!(error_message.contains("search quota exceeded"), "{error_message}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(controller.state().result().is_none());
}

#[tokio::test]
async fn test_controller_end_to_end_wrong_shape() {
    let router = Router::new().route("/api/research", post(research_wrong_shape));
    let addr = spawn_backend(router).await;

    let controller = GenerationController::from_config(&config_for(addr)).unwrap();
    controller
        .submit("EV battery trends 2025", ResultCount::Five, ReportStyle::Concise)
        .await
        .unwrap();

    let state = controller.state();
    assert!(matches!(
        state,
        GenerationState::Failed {
            kind: FailureKind::MalformedResponse,
            ..
        }
    ));
    assert!(!state.error_message().unwrap().is_empty());
}
