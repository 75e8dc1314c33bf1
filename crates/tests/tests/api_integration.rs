use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use voyage_agents::{ModelError, ScriptedModel};
use voyage_tests::{demo_app, itinerary, json_body, live_app, post_json, SAMPLE_TEXT};

#[tokio::test]
async fn healthz_reports_ok() {
    let response = demo_app()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn demo_extraction_returns_consistent_itinerary() {
    let response = demo_app()
        .oneshot(post_json(
            "/extract-itinerary",
            &json!({ "text": SAMPLE_TEXT, "max_days": 10, "currency": "LKR" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let data = json_body(response).await;
    assert_eq!(data["currency"], "LKR");
    assert_eq!(data["duration_days"], 4);
    assert_eq!(data["days"].as_array().unwrap().len(), 4);
    assert_eq!(data["days"][0]["base_city"], "Colombo");
    assert!(data["days"][0]["accommodation"].is_null());
}

#[tokio::test]
async fn request_defaults_apply() {
    let response = demo_app()
        .oneshot(post_json("/extract-itinerary", &json!({ "text": SAMPLE_TEXT })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let data = json_body(response).await;
    assert_eq!(data["currency"], "LKR");
    assert_eq!(data["days"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn short_text_is_rejected() {
    let response = demo_app()
        .oneshot(post_json("/extract-itinerary", &json!({ "text": "Kandy" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let data = json_body(response).await;
    assert!(data["detail"].as_str().unwrap().contains("at least 10"));
}

#[tokio::test]
async fn max_days_out_of_range_is_rejected() {
    let response = demo_app()
        .oneshot(post_json(
            "/extract-itinerary",
            &json!({ "text": SAMPLE_TEXT, "max_days": 30 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn misspelled_route_is_not_served() {
    let response = demo_app()
        .oneshot(post_json("/extract-itineary", &json!({ "text": SAMPLE_TEXT })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn live_extraction_after_one_repair() {
    let model = Arc::new(ScriptedModel::new([
        Ok(itinerary(3, &[1, 2], "LKR")),
        Ok(itinerary(2, &[1, 2], "LKR")),
    ]));
    let app = live_app(model.clone(), 2);

    let response = app
        .clone()
        .oneshot(post_json("/extract-itinerary", &json!({ "text": SAMPLE_TEXT })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["duration_days"], 2);
    assert_eq!(model.calls(), 2);

    let metrics = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let snapshot = json_body(metrics).await;
    assert_eq!(snapshot["extractions_total"], 1);
    assert_eq!(snapshot["model_calls_total"], 2);
    assert_eq!(snapshot["repairs_total"], 1);
}

#[tokio::test]
async fn exhausted_repairs_map_to_bad_gateway() {
    let model = Arc::new(ScriptedModel::repeating(Ok(itinerary(2, &[2, 1], "LKR"))));

    let response = live_app(model.clone(), 2)
        .oneshot(post_json("/extract-itinerary", &json!({ "text": SAMPLE_TEXT })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let detail = json_body(response).await["detail"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(detail.starts_with("Could not satisfy business rules after 2 repairs"));
    assert!(detail.contains("got [2, 1]"));
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn upstream_status_errors_map_to_bad_gateway() {
    let model = Arc::new(ScriptedModel::repeating(Err(ModelError::Status {
        status: 429,
        body: "insufficient_quota".to_string(),
    })));

    let response = live_app(model, 2)
        .oneshot(post_json("/extract-itinerary", &json!({ "text": SAMPLE_TEXT })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let detail = json_body(response).await["detail"].clone();
    assert!(detail.as_str().unwrap().contains("insufficient_quota"));
}

#[tokio::test]
async fn transport_failures_map_to_server_error() {
    let model = Arc::new(ScriptedModel::repeating(Err(ModelError::Transport(
        "connection reset by peer".to_string(),
    ))));

    let response = live_app(model, 2)
        .oneshot(post_json("/extract-itinerary", &json!({ "text": SAMPLE_TEXT })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail = json_body(response).await["detail"].clone();
    assert!(detail.as_str().unwrap().starts_with("Unexpected error:"));
}
