//! Shared fixtures for the HTTP integration tests.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use voyage_agents::{Extractor, ItineraryModel};
use voyage_api::{build_router, ApiState};
use voyage_core::{DayPlan, Itinerary, ItineraryDraft};
use voyage_observability::AppMetrics;

pub const SAMPLE_TEXT: &str =
    "We are 2 people. 4 days in Sri Lanka. Land in Colombo, want Kandy and Ella, train ride.";

pub fn demo_app() -> Router {
    build_router(ApiState::new(Extractor::demo(AppMetrics::shared()), 2))
}

pub fn live_app(model: Arc<dyn ItineraryModel>, max_repairs: u32) -> Router {
    build_router(ApiState::new(
        Extractor::live(model, AppMetrics::shared()),
        max_repairs,
    ))
}

pub fn itinerary(duration_days: u32, day_numbers: &[u32], currency: &str) -> Itinerary {
    Itinerary::new(ItineraryDraft {
        trip_title: "Hill country by rail".to_string(),
        traveler_count: 2,
        duration_days,
        currency: currency.to_string(),
        assumptions: Vec::new(),
        days: day_numbers
            .iter()
            .map(|&number| DayPlan::new(number, "Ella"))
            .collect(),
    })
    .expect("fixture itinerary has a valid shape")
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&body).expect("body should be JSON")
}
