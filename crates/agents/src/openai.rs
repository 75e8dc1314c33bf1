use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;
use voyage_core::{itinerary_json_schema, Itinerary};

use crate::error::ModelError;
use crate::model::ItineraryModel;

/// Itinerary model backed by the OpenAI Responses API with a strict JSON
/// schema output format.
#[derive(Debug, Clone)]
pub struct OpenAiResponsesModel {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiResponsesModel {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn payload(&self, system: &str, user: &str) -> Value {
        json!({
            "model": self.model,
            "temperature": 0,
            "input": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": "itinerary",
                    "strict": true,
                    "schema": itinerary_json_schema()
                }
            }
        })
    }
}

#[async_trait]
impl ItineraryModel for OpenAiResponsesModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, user: &str) -> Result<Itinerary, ModelError> {
        let response = self
            .http_client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(self.api_key.as_str())
            .json(&self.payload(system, user))
            .send()
            .await
            .map_err(|err| ModelError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| ModelError::Transport(format!("response parse failed: {err}")))?;

        if let Some(refusal) = extract_refusal(&body) {
            return Err(ModelError::Refusal(refusal));
        }

        let text = extract_output_text(&body)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ModelError::MissingOutput)?;
        debug!(chars = text.len(), model = %self.model, "model output received");

        Itinerary::from_model_json(&text).map_err(|err| ModelError::Schema {
            message: err.to_string(),
            raw: text,
        })
    }
}

fn output_content_items(payload: &Value) -> impl Iterator<Item = &Value> {
    payload
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
}

fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(value) = payload.get("output_text").and_then(Value::as_str) {
        return Some(value.to_string());
    }

    let chunks = output_content_items(payload)
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>();

    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n\n"))
    }
}

fn extract_refusal(payload: &Value) -> Option<String> {
    output_content_items(payload)
        .find(|item| item.get("type").and_then(Value::as_str) == Some("refusal"))
        .map(|item| {
            item.get("refusal")
                .and_then(Value::as_str)
                .unwrap_or("no reason given")
                .to_string()
        })
}
