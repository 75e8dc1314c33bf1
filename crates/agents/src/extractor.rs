use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use voyage_core::{
    build_demo_itinerary, build_extraction_prompt, build_repair_prompt, validate_business_rules,
    violation_messages, Itinerary, SYSTEM_PROMPT,
};
use voyage_observability::AppMetrics;

use crate::config::ExtractorConfig;
use crate::error::{ExtractionError, ModelError};
use crate::model::ItineraryModel;
use crate::openai::OpenAiResponsesModel;

pub const DEFAULT_MAX_REPAIRS: u32 = 2;

const DEMO_MODEL_NAME: &str = "demo";

#[derive(Clone)]
enum Mode {
    Demo,
    Live(Arc<dyn ItineraryModel>),
}

#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub itinerary: Itinerary,
    pub repairs_used: u32,
}

/// Where a model reply stands after validation.
enum Candidate {
    Valid(Itinerary),
    Violated {
        violations: Vec<String>,
        previous_output: String,
    },
}

/// Turns free text into a rule-conforming [`Itinerary`].
///
/// Build one at startup and share it; it holds no per-request state.
#[derive(Clone)]
pub struct Extractor {
    mode: Mode,
    model_name: String,
    call_timeout: Duration,
    metrics: Arc<AppMetrics>,
}

impl Extractor {
    /// Fails with [`ExtractionError::Config`] when live mode has no API key.
    pub fn from_config(
        config: &ExtractorConfig,
        metrics: Arc<AppMetrics>,
    ) -> Result<Self, ExtractionError> {
        if config.demo_mode {
            return Ok(Self::demo(metrics));
        }

        let api_key = config.api_key.as_deref().ok_or_else(|| {
            ExtractionError::Config(
                "Missing OPENAI_API_KEY and DEMO_MODE is false. Set DEMO_MODE=true to serve demo itineraries."
                    .to_string(),
            )
        })?;
        let model = OpenAiResponsesModel::new(
            api_key,
            config.model.as_str(),
            config.base_url.as_str(),
            config.request_timeout,
        )
        .map_err(|err| ExtractionError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self::live(Arc::new(model), metrics).with_call_timeout(config.request_timeout))
    }

    pub fn demo(metrics: Arc<AppMetrics>) -> Self {
        Self {
            mode: Mode::Demo,
            model_name: DEMO_MODEL_NAME.to_string(),
            call_timeout: Duration::from_secs(crate::config::DEFAULT_MODEL_TIMEOUT_SECONDS),
            metrics,
        }
    }

    pub fn live(model: Arc<dyn ItineraryModel>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            model_name: model.name().to_string(),
            mode: Mode::Live(model),
            call_timeout: Duration::from_secs(crate::config::DEFAULT_MODEL_TIMEOUT_SECONDS),
            metrics,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn is_demo(&self) -> bool {
        matches!(self.mode, Mode::Demo)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    /// Extracts an itinerary, spending at most `max_repairs` corrective model
    /// calls after the first one.
    #[instrument(
        skip(self, text),
        fields(
            extraction_id = %Uuid::new_v4(),
            demo = self.is_demo(),
            model = %self.model_name,
        )
    )]
    pub async fn extract(
        &self,
        text: &str,
        max_days: u32,
        currency: &str,
        max_repairs: u32,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let started = Instant::now();
        self.metrics.inc_extraction();

        let result = match &self.mode {
            Mode::Demo => self.extract_demo(max_days, currency),
            Mode::Live(model) => {
                self.extract_live(&**model, text, max_days, currency, max_repairs)
                    .await
            }
        };

        self.metrics.observe_latency(started.elapsed());
        match &result {
            Ok(outcome) => info!(
                repairs_used = outcome.repairs_used,
                days = outcome.itinerary.days().len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "extraction succeeded"
            ),
            Err(err) => {
                self.metrics.inc_failure();
                warn!(error = %err, "extraction failed");
            }
        }

        result
    }

    fn extract_demo(
        &self,
        max_days: u32,
        currency: &str,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        self.metrics.inc_demo();

        let itinerary = build_demo_itinerary(max_days, currency).map_err(|err| {
            ExtractionError::DemoTemplate {
                violations: vec![err.to_string()],
            }
        })?;

        let violations = violation_messages(&validate_business_rules(&itinerary));
        if !violations.is_empty() {
            return Err(ExtractionError::DemoTemplate { violations });
        }

        Ok(ExtractionOutcome {
            itinerary,
            repairs_used: 0,
        })
    }

    async fn extract_live(
        &self,
        model: &dyn ItineraryModel,
        text: &str,
        max_days: u32,
        currency: &str,
        max_repairs: u32,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let prompt = build_extraction_prompt(text, max_days, currency);
        let mut candidate = assess(self.call_model(model, &prompt).await)?;
        let mut repairs_used = 0;

        loop {
            let (violations, previous_output) = match candidate {
                Candidate::Valid(itinerary) => {
                    return Ok(ExtractionOutcome {
                        itinerary,
                        repairs_used,
                    })
                }
                Candidate::Violated {
                    violations,
                    previous_output,
                } => (violations, previous_output),
            };

            if repairs_used >= max_repairs {
                self.metrics.inc_exhausted();
                return Err(ExtractionError::Exhausted {
                    max_repairs,
                    violations,
                });
            }

            repairs_used += 1;
            self.metrics.inc_repair();
            info!(
                repair = repairs_used,
                max_repairs,
                violations = ?violations,
                "requesting repair"
            );

            let prompt = build_repair_prompt(&violations, &previous_output);
            candidate = assess(self.call_model(model, &prompt).await)?;
        }
    }

    async fn call_model(
        &self,
        model: &dyn ItineraryModel,
        prompt: &str,
    ) -> Result<Itinerary, ModelError> {
        self.metrics.inc_model_call();
        match timeout(self.call_timeout, model.generate(SYSTEM_PROMPT, prompt)).await {
            Ok(reply) => reply,
            Err(_) => Err(ModelError::Timeout(self.call_timeout)),
        }
    }
}

/// Schema failures become violations so they consume a repair attempt; every
/// other model error ends the extraction.
fn assess(reply: Result<Itinerary, ModelError>) -> Result<Candidate, ModelError> {
    match reply {
        Ok(itinerary) => {
            let violations = violation_messages(&validate_business_rules(&itinerary));
            if violations.is_empty() {
                return Ok(Candidate::Valid(itinerary));
            }
            let previous_output = serde_json::to_string_pretty(&itinerary).unwrap_or_default();
            Ok(Candidate::Violated {
                violations,
                previous_output,
            })
        }
        Err(ModelError::Schema { message, raw }) => Ok(Candidate::Violated {
            violations: vec![format!("Schema validation error: {message}")],
            previous_output: raw,
        }),
        Err(err) => Err(err),
    }
}
