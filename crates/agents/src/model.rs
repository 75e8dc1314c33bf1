use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use voyage_core::Itinerary;

use crate::error::ModelError;

/// The one capability the extractor needs from a language model: answer a
/// system instruction plus user prompt with a schema-valid itinerary.
#[async_trait]
pub trait ItineraryModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, system: &str, user: &str) -> Result<Itinerary, ModelError>;
}

pub type ScriptedReply = Result<Itinerary, ModelError>;

/// In-memory model that plays back a fixed list of replies and records every
/// prompt it receives. Once the script runs out the last reply repeats.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    last: Mutex<Option<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(reply: ScriptedReply) -> Self {
        Self::new([reply])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    /// User prompts in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ItineraryModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _system: &str, user: &str) -> Result<Itinerary, ModelError> {
        self.prompts.lock().push(user.to_string());

        let mut last = self.last.lock();
        if let Some(reply) = self.replies.lock().pop_front() {
            *last = Some(reply);
        }
        last.clone().unwrap_or(Err(ModelError::MissingOutput))
    }
}

#[cfg(test)]
mod tests {
    use voyage_core::build_demo_itinerary;

    use super::*;

    #[tokio::test]
    async fn plays_script_then_repeats_last_reply() {
        let itinerary = build_demo_itinerary(1, "LKR").unwrap();
        let model = ScriptedModel::new([
            Err(ModelError::MissingOutput),
            Ok(itinerary.clone()),
        ]);

        assert_eq!(model.generate("sys", "a").await, Err(ModelError::MissingOutput));
        assert_eq!(model.generate("sys", "b").await, Ok(itinerary.clone()));
        assert_eq!(model.generate("sys", "c").await, Ok(itinerary));
        assert_eq!(model.calls(), 3);
        assert_eq!(model.prompts(), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn empty_script_reports_missing_output() {
        let model = ScriptedModel::default();
        assert_eq!(model.generate("sys", "a").await, Err(ModelError::MissingOutput));
    }
}
