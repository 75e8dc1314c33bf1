pub mod config;
pub mod error;
pub mod extractor;
pub mod model;
pub mod openai;

pub use config::ExtractorConfig;
pub use error::{ExtractionError, ModelError};
pub use extractor::{ExtractionOutcome, Extractor, DEFAULT_MAX_REPAIRS};
pub use model::{ItineraryModel, ScriptedModel};
pub use openai::OpenAiResponsesModel;
