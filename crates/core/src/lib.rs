pub mod demo;
pub mod models;
pub mod prompt;
pub mod rules;
pub mod schema;

pub use demo::build_demo_itinerary;
pub use models::*;
pub use prompt::{build_extraction_prompt, build_repair_prompt, SYSTEM_PROMPT};
pub use rules::{validate_business_rules, violation_messages, RuleViolation};
pub use schema::itinerary_json_schema;
