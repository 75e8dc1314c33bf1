use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TRIP_DAYS: u32 = 21;
pub const MAX_TRAVELERS: u32 = 20;
pub const MIN_REQUEST_TEXT_CHARS: usize = 10;
pub const DEFAULT_MAX_DAYS: u32 = 10;
pub const DEFAULT_CURRENCY: &str = "LKR";

const MIN_TRIP_TITLE_CHARS: usize = 3;
const MIN_ACTIVITY_TITLE_CHARS: usize = 2;
const MIN_BASE_CITY_CHARS: usize = 2;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").expect("code fence pattern is valid")
});

/// Shape failures: anything that makes a value fail the itinerary data contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: u32,
        max: u32,
        value: u32,
    },
    #[error("days must not be empty")]
    EmptyDays,
    #[error("{0}")]
    Json(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("text must be at least {min} characters, got {actual}")]
    TextTooShort { min: usize, actual: usize },
    #[error("max_days must be between 1 and {max}, got {value}")]
    MaxDaysOutOfRange { max: u32, value: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityBlock {
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<u32>,
}

impl ActivityBlock {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            details: None,
            place: None,
            estimated_cost: None,
        }
    }

    pub fn at(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    fn check_shape(&self, path: &str) -> Result<(), SchemaError> {
        require_min_chars(&format!("{path}.title"), &self.title, MIN_ACTIVITY_TITLE_CHARS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayPlan {
    pub day_number: u32,
    pub base_city: String,
    #[serde(default)]
    pub morning: Vec<ActivityBlock>,
    #[serde(default)]
    pub afternoon: Vec<ActivityBlock>,
    #[serde(default)]
    pub evening: Vec<ActivityBlock>,
    #[serde(default)]
    pub accommodation: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl DayPlan {
    /// An empty day in `base_city`; fill the slots with struct update syntax.
    pub fn new(day_number: u32, base_city: impl Into<String>) -> Self {
        Self {
            day_number,
            base_city: base_city.into(),
            morning: Vec::new(),
            afternoon: Vec::new(),
            evening: Vec::new(),
            accommodation: None,
            notes: Vec::new(),
        }
    }

    fn check_shape(&self, path: &str) -> Result<(), SchemaError> {
        require_range(
            &format!("{path}.day_number"),
            self.day_number,
            1,
            MAX_TRIP_DAYS,
        )?;
        require_min_chars(
            &format!("{path}.base_city"),
            &self.base_city,
            MIN_BASE_CITY_CHARS,
        )?;

        for (slot, blocks) in [
            ("morning", &self.morning),
            ("afternoon", &self.afternoon),
            ("evening", &self.evening),
        ] {
            for (index, block) in blocks.iter().enumerate() {
                block.check_shape(&format!("{path}.{slot}[{index}]"))?;
            }
        }
        Ok(())
    }
}

/// Unchecked itinerary fields. Turn into an [`Itinerary`] with [`Itinerary::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItineraryDraft {
    pub trip_title: String,
    #[serde(default = "default_traveler_count")]
    pub traveler_count: u32,
    pub duration_days: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
    pub days: Vec<DayPlan>,
}

/// A shape-valid itinerary.
///
/// Every construction path, including deserialization, goes through
/// [`Itinerary::new`], so an `Itinerary` value always has a non-empty `days`
/// list and in-range fields. Business consistency (day count, numbering,
/// currency code) is checked separately by
/// [`validate_business_rules`](crate::rules::validate_business_rules).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItineraryDraft")]
pub struct Itinerary {
    trip_title: String,
    traveler_count: u32,
    duration_days: u32,
    currency: String,
    assumptions: Vec<String>,
    days: Vec<DayPlan>,
}

impl Itinerary {
    pub fn new(draft: ItineraryDraft) -> Result<Self, SchemaError> {
        if draft.days.is_empty() {
            return Err(SchemaError::EmptyDays);
        }
        require_min_chars("trip_title", &draft.trip_title, MIN_TRIP_TITLE_CHARS)?;
        require_range("traveler_count", draft.traveler_count, 1, MAX_TRAVELERS)?;
        require_range("duration_days", draft.duration_days, 1, MAX_TRIP_DAYS)?;
        for (index, day) in draft.days.iter().enumerate() {
            day.check_shape(&format!("days[{index}]"))?;
        }

        Ok(Self {
            trip_title: draft.trip_title,
            traveler_count: draft.traveler_count,
            duration_days: draft.duration_days,
            currency: draft.currency,
            assumptions: draft.assumptions,
            days: draft.days,
        })
    }

    /// Parses model output, accepting a single surrounding Markdown code fence.
    pub fn from_model_json(raw: &str) -> Result<Self, SchemaError> {
        let body = CODE_FENCE
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|inner| inner.as_str())
            .unwrap_or(raw);

        serde_json::from_str(body.trim()).map_err(|err| SchemaError::Json(err.to_string()))
    }

    pub fn trip_title(&self) -> &str {
        &self.trip_title
    }

    pub fn traveler_count(&self) -> u32 {
        self.traveler_count
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn assumptions(&self) -> &[String] {
        &self.assumptions
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn into_draft(self) -> ItineraryDraft {
        ItineraryDraft {
            trip_title: self.trip_title,
            traveler_count: self.traveler_count,
            duration_days: self.duration_days,
            currency: self.currency,
            assumptions: self.assumptions,
            days: self.days,
        }
    }
}

impl TryFrom<ItineraryDraft> for Itinerary {
    type Error = SchemaError;

    fn try_from(draft: ItineraryDraft) -> Result<Self, Self::Error> {
        Self::new(draft)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    #[serde(default = "default_max_days")]
    pub max_days: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl ExtractRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_days: DEFAULT_MAX_DAYS,
            currency: default_currency(),
        }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        let chars = self.text.chars().count();
        if chars < MIN_REQUEST_TEXT_CHARS {
            return Err(RequestError::TextTooShort {
                min: MIN_REQUEST_TEXT_CHARS,
                actual: chars,
            });
        }
        if !(1..=MAX_TRIP_DAYS).contains(&self.max_days) {
            return Err(RequestError::MaxDaysOutOfRange {
                max: MAX_TRIP_DAYS,
                value: self.max_days,
            });
        }
        Ok(())
    }
}

fn require_min_chars(field: &str, value: &str, min: usize) -> Result<(), SchemaError> {
    if value.chars().count() < min {
        return Err(SchemaError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    Ok(())
}

fn require_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), SchemaError> {
    if !(min..=max).contains(&value) {
        return Err(SchemaError::OutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        });
    }
    Ok(())
}

fn default_traveler_count() -> u32 {
    1
}

fn default_max_days() -> u32 {
    DEFAULT_MAX_DAYS
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}
