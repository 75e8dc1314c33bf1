use std::fmt;

use crate::models::Itinerary;

/// A business rule an itinerary can break even when its shape is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    DayCountMismatch { actual: usize, expected: u32 },
    DayNumbering { expected: Vec<u32>, actual: Vec<u32> },
    CurrencyCode { currency: String },
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DayCountMismatch { actual, expected } => write!(
                f,
                "days length ({actual}) must equal duration_days ({expected})."
            ),
            Self::DayNumbering { expected, actual } => write!(
                f,
                "day_number must be exactly {expected:?} in order; got {actual:?}."
            ),
            Self::CurrencyCode { .. } => {
                write!(f, "currency must be a short code like LKR or USD.")
            }
        }
    }
}

/// Runs every rule and returns all violations; an empty list means valid.
pub fn validate_business_rules(itinerary: &Itinerary) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    let days = itinerary.days();
    let duration = itinerary.duration_days();

    if days.len() != duration as usize {
        violations.push(RuleViolation::DayCountMismatch {
            actual: days.len(),
            expected: duration,
        });
    }

    let expected = (1..=duration).collect::<Vec<_>>();
    let actual = days.iter().map(|day| day.day_number).collect::<Vec<_>>();
    if actual != expected {
        violations.push(RuleViolation::DayNumbering { expected, actual });
    }

    let currency_len = itinerary.currency().chars().count();
    if !matches!(currency_len, 3 | 4) {
        violations.push(RuleViolation::CurrencyCode {
            currency: itinerary.currency().to_string(),
        });
    }

    violations
}

pub fn violation_messages(violations: &[RuleViolation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}
