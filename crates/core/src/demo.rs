use crate::models::{ActivityBlock, DayPlan, Itinerary, ItineraryDraft, SchemaError};

const DEMO_TEMPLATE_DAYS: u32 = 4;
const DEMO_TRAVELER_COUNT: u32 = 2;

/// Canned Sri Lanka itinerary used when no model is configured.
///
/// The template is cut to `min(4, max_days)` days. Only the length and the
/// currency follow the request; the content stays a placeholder.
pub fn build_demo_itinerary(max_days: u32, currency: &str) -> Result<Itinerary, SchemaError> {
    let duration = max_days.min(DEMO_TEMPLATE_DAYS);

    let days = (1..=duration).map(demo_day).collect::<Vec<_>>();

    Itinerary::new(ItineraryDraft {
        trip_title: "Demo Sri Lanka Itinerary".to_string(),
        traveler_count: DEMO_TRAVELER_COUNT,
        duration_days: duration,
        currency: currency.to_string(),
        assumptions: vec![
            "DEMO_MODE output (no model call).".to_string(),
            "Activities are generic placeholders for demonstration.".to_string(),
        ],
        days,
    })
}

fn demo_day(day: u32) -> DayPlan {
    match day {
        1 => DayPlan {
            morning: vec![ActivityBlock::titled("Arrive & city walk").at("Colombo")],
            afternoon: vec![ActivityBlock::titled("Museum / Galle Face").at("Colombo")],
            evening: vec![ActivityBlock::titled("Dinner by the sea").at("Colombo")],
            notes: vec![
                "DEMO_MODE: set DEMO_MODE=false and provide OPENAI_API_KEY for real model output."
                    .to_string(),
            ],
            ..DayPlan::new(day, "Colombo")
        },
        2 => DayPlan {
            morning: vec![ActivityBlock::titled("Travel to Kandy").at("Kandy")],
            afternoon: vec![ActivityBlock::titled("Temple of the Tooth visit").at("Kandy")],
            evening: vec![ActivityBlock::titled("Cultural show").at("Kandy")],
            ..DayPlan::new(day, "Kandy")
        },
        3 => DayPlan {
            morning: vec![ActivityBlock::titled("Scenic train ride").at("Kandy → Ella")],
            afternoon: vec![ActivityBlock::titled("Tea plantation tour").at("Nuwara Eliya / Ella")],
            evening: vec![ActivityBlock::titled("Relax & viewpoints").at("Ella")],
            ..DayPlan::new(day, "Nuwara Eliya / Ella")
        },
        _ => DayPlan {
            morning: vec![ActivityBlock::titled("Return to Colombo").at("Colombo")],
            afternoon: vec![ActivityBlock::titled("Shopping / souvenirs").at("Colombo")],
            evening: vec![ActivityBlock::titled("Departure prep").at("Colombo")],
            ..DayPlan::new(day, "Colombo")
        },
    }
}
