pub const SYSTEM_PROMPT: &str = "You are a strict information extraction engine.
Return ONLY a JSON object matching the provided schema.
Do not include any extra keys.
If the user text is missing details, make minimal reasonable assumptions and list them in assumptions.
Keep activities realistic and safe.";

/// First-attempt prompt. The constraints here are advisory; the rule
/// validator is what enforces them.
pub fn build_extraction_prompt(text: &str, max_days: u32, currency: &str) -> String {
    format!(
        "Extract a travel itinerary from this text.

Hard requirements:
- duration_days must be <= {max_days}
- currency must be \"{currency}\"
- day_number must start at 1 and increase by 1
- days length must equal duration_days

Text:
{text}"
    )
    .trim()
    .to_string()
}

pub fn build_repair_prompt(violations: &[String], previous_output: &str) -> String {
    let violations = serde_json::to_string_pretty(violations)
        .unwrap_or_else(|_| format!("{violations:?}"));

    format!(
        "The JSON you produced did not satisfy our business rules.

Business rule violations:
{violations}

Here is your previous JSON:
{previous_output}

Fix the JSON so it satisfies the rules and still matches the schema exactly.
Return ONLY corrected JSON."
    )
}
