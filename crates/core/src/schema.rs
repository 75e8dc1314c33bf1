use serde_json::{json, Value};

use crate::models::{MAX_TRAVELERS, MAX_TRIP_DAYS};

/// JSON Schema for [`Itinerary`](crate::models::Itinerary) in the strict
/// structured-output dialect: closed objects, every property required,
/// optional values nullable.
pub fn itinerary_json_schema() -> Value {
    let activity = json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["title", "details", "place", "estimated_cost"],
        "properties": {
            "title": { "type": "string", "minLength": 2 },
            "details": { "type": ["string", "null"] },
            "place": { "type": ["string", "null"] },
            "estimated_cost": { "type": ["integer", "null"], "minimum": 0 }
        }
    });

    let day = json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "day_number", "base_city", "morning", "afternoon", "evening",
            "accommodation", "notes"
        ],
        "properties": {
            "day_number": { "type": "integer", "minimum": 1, "maximum": MAX_TRIP_DAYS },
            "base_city": { "type": "string", "minLength": 2 },
            "morning": { "type": "array", "items": { "$ref": "#/$defs/ActivityBlock" } },
            "afternoon": { "type": "array", "items": { "$ref": "#/$defs/ActivityBlock" } },
            "evening": { "type": "array", "items": { "$ref": "#/$defs/ActivityBlock" } },
            "accommodation": { "type": ["string", "null"] },
            "notes": { "type": "array", "items": { "type": "string" } }
        }
    });

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "trip_title", "traveler_count", "duration_days", "currency",
            "assumptions", "days"
        ],
        "properties": {
            "trip_title": { "type": "string", "minLength": 3 },
            "traveler_count": { "type": "integer", "minimum": 1, "maximum": MAX_TRAVELERS },
            "duration_days": { "type": "integer", "minimum": 1, "maximum": MAX_TRIP_DAYS },
            "currency": { "type": "string" },
            "assumptions": { "type": "array", "items": { "type": "string" } },
            "days": {
                "type": "array",
                "minItems": 1,
                "items": { "$ref": "#/$defs/DayPlan" }
            }
        },
        "$defs": {
            "ActivityBlock": activity,
            "DayPlan": day
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_closed(object: &Value) {
        assert_eq!(object["additionalProperties"], json!(false));
        let mut required = object["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        let mut properties = object["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        required.sort();
        properties.sort();
        assert_eq!(required, properties);
    }

    #[test]
    fn every_object_is_closed_and_fully_required() {
        let schema = itinerary_json_schema();
        assert_closed(&schema);
        assert_closed(&schema["$defs"]["DayPlan"]);
        assert_closed(&schema["$defs"]["ActivityBlock"]);
    }
}
