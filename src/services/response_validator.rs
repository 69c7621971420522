use log::debug;
use serde_json::Value;

use crate::models::itinerary::{FallbackReason, GenerationResult, Itinerary};

/// Trims the completion and unwraps a single surrounding markdown code fence.
pub fn extract_json_payload(raw_text: &str) -> &str {
    let trimmed = raw_text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
        if let Some(body) = rest.strip_suffix("```") {
            return body.trim();
        }
    }
    trimmed
}

fn fallback(raw_text: &str, reason: FallbackReason) -> GenerationResult {
    GenerationResult::Fallback {
        raw_text: raw_text.to_string(),
        reason,
    }
}

/// Turns raw model output into a structured itinerary or a fallback that
/// keeps the original text for diagnostics. Never fails.
pub fn validate(raw_text: &str) -> GenerationResult {
    let payload = extract_json_payload(raw_text);

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            debug!("Completion is not JSON: {}", e);
            return fallback(raw_text, FallbackReason::InvalidJson);
        }
    };

    let Some(object) = value.as_object() else {
        debug!("Completion JSON is not an object");
        return fallback(raw_text, FallbackReason::SchemaIncomplete);
    };

    if let Some(missing) = Itinerary::REQUIRED_KEYS
        .iter()
        .find(|key| !object.contains_key(**key))
    {
        debug!("Completion is missing required key '{}'", missing);
        return fallback(raw_text, FallbackReason::SchemaIncomplete);
    }

    match serde_json::from_value::<Itinerary>(value) {
        Ok(itinerary) => GenerationResult::Success(itinerary),
        Err(e) => {
            debug!("Completion has malformed structural keys: {}", e);
            fallback(raw_text, FallbackReason::SchemaIncomplete)
        }
    }
}
