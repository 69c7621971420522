use chrono::NaiveDate;
use thiserror::Error;

use crate::models::itinerary::{ActivityType, TripRequest};

pub const MIN_TRIP_DAYS: i64 = 1;
pub const MAX_TRIP_DAYS: i64 = 30;

pub const SYSTEM_INSTRUCTION: &str =
    "You are a precise JSON generator. Always output only valid JSON with no explanations.";

/// Skeleton the model must reproduce. Field names and nesting are fixed.
pub const ITINERARY_SCHEMA: &str = r#"{
  "tripName": "string",
  "city": "string",
  "country": "string",
  "startDate": "YYYY-MM-DD",
  "endDate": "YYYY-MM-DD",
  "overview": "string",
  "highlights": ["string"],
  "estimatedBudget": {
    "total": 0,
    "transport": 0,
    "accommodation": 0,
    "food": 0,
    "activities": 0
  },
  "days": [
    {
      "dayNumber": 1,
      "date": "YYYY-MM-DD",
      "title": "string",
      "activities": [
        {
          "time": "9:00 AM",
          "title": "string",
          "description": "string",
          "duration": "2 hours",
          "cost": 0,
          "type": "sightseeing | food | culture | adventure | shopping | relaxation | other",
          "location": "string"
        }
      ]
    }
  ]
}"#;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("Missing required field: {0}")]
    Validation(&'static str),

    #[error("Dates must be in YYYY-MM-DD format (got '{0}')")]
    DateFormat(String),

    #[error("Invalid date range (must be 1-30 days, got {0})")]
    Range(i64),
}

/// Validated dates of a trip request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub num_days: i64,
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, PlanError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(PlanError::Validation(field))
}

// chrono also accepts unpadded fields ("2024-6-5"); only the canonical form
// is allowed so the prompt repeats the caller's dates verbatim.
fn parse_date(raw: &str) -> Result<NaiveDate, PlanError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .filter(|date| date.format("%Y-%m-%d").to_string() == raw)
        .ok_or_else(|| PlanError::DateFormat(raw.to_string()))
}

fn activity_types() -> String {
    ActivityType::ALL
        .iter()
        .map(ActivityType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn trip_window(request: &TripRequest) -> Result<TripWindow, PlanError> {
    let start_raw = required(&request.start_date, "startDate")?;
    let end_raw = required(&request.end_date, "endDate")?;
    let start = parse_date(start_raw)?;
    let end = parse_date(end_raw)?;

    let num_days = (end - start).num_days() + 1;
    if !(MIN_TRIP_DAYS..=MAX_TRIP_DAYS).contains(&num_days) {
        return Err(PlanError::Range(num_days));
    }

    Ok(TripWindow {
        start,
        end,
        num_days,
    })
}

/// Builds the itinerary instruction for a trip. Pure: identical requests give
/// identical prompts.
pub fn build(request: &TripRequest) -> Result<String, PlanError> {
    let city = required(&request.city, "city")?;
    let country = required(&request.country, "country")?;
    let window = trip_window(request)?;

    let start_date = window.start.format("%Y-%m-%d");
    let end_date = window.end.format("%Y-%m-%d");
    let num_days = window.num_days;
    let activity_types = activity_types();

    let naming = match request.trip_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => format!("Use \"{}\" as the tripName.", name),
        _ => "Invent a short, evocative tripName.".to_string(),
    };
    let notes = match request.description.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => format!("\nTraveler notes: {}\n", notes),
        _ => String::new(),
    };

    Ok(format!(
        r#"You are an expert travel planner.

Create a detailed {num_days}-day itinerary for a trip to {city}, {country},
from {start_date} to {end_date} (inclusive). {naming}
{notes}
Focus on popular attractions, local experiences, food, culture and relaxation.
Include a variety of activities each day.

Output ONLY valid JSON in this exact structure (no extra text or markdown):

{ITINERARY_SCHEMA}

Guidelines:
- "city" must be "{city}", "country" must be "{country}", "startDate" must be "{start_date}" and "endDate" must be "{end_date}"
- "days" must contain exactly {num_days} entries, numbered from 1, with consecutive dates starting at {start_date}
- Each day should have 4-6 activities, in chronological order
- For "title" and "location", use specific, real-world place names that are easily searchable on Google Maps
- "time" uses the 12-hour clock with AM/PM (e.g. "9:00 AM", "2:30 PM")
- "cost" is a non-negative estimate in USD per person; use 0 for free activities
- "type" is exactly one of: {activity_types}
- "estimatedBudget" values are non-negative USD totals for the whole trip
- Ensure the JSON is perfectly valid and parseable"#
    ))
}
