use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Body of `POST /api/generate-ai-plan`. Presence is checked by the prompt
/// builder so a missing field produces a precise 400 rather than a serde error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub city: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub trip_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityType {
    Sightseeing,
    Food,
    Culture,
    Adventure,
    Shopping,
    Relaxation,
    #[default]
    Other,
}

impl ActivityType {
    /// The closed set the model is told to pick from, in prompt order.
    pub const ALL: [ActivityType; 7] = [
        ActivityType::Sightseeing,
        ActivityType::Food,
        ActivityType::Culture,
        ActivityType::Adventure,
        ActivityType::Shopping,
        ActivityType::Relaxation,
        ActivityType::Other,
    ];

    /// Case-insensitive; anything outside the closed set is `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sightseeing" => ActivityType::Sightseeing,
            "food" => ActivityType::Food,
            "culture" => ActivityType::Culture,
            "adventure" => ActivityType::Adventure,
            "shopping" => ActivityType::Shopping,
            "relaxation" => ActivityType::Relaxation,
            _ => ActivityType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Sightseeing => "sightseeing",
            ActivityType::Food => "food",
            ActivityType::Culture => "culture",
            ActivityType::Adventure => "adventure",
            ActivityType::Shopping => "shopping",
            ActivityType::Relaxation => "relaxation",
            ActivityType::Other => "other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value: Option<Value> = Option::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => ActivityType::parse(&s),
            _ => ActivityType::Other,
        })
    }
}

// Models quote prices in all sorts of shapes: 25, "25", "$25", "1,200", "Free".
// Anything that is not a finite non-negative amount becomes 0.
fn deserialize_cost<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(cost_from_value).unwrap_or(0.0))
}

fn cost_from_value(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .trim()
            .parse::<f64>()
            .ok(),
        _ => None,
    }?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

// Accepts numbers where text is expected ("duration": 2).
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn deserialize_day_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

// A wrongly typed optional value becomes its default instead of failing the
// whole itinerary.
fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

// Non-arrays become empty; malformed entries are dropped.
fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Activity {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub time: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub duration: String,
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub cost: f64,
    #[serde(rename = "type", default)]
    pub activity_type: ActivityType,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    /// 0 when the model omitted it; consumers fall back to the position.
    #[serde(default, deserialize_with = "deserialize_day_number")]
    pub day_number: u32,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct EstimatedBudget {
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub total: f64,
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub transport: f64,
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub accommodation: f64,
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub food: f64,
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub activities: f64,
}

/// The full generated multi-day plan.
///
/// The six structural keys are required; everything else defaults, including
/// when the model sends it with the wrong type.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub trip_name: String,
    pub city: String,
    pub country: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub overview: String,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub highlights: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub estimated_budget: EstimatedBudget,
    pub days: Vec<ItineraryDay>,
}

impl Itinerary {
    pub const REQUIRED_KEYS: [&'static str; 6] =
        ["tripName", "city", "country", "startDate", "endDate", "days"];

    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|day| day.activities.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    InvalidJson,
    SchemaIncomplete,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::InvalidJson => "invalid-json",
            FallbackReason::SchemaIncomplete => "schema-incomplete",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FallbackReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Success(Itinerary),
    Fallback {
        raw_text: String,
        reason: FallbackReason,
    },
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_lenient_fields() {
        let activity: Activity = serde_json::from_value(json!({
            "time": "9:00 AM",
            "title": "Louvre Museum",
            "duration": 3,
            "cost": "$1,200",
            "type": "Culture"
        }))
        .unwrap();
        assert_eq!(activity.duration, "3");
        assert_eq!(activity.cost, 1200.0);
        assert_eq!(activity.activity_type, ActivityType::Culture);
        assert_eq!(activity.location, "");
    }

    #[test]
    fn test_activity_cost_never_negative() {
        let free: Activity = serde_json::from_value(json!({ "cost": "Free" })).unwrap();
        assert_eq!(free.cost, 0.0);
        let negative: Activity = serde_json::from_value(json!({ "cost": -10 })).unwrap();
        assert_eq!(negative.cost, 0.0);
    }

    #[test]
    fn test_unknown_activity_type_is_other() {
        let activity: Activity = serde_json::from_value(json!({ "type": "snorkeling" })).unwrap();
        assert_eq!(activity.activity_type, ActivityType::Other);
        let activity: Activity = serde_json::from_value(json!({ "type": null })).unwrap();
        assert_eq!(activity.activity_type, ActivityType::Other);
    }

    #[test]
    fn test_activity_type_serializes_lowercase() {
        let value = serde_json::to_value(ActivityType::Relaxation).unwrap();
        assert_eq!(value, json!("relaxation"));
        for kind in ActivityType::ALL {
            assert_eq!(ActivityType::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_itinerary_defaults_non_structural_keys() {
        let itinerary: Itinerary = serde_json::from_value(json!({
            "tripName": "Paris Getaway",
            "city": "Paris",
            "country": "France",
            "startDate": "2024-06-15",
            "endDate": "2024-06-18",
            "highlights": null,
            "days": []
        }))
        .unwrap();
        assert_eq!(itinerary.overview, "");
        assert!(itinerary.highlights.is_empty());
        assert_eq!(itinerary.estimated_budget, EstimatedBudget::default());
    }

    fn paris_with(extra: Value) -> Value {
        let mut value = json!({
            "tripName": "Paris Getaway",
            "city": "Paris",
            "country": "France",
            "startDate": "2024-06-15",
            "endDate": "2024-06-18",
            "days": []
        });
        if let (Some(base), Value::Object(extra)) = (value.as_object_mut(), extra) {
            base.extend(extra);
        }
        value
    }

    #[test]
    fn test_wrongly_typed_optional_keys_default() {
        let itinerary: Itinerary = serde_json::from_value(paris_with(json!({
            "overview": 42,
            "highlights": "Louvre, Eiffel Tower",
            "estimatedBudget": "about $900"
        })))
        .unwrap();
        assert_eq!(itinerary.overview, "");
        assert!(itinerary.highlights.is_empty());
        assert_eq!(itinerary.estimated_budget, EstimatedBudget::default());
    }

    #[test]
    fn test_highlights_keep_only_text_entries() {
        let itinerary: Itinerary = serde_json::from_value(paris_with(json!({
            "highlights": ["Louvre", 3, null, "Seine cruise"]
        })))
        .unwrap();
        assert_eq!(itinerary.highlights, vec!["Louvre", "Seine cruise"]);
    }

    #[test]
    fn test_day_activities_tolerate_bad_shapes() {
        let day: ItineraryDay =
            serde_json::from_value(json!({ "dayNumber": 1, "activities": "free day" })).unwrap();
        assert!(day.activities.is_empty());

        let day: ItineraryDay = serde_json::from_value(json!({
            "dayNumber": 2,
            "activities": ["stroll", { "title": "Louvre Museum", "cost": 22 }, 7]
        }))
        .unwrap();
        assert_eq!(day.activities.len(), 1);
        assert_eq!(day.activities[0].title, "Louvre Museum");
    }

    #[test]
    fn test_itinerary_requires_days() {
        let result: Result<Itinerary, _> = serde_json::from_value(json!({
            "tripName": "X",
            "city": "Paris",
            "country": "France",
            "startDate": "2024-06-15",
            "endDate": "2024-06-18"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_fallback_reason_strings() {
        assert_eq!(FallbackReason::InvalidJson.to_string(), "invalid-json");
        assert_eq!(FallbackReason::SchemaIncomplete.to_string(), "schema-incomplete");
    }
}
