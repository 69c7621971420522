use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub const STATUS_PLANNING: &str = "planning";
pub const VISIBILITY_PRIVATE: &str = "private";
pub const VISIBILITY_PUBLIC: &str = "public";

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TripBudget {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub transport: f64,
    #[serde(default)]
    pub stay: f64,
    #[serde(default)]
    pub activities: f64,
    #[serde(default)]
    pub food: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TripActivity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Destination {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub activities: Vec<TripActivity>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub order: u32,
}

/// A saved, user-owned trip.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TripRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub budget: TripBudget,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default)]
    pub ai_generated: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    STATUS_PLANNING.to_string()
}

fn default_visibility() -> String {
    VISIBILITY_PRIVATE.to_string()
}

impl TripRecord {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id: user_id.into(),
            name: name.into(),
            description: String::new(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            cover_image: String::new(),
            destinations: Vec::new(),
            budget: TripBudget::default(),
            highlights: Vec::new(),
            status: default_status(),
            visibility: default_visibility(),
            ai_generated: false,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == VISIBILITY_PUBLIC
    }
}

#[derive(Debug, Deserialize)]
pub struct NewTrip {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

/// Editable trip fields; absent fields are left untouched.
#[skip_serializing_none]
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TripUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cover_image: Option<String>,
    pub destinations: Option<Vec<Destination>>,
    pub budget: Option<TripBudget>,
    pub highlights: Option<Vec<String>>,
    pub status: Option<String>,
    pub visibility: Option<String>,
    #[serde(skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TripUpdate {
    /// Stamps `updated_at`; every trip write goes through here.
    pub fn stamped(mut self) -> Self {
        self.updated_at = Some(Utc::now());
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct NewDestination {
    pub trip_id: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Deserialize)]
pub struct NewActivity {
    pub trip_id: Option<String>,
    pub destination_index: Option<usize>,
    pub name: Option<String>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveAiPlan {
    pub user_id: Option<String>,
    pub itinerary: Option<serde_json::Value>,
}
