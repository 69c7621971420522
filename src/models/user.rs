use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Preferences {
    pub currency: String,
    pub language: String,
    pub privacy: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            language: "en".to_string(),
            privacy: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String, // Always hashed
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub profile_photo: String,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub saved_destinations: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// What the API returns for a user; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub country: String,
    pub profile_photo: String,
    pub preferences: Preferences,
    pub saved_destinations: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UserRecord> for UserProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            city: user.city,
            country: user.country,
            profile_photo: user.profile_photo,
            preferences: user.preferences,
            saved_destinations: user.saved_destinations,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct UserSession {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_photo: String,
}

impl From<UserRecord> for UserSession {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_photo: user.profile_photo,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Registration {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile fields a user may change; absent fields are left untouched.
#[skip_serializing_none]
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_photo: Option<String>,
    pub preferences: Option<Preferences>,
}
