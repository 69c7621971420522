use actix_web::web;

use crate::db::StoreError;
use crate::error::ApiError;

pub mod account;
pub mod ai_plan;
pub mod assistant;
pub mod catalog;
pub mod destination;
pub mod health;
pub mod trip;

/// Registers every endpoint under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::Validation(format!("Invalid request body: {}", err)).into()
            }))
            .route("/health", web::get().to(health::health_check))
            // Accounts
            .route("/register", web::post().to(account::register))
            .route("/login", web::post().to(account::login))
            .route("/user/{id}", web::get().to(account::get_user))
            .route("/user/{id}", web::put().to(account::update_user))
            // AI planning
            .route("/generate-ai-plan", web::post().to(ai_plan::generate))
            .route("/trips/save-ai-plan", web::post().to(ai_plan::save))
            // Trips
            .route("/trips", web::post().to(trip::create))
            .route("/trips/user/{user_id}", web::get().to(trip::list_by_user))
            .route("/trips/{id}", web::get().to(trip::get_by_id))
            .route("/trips/{id}", web::put().to(trip::update))
            .route("/trips/{id}", web::delete().to(trip::delete))
            .route("/trips/{id}/budget", web::get().to(trip::budget))
            .route("/trips/{id}/share", web::post().to(trip::share))
            .route("/shared/{id}", web::get().to(trip::shared))
            .route("/destinations/add", web::post().to(destination::add_destination))
            .route("/activities/add", web::post().to(destination::add_activity))
            // Catalog
            .route("/cities/search", web::get().to(catalog::search_cities))
            .route("/activities/search", web::get().to(catalog::search_activities))
            // Assistant
            .route("/chat", web::post().to(assistant::chat))
            .route("/inspiration", web::get().to(assistant::inspiration)),
    );
}

/// A present, non-blank value or a "`field` is required" error. The value is
/// returned untrimmed.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::missing_field(field))
}

/// Names the resource in malformed-id errors.
pub(crate) fn id_error(resource: &'static str) -> impl Fn(StoreError) -> ApiError {
    move |err| match err {
        StoreError::InvalidId(_) => ApiError::InvalidId(resource),
        other => other.into(),
    }
}
