use actix_web::{web, HttpResponse};
use log::info;
use serde_json::json;

use super::required;
use super::trip::insert_trip;
use crate::error::ApiError;
use crate::models::itinerary::{GenerationResult, TripRequest};
use crate::models::trip::SaveAiPlan;
use crate::services::{itinerary_assembler, response_validator};
use crate::state::AppContext;

const FALLBACK_WARNING: &str =
    "The generated plan could not be read as a structured itinerary; the raw text is included instead.";

/*
    /api/generate-ai-plan
*/
pub async fn generate(
    ctx: web::Data<AppContext>,
    input: web::Json<TripRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = input.into_inner();
    let model = ctx.generator.model();

    let body = match ctx.generator.generate(&request).await? {
        GenerationResult::Success(itinerary) => json!({
            "success": true,
            "itinerary": itinerary,
            "model": model,
        }),
        GenerationResult::Fallback { raw_text, reason } => json!({
            "success": false,
            "itinerary_raw": raw_text,
            "reason": reason,
            "warning": FALLBACK_WARNING,
            "model": model,
        }),
    };

    Ok(HttpResponse::Ok().json(body))
}

/*
    /api/trips/save-ai-plan
*/
pub async fn save(
    ctx: web::Data<AppContext>,
    input: web::Json<SaveAiPlan>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let user_id = required(input.user_id, "user_id")?;
    let itinerary = input
        .itinerary
        .filter(|value| !value.is_null())
        .ok_or_else(|| ApiError::missing_field("itinerary"))?;

    // Same structural checks as freshly generated output.
    let itinerary = match response_validator::validate(&itinerary.to_string()) {
        GenerationResult::Success(itinerary) => itinerary,
        GenerationResult::Fallback { reason, .. } => {
            return Err(ApiError::Validation(format!(
                "itinerary is not a complete plan ({})",
                reason
            )))
        }
    };

    let trip = itinerary_assembler::assemble(&itinerary, &user_id);
    let trip = insert_trip(ctx.store.as_ref(), trip).await?;
    info!(
        "Saved generated itinerary as trip {}",
        trip.id.as_deref().unwrap_or_default()
    );

    Ok(HttpResponse::Created().json(json!({
        "message": "AI trip saved successfully",
        "trip": trip,
    })))
}
