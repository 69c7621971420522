use actix_web::{web, HttpResponse};
use log::info;
use serde_json::json;

use super::{id_error, required};
use crate::db::{decode, encode, DocumentStore, Push, TRIPS};
use crate::error::ApiError;
use crate::models::trip::{NewTrip, TripRecord, TripUpdate, VISIBILITY_PRIVATE, VISIBILITY_PUBLIC};
use crate::state::AppContext;

pub(crate) async fn load_trip(store: &dyn DocumentStore, id: &str) -> Result<TripRecord, ApiError> {
    let doc = store
        .find_by_id(TRIPS, id)
        .await
        .map_err(id_error("trip"))?
        .ok_or(ApiError::NotFound("Trip"))?;
    Ok(decode(doc)?)
}

pub(crate) async fn insert_trip(
    store: &dyn DocumentStore,
    mut trip: TripRecord,
) -> Result<TripRecord, ApiError> {
    let id = store.insert(TRIPS, encode(&trip)?).await?;
    info!("Created trip {} for user {}", id, trip.user_id);
    trip.id = Some(id);
    Ok(trip)
}

/// Applies `update` (stamped) to an existing trip; 404 when it is gone.
pub(crate) async fn apply_update(
    store: &dyn DocumentStore,
    id: &str,
    update: TripUpdate,
) -> Result<(), ApiError> {
    let fields = encode(&update.stamped())?;
    if store
        .update_fields(TRIPS, id, fields)
        .await
        .map_err(id_error("trip"))?
    {
        Ok(())
    } else {
        Err(ApiError::NotFound("Trip"))
    }
}

/// Appends to one of the trip's arrays and stamps `updated_at` in the same
/// write; 404 when the trip (or the indexed destination) is gone.
pub(crate) async fn append_to_trip(
    store: &dyn DocumentStore,
    id: &str,
    push: Push,
) -> Result<(), ApiError> {
    let push = push.set_all(encode(&TripUpdate::default().stamped())?);
    if store.push(TRIPS, id, push).await.map_err(id_error("trip"))? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Trip"))
    }
}

/*
    /api/trips
*/
pub async fn create(
    ctx: web::Data<AppContext>,
    input: web::Json<NewTrip>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let user_id = required(input.user_id, "user_id")?;
    let name = required(input.name, "name")?;
    let start_date = required(input.start_date, "start_date")?;
    let end_date = required(input.end_date, "end_date")?;

    let mut trip = TripRecord::new(user_id, name, start_date, end_date);
    trip.description = input.description.unwrap_or_default();
    trip.cover_image = input.cover_image.unwrap_or_default();

    let trip = insert_trip(ctx.store.as_ref(), trip).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Trip created successfully",
        "trip": trip,
    })))
}

/*
    /api/trips/user/{user_id}
*/
pub async fn list_by_user(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let trips = ctx
        .store
        .list_by_owner(TRIPS, "user_id", &path)
        .await?
        .into_iter()
        .map(decode::<TripRecord>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(trips))
}

/*
    /api/trips/{id}
*/
pub async fn get_by_id(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let trip = load_trip(ctx.store.as_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(trip))
}

pub async fn update(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
    input: web::Json<TripUpdate>,
) -> Result<HttpResponse, ApiError> {
    let update = input.into_inner();

    if let Some(visibility) = update.visibility.as_deref() {
        if visibility != VISIBILITY_PUBLIC && visibility != VISIBILITY_PRIVATE {
            return Err(ApiError::Validation(format!(
                "visibility must be '{}' or '{}'",
                VISIBILITY_PUBLIC, VISIBILITY_PRIVATE
            )));
        }
    }

    apply_update(ctx.store.as_ref(), &path, update).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Trip updated successfully" })))
}

pub async fn delete(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let deleted = ctx
        .store
        .delete(TRIPS, &path)
        .await
        .map_err(id_error("trip"))?;
    if !deleted {
        return Err(ApiError::NotFound("Trip"));
    }

    info!("Deleted trip {}", path.as_str());
    Ok(HttpResponse::Ok().json(json!({ "message": "Trip deleted successfully" })))
}

/*
    /api/trips/{id}/budget
*/
pub async fn budget(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let trip = load_trip(ctx.store.as_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(trip.budget))
}

/*
    /api/trips/{id}/share
*/
pub async fn share(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let update = TripUpdate {
        visibility: Some(VISIBILITY_PUBLIC.to_string()),
        ..Default::default()
    };
    apply_update(ctx.store.as_ref(), &id, update).await?;

    let public_url = ctx
        .config
        .share_base_url
        .join(&id)
        .map_err(|e| ApiError::Internal(format!("Failed to build share link: {}", e)))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Trip is now public",
        "public_url": public_url.as_str(),
    })))
}

/*
    /api/shared/{id}
*/
pub async fn shared(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let trip = load_trip(ctx.store.as_ref(), &path).await?;
    if !trip.is_public() {
        return Err(ApiError::NotFound("Trip"));
    }
    Ok(HttpResponse::Ok().json(trip))
}
