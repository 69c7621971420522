use actix_web::{web, HttpResponse};
use serde_json::json;

use super::required;
use super::trip::{append_to_trip, load_trip};
use crate::db::{encode, Push};
use crate::error::ApiError;
use crate::models::trip::{Destination, NewActivity, NewDestination, TripActivity};
use crate::state::AppContext;

/*
    /api/destinations/add
*/
pub async fn add_destination(
    ctx: web::Data<AppContext>,
    input: web::Json<NewDestination>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let trip_id = required(input.trip_id, "trip_id")?;
    let city = required(input.city, "city")?;

    let destination = Destination {
        city,
        country: input.country.unwrap_or_default(),
        start_date: input.start_date.unwrap_or_default(),
        end_date: input.end_date.unwrap_or_default(),
        activities: Vec::new(),
        budget: 0.0,
        order: input.order,
    };
    append_to_trip(
        ctx.store.as_ref(),
        &trip_id,
        Push::new("destinations", encode(&destination)?),
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({ "message": "Destination added successfully" })))
}

/*
    /api/activities/add
*/
pub async fn add_activity(
    ctx: web::Data<AppContext>,
    input: web::Json<NewActivity>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let trip_id = required(input.trip_id, "trip_id")?;
    let name = required(input.name, "name")?;
    let index = input
        .destination_index
        .ok_or_else(|| ApiError::missing_field("destination_index"))?;
    if input.cost < 0.0 {
        return Err(ApiError::Validation("cost must not be negative".to_string()));
    }

    let trip = load_trip(ctx.store.as_ref(), &trip_id).await?;
    if index >= trip.destinations.len() {
        return Err(ApiError::Validation(format!(
            "destination_index {} is out of range",
            index
        )));
    }

    let cost = input.cost;
    let activity = TripActivity {
        name,
        time: input.time,
        duration: input.duration,
        cost,
        activity_type: input.activity_type,
        description: input.description,
        day: input.day,
        location: input.location,
    };
    // The index is re-checked by the store; a destination removed since the
    // read above turns into a 404.
    let push = Push::new(format!("destinations.{}.activities", index), encode(&activity)?)
        .inc(format!("destinations.{}.budget", index), cost);
    append_to_trip(ctx.store.as_ref(), &trip_id, push).await?;

    Ok(HttpResponse::Created().json(json!({ "message": "Activity added successfully" })))
}
