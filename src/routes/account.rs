use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::info;
use serde_json::json;

use super::{id_error, required};
use crate::db::{decode, encode, StoreError, USERS};
use crate::error::ApiError;
use crate::models::user::{
    Credentials, Preferences, ProfileUpdate, Registration, UserProfile, UserRecord, UserSession,
};
use crate::services::account_service::{hash_password, is_valid_email, verify_password};
use crate::state::AppContext;

fn already_exists() -> ApiError {
    ApiError::Conflict("User already exists".to_string())
}

/*
    /api/register
*/
pub async fn register(
    ctx: web::Data<AppContext>,
    input: web::Json<Registration>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let first_name = required(input.first_name, "first_name")?;
    let last_name = required(input.last_name, "last_name")?;
    let email = required(input.email, "email")?.trim().to_string();
    let password = required(input.password, "password")?;

    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }

    if ctx.store.find_by_field(USERS, "email", &email).await?.is_some() {
        return Err(already_exists());
    }

    let hashed = web::block(move || hash_password(&password))
        .await?
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    let user = UserRecord {
        id: None,
        first_name,
        last_name,
        email,
        password: hashed,
        phone: input.phone.unwrap_or_default(),
        city: input.city.unwrap_or_default(),
        country: input.country.unwrap_or_default(),
        profile_photo: input.profile_photo.unwrap_or_default(),
        preferences: Preferences::default(),
        saved_destinations: Vec::new(),
        created_at: Some(Utc::now()),
    };

    // Two registrations can both pass the lookup above; the unique index on
    // email decides which one wins.
    let user_id = ctx
        .store
        .insert(USERS, encode(&user)?)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => already_exists(),
            other => other.into(),
        })?;
    info!("Registered user {}", user_id);

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "user_id": user_id,
    })))
}

/*
    /api/login
*/
pub async fn login(
    ctx: web::Data<AppContext>,
    input: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let (Some(email), Some(password)) = (
        input.email.filter(|v| !v.trim().is_empty()),
        input.password.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::Validation("Email and password required".to_string()));
    };

    let rejected = || ApiError::Unauthorized("Invalid email or password".to_string());

    let Some(doc) = ctx.store.find_by_field(USERS, "email", email.trim()).await? else {
        return Err(rejected());
    };
    let user: UserRecord = decode(doc)?;

    let hashed = user.password.clone();
    if !web::block(move || verify_password(&password, &hashed)).await? {
        return Err(rejected());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "user": UserSession::from(user),
    })))
}

async fn load_user(ctx: &AppContext, id: &str) -> Result<UserRecord, ApiError> {
    let doc = ctx
        .store
        .find_by_id(USERS, id)
        .await
        .map_err(id_error("user"))?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(decode(doc)?)
}

/*
    /api/user/{id}
*/
pub async fn get_user(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = load_user(&ctx, &path).await?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

pub async fn update_user(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
    input: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ApiError> {
    let fields = encode(&input.into_inner())?;

    let matched = ctx
        .store
        .update_fields(USERS, &path, fields)
        .await
        .map_err(id_error("user"))?;
    if !matched {
        return Err(ApiError::NotFound("User"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Profile updated successfully" })))
}
