use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::assistant::{ChatReply, ChatRequest};
use crate::state::AppContext;

/*
    /api/chat
*/
pub async fn chat(
    ctx: web::Data<AppContext>,
    input: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let message = input.message.unwrap_or_default();

    let response = ctx.assistant.chat(&message, &input.history).await?;
    Ok(HttpResponse::Ok().json(ChatReply { response }))
}

/*
    /api/inspiration
*/
pub async fn inspiration(ctx: web::Data<AppContext>) -> Result<HttpResponse, ApiError> {
    let feed = ctx.assistant.inspiration().await?;
    Ok(HttpResponse::Ok().json(feed))
}
