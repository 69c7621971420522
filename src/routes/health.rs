use actix_web::{web, HttpResponse, Responder};
use log::warn;
use serde::Serialize;
use std::collections::HashMap;

use crate::state::AppContext;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    services: HashMap<&'static str, ServiceStatus>,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    details: String,
}

pub async fn health_check(ctx: web::Data<AppContext>) -> impl Responder {
    let mut services = HashMap::new();
    services.insert("store", check_store(&ctx).await);
    services.insert("model", check_model(&ctx));

    HttpResponse::Ok().json(HealthStatus {
        status: "GlobeTrotter API running",
        version: env!("CARGO_PKG_VERSION"),
        services,
    })
}

async fn check_store(ctx: &AppContext) -> ServiceStatus {
    match ctx.store.ping().await {
        Ok(()) => ServiceStatus {
            status: "ok",
            details: format!("{} store reachable", ctx.store.backend_name()),
        },
        Err(e) => {
            warn!("Store health check failed: {}", e);
            ServiceStatus {
                status: "error",
                details: e.to_string(),
            }
        }
    }
}

// Presence only; the key is never echoed.
fn check_model(ctx: &AppContext) -> ServiceStatus {
    let configured = ctx
        .config
        .model
        .api_key
        .as_deref()
        .is_some_and(|key| !key.is_empty());

    if configured {
        ServiceStatus {
            status: "ok",
            details: format!("{} configured", ctx.generator.model()),
        }
    } else {
        ServiceStatus {
            status: "error",
            details: "GROQ_API_KEY not configured".to_string(),
        }
    }
}
