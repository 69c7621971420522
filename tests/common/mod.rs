#![allow(dead_code)]

use actix_web::{web, App};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use globetrotter_api::config::AppConfig;
use globetrotter_api::db::{DocumentStore, MemoryStore};
use globetrotter_api::routes;
use globetrotter_api::services::model_client::{CompletionClient, CompletionRequest, ModelError};
use globetrotter_api::state::AppContext;

pub const PARIS_ITINERARY: &str = r#"{
    "tripName": "Paris in Bloom",
    "city": "Paris",
    "country": "France",
    "startDate": "2024-06-15",
    "endDate": "2024-06-16",
    "overview": "Two days of art and food.",
    "highlights": ["Louvre", "Montmartre"],
    "estimatedBudget": {"total": 650, "transport": 50, "accommodation": 400, "food": 150, "activities": 50},
    "days": [
        {
            "dayNumber": 1,
            "date": "2024-06-15",
            "title": "Museums",
            "activities": [
                {"time": "2:00 PM", "title": "Musee d'Orsay", "duration": "3 hours", "cost": 16, "type": "culture", "location": "1 Rue de la Legion d'Honneur"},
                {"time": "9:00 AM", "title": "Louvre Museum", "duration": "3 hours", "cost": 17, "type": "culture", "location": "Rue de Rivoli"}
            ]
        },
        {
            "dayNumber": 2,
            "date": "2024-06-16",
            "title": "Montmartre",
            "activities": [
                {"time": "10:00 AM", "title": "Sacre-Coeur", "cost": 0, "type": "sightseeing", "location": "Montmartre"}
            ]
        }
    ]
}"#;

/// What the scripted model does on its next call.
pub enum Script {
    Reply(String),
    Unauthorized,
    Unavailable,
    Hang,
}

/// Completion client that plays back scripted replies and counts calls.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Script>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, step: Script) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn reply(&self, text: &str) {
        self.push(Script::Reply(text.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::Unauthorized) => Err(ModelError::UpstreamAuth(
                "HTTP 401 Unauthorized: Invalid API Key".to_string(),
            )),
            Some(Script::Unavailable) => Err(ModelError::UpstreamUnavailable(
                "HTTP 503 Service Unavailable: overloaded".to_string(),
            )),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
            None => Err(ModelError::InvalidResponse("no scripted reply".to_string())),
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "STORE_BACKEND" => Some("memory".to_string()),
        "GROQ_API_KEY" => Some("test-key".to_string()),
        "MODEL_TIMEOUT_SECS" => Some("1".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

pub struct TestApp {
    pub model: Arc<ScriptedClient>,
    pub context: web::Data<AppContext>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let model = Arc::new(ScriptedClient::new());
        let context = web::Data::new(AppContext::new(test_config(), store, model.clone()));

        Self { model, context }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.context.clone())
            .configure(routes::configure)
    }
}

/// Trip-request body for the planning endpoint.
pub fn trip_request(start: &str, end: &str) -> Value {
    serde_json::json!({
        "city": "Paris",
        "country": "France",
        "startDate": start,
        "endDate": end,
    })
}
