use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DocumentStore;
use crate::services::assistant_service::TravelAssistant;
use crate::services::itinerary_generation_service::ItineraryGenerator;
use crate::services::model_client::CompletionClient;

/// Process-wide state handed to every handler as `web::Data<AppContext>`.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
    pub generator: ItineraryGenerator,
    pub assistant: TravelAssistant,
}

impl AppContext {
    /// Generator and assistant share one completion client.
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>, client: Arc<dyn CompletionClient>) -> Self {
        let sampling = config.model.sampling.clone();
        let deadline = config.model.timeout;

        Self {
            generator: ItineraryGenerator::new(client.clone(), sampling.clone(), deadline),
            assistant: TravelAssistant::new(client, sampling, deadline),
            store,
            config,
        }
    }
}
