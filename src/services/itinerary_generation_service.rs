use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::SamplingConfig;
use crate::models::itinerary::{GenerationResult, TripRequest};
use crate::services::model_client::{complete_within, CompletionClient, CompletionRequest, ModelError};
use crate::services::prompt_builder::{self, PlanError, SYSTEM_INSTRUCTION};
use crate::services::response_validator;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Prompt builder -> model client -> response validator.
pub struct ItineraryGenerator {
    client: Arc<dyn CompletionClient>,
    sampling: SamplingConfig,
    deadline: Duration,
}

impl ItineraryGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, sampling: SamplingConfig, deadline: Duration) -> Self {
        Self {
            client,
            sampling,
            deadline,
        }
    }

    pub fn model(&self) -> &str {
        &self.sampling.model
    }

    /// Request validation happens before any network traffic; a request that
    /// fails it never reaches the model service.
    pub async fn generate(&self, request: &TripRequest) -> Result<GenerationResult, GenerationError> {
        let prompt = prompt_builder::build(request)?;

        info!(
            "Generating itinerary for {}, {} ({} to {}) with {}",
            request.city.as_deref().unwrap_or_default(),
            request.country.as_deref().unwrap_or_default(),
            request.start_date.as_deref().unwrap_or_default(),
            request.end_date.as_deref().unwrap_or_default(),
            self.sampling.model
        );

        let completion = CompletionRequest::new(prompt, SYSTEM_INSTRUCTION, self.sampling.clone());
        let raw_text = complete_within(self.client.as_ref(), &completion, self.deadline).await?;

        let result = response_validator::validate(&raw_text);
        match &result {
            GenerationResult::Success(itinerary) => info!(
                "Itinerary generated: {} days, {} activities",
                itinerary.days.len(),
                itinerary.activity_count()
            ),
            GenerationResult::Fallback { reason, raw_text } => warn!(
                "Model output fell back ({}), {} bytes of raw text",
                reason,
                raw_text.len()
            ),
        }

        Ok(result)
    }
}
