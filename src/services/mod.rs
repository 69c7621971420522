pub mod account_service;
pub mod assistant_service;
pub mod catalog_service;
pub mod itinerary_assembler;
pub mod itinerary_generation_service;
pub mod model_client;
pub mod prompt_builder;
pub mod response_validator;
