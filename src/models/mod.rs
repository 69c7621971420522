pub mod assistant;
pub mod catalog;
pub mod itinerary;
pub mod trip;
pub mod user;
