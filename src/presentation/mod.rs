// Presentation layer - JSON HTTP surface over the charting core
pub mod app_state;
pub mod handlers;
