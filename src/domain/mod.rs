// Domain layer - Types and pure functions of the charting core
pub mod cache;
pub mod chart;
pub mod error;
pub mod model_group;
pub mod palette;
pub mod plot;
pub mod statistics;
