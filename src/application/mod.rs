// Application layer - Stateful services and the repository seam
pub mod model_group_store;
pub mod ozone_repository;
pub mod request_cache;
pub mod series_formatter;
