// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod o3as_repository;
