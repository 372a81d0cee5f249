// Ozone charting core - group settings, request cache and series formatting
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
