pub mod api;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod observability;
pub mod rules;
pub mod schedule;
pub mod settlement;
pub mod types;
