pub mod config;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod services;
pub mod table;
