pub mod analysis;
pub mod api_connection;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod fallback;
pub mod logging;
pub mod models;
pub mod plan_generator;
pub mod preferences;
pub mod reconciler;
pub mod report_parser;
