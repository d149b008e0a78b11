//! Channel analytics engine: metrics, content patterns, posting
//! calendars, trend forecasts, title A/B simulation and a data-grounded
//! chatbot, served over an HTTP API.

pub mod api;
pub mod config;
pub mod http;
pub mod llm;
pub mod models;
pub mod services;
pub mod sources;
pub mod store;
