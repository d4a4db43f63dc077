// src/config/mod.rs
pub mod app;

pub use app::{AppConfig, VisitConfig, WeatherConfig, MAX_RETENTION_DAYS};
