// src/service/mod.rs
pub mod kiosk_service;
pub mod member_cache_service;
pub mod stats_service;
pub mod visit_service;
pub mod weather_service;
