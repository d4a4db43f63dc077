// src/api/handlers/mod.rs
pub mod cache_handler;
pub mod kiosk_handler;
pub mod member_handler;
pub mod stats_handler;
pub mod system_handler;
pub mod visit_handler;
