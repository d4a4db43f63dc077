// tests/integration/mod.rs

#[path = "../common/mod.rs"]
mod common;

pub mod api_tests;
pub mod kiosk_tests;
pub mod member_cache_tests;
pub mod weather_tests;
