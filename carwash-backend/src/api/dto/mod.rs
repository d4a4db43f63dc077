// src/api/dto/mod.rs
pub mod kiosk_dto;
pub mod member_dto;
pub mod visit_dto;
