// src/api/dto/kiosk_dto.rs
use crate::utils::validation::validate_kiosk_code;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct KioskVisitDto {
    #[validate(custom(function = validate_kiosk_code))]
    pub code: String,
    pub service_type: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CashVisitDto {
    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: String,
}
