use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidateEmail, ValidationError};

/// 月額会員ID（コース文字 + 3桁）
pub static SUBSCRIPTION_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[BDU]\d{3}$").unwrap());

/// ポイントカード会員ID（L + 3〜5桁）
pub static LOYALTY_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^L\d{3,5}$").unwrap());

/// 回数券会員ID（コース文字 + B + 3〜5桁）
pub static PREPAID_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[BDU]B\d{3,5}$").unwrap());

/// キオスクで受け付けるコード
pub static KIOSK_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([BDUL]\d{3,5}|[BDU]B\d{3,5})$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// 空白のみの文字列を拒否
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// コース文字（B/D/U）
pub fn validate_service_letter(value: &str) -> Result<(), ValidationError> {
    if matches!(value, "B" | "D" | "U") {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_service_type");
        error.message = Some("must be one of B, D, U".into());
        Err(error)
    }
}

pub fn validate_kiosk_code(code: &str) -> Result<(), ValidationError> {
    if KIOSK_CODE_REGEX.is_match(&code.trim().to_ascii_uppercase()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_kiosk_code");
        error.message = Some("must look like B101, L1001 or DB2001".into());
        Err(error)
    }
}
