// carwash-backend/src/domain/mod.rs
pub mod daily_visit_model;
pub mod loyalty_member_model;
pub mod member;
pub mod member_model;
pub mod prepaid_member_model;
pub mod visit_category;
