// src/api/dto/visit_dto.rs
use crate::service::visit_service::SeriesWindow;
use serde::{Deserialize, Serialize};
use validator::Validate;

// --- Request DTOs ---

/// POST /visits
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct RecordVisitDto {
    pub category: Option<String>,
    pub service_type: Option<String>,
}

/// GET /visits?start=&end=
#[derive(Deserialize, Serialize, Debug)]
pub struct VisitRangeQuery {
    pub start: String,
    pub end: String,
}

/// GET /visits/series は start/end か window のどちらか
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct VisitSeriesQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub window: Option<SeriesWindow>,
}

/// POST /visits/purge
#[derive(Deserialize, Serialize, Debug, Default, Validate)]
pub struct PurgeVisitsDto {
    #[validate(range(min = 0, max = 3650, message = "Retention days must be between 0 and 3650"))]
    pub retention_days: Option<i64>,
}
