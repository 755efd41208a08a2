use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::glucose::{GlucoseStatus, ModelKind, NutrientVector};

/// Body for a typed-meal prediction. The diabetes flag comes from the UI
/// toggle per request, not from the stored profile.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub meal_text: String,
    #[serde(default)]
    pub has_diabetes: bool,
    #[serde(default)]
    pub model: Option<ModelKind>,
}

/// Query params for the photo variant (the body is multipart).
#[derive(Debug, Deserialize)]
pub struct PhotoParams {
    #[serde(default)]
    pub has_diabetes: bool,
    #[serde(default)]
    pub model: Option<ModelKind>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub id: Uuid,
    pub predicted_mgdl: i32,
    pub status: GlucoseStatus,
    pub nutrients: NutrientVector,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct PredictionListItem {
    pub id: Uuid,
    pub meal_description: Option<String>,
    pub source: String,
    pub predicted_mgdl: i32,
    pub status: GlucoseStatus,
    pub created_at: OffsetDateTime,
}

/// One calendar cell: how many predictions landed on the day and the worst
/// severity band among them (drives the dot color client-side).
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: Date,
    pub count: i64,
    pub worst_status: GlucoseStatus,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// (limit, offset) safe to bind into `LIMIT $n OFFSET $m`. Postgres
    /// rejects a negative OFFSET at execution, so both values are clamped
    /// here instead of surfacing a 500 for a well-typed query string.
    pub fn normalized(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}
