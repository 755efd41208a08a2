use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::glucose::NutrientVector;

/// Persisted prediction: the resolved nutrients, the clamped estimate and
/// its status label at the time of computation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_description: Option<String>,
    pub source: String,
    pub total_carb_g: f64,
    pub sugar_g: f64,
    pub protein_g: f64,
    pub total_fat_g: f64,
    pub calories_kcal: f64,
    pub predicted_mgdl: i32,
    pub status: String,
    pub created_at: OffsetDateTime,
}

const PREDICTION_COLUMNS: &str = "id, user_id, meal_description, source, total_carb_g, sugar_g, \
     protein_g, total_fat_g, calories_kcal, predicted_mgdl, status, created_at";

impl PredictionRow {
    pub fn nutrients(&self) -> NutrientVector {
        NutrientVector {
            total_carb_g: self.total_carb_g,
            sugar_g: self.sugar_g,
            protein_g: self.protein_g,
            total_fat_g: self.total_fat_g,
            calories_kcal: self.calories_kcal,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        meal_description: Option<&str>,
        source: &str,
        nutrients: &NutrientVector,
        predicted_mgdl: i32,
        status: &str,
    ) -> anyhow::Result<PredictionRow> {
        let row = sqlx::query_as::<_, PredictionRow>(&format!(
            r#"
            INSERT INTO predictions
                (user_id, meal_description, source, total_carb_g, sugar_g,
                 protein_g, total_fat_g, calories_kcal, predicted_mgdl, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PREDICTION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(meal_description)
        .bind(source)
        .bind(nutrients.total_carb_g)
        .bind(nutrients.sugar_g)
        .bind(nutrients.protein_g)
        .bind(nutrients.total_fat_g)
        .bind(nutrients.calories_kcal)
        .bind(predicted_mgdl)
        .bind(status)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<PredictionRow>> {
        let rows = sqlx::query_as::<_, PredictionRow>(&format!(
            r#"
            SELECT {PREDICTION_COLUMNS}
            FROM predictions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Rows in [from, to), oldest first, for calendar aggregation.
    pub async fn list_between(
        db: &PgPool,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> anyhow::Result<Vec<PredictionRow>> {
        let rows = sqlx::query_as::<_, PredictionRow>(&format!(
            r#"
            SELECT {PREDICTION_COLUMNS}
            FROM predictions
            WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at ASC
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
