use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::glucose::NutrientVector;

/// One food-database record with per-serving nutrient quantities.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodRecord {
    pub id: Uuid,
    pub name: String,
    pub total_carb_g: f64,
    pub sugar_g: f64,
    pub protein_g: f64,
    pub total_fat_g: f64,
    pub calories_kcal: f64,
}

const FOOD_COLUMNS: &str = "id, name, total_carb_g, sugar_g, protein_g, total_fat_g, calories_kcal";

impl FoodRecord {
    pub fn nutrients(&self) -> NutrientVector {
        NutrientVector {
            total_carb_g: self.total_carb_g,
            sugar_g: self.sugar_g,
            protein_g: self.protein_g,
            total_fat_g: self.total_fat_g,
            calories_kcal: self.calories_kcal,
        }
    }

    /// Case-insensitive substring search over food names.
    pub async fn search(db: &PgPool, term: &str, limit: i64) -> anyhow::Result<Vec<FoodRecord>> {
        let pattern = format!("%{}%", term.trim());
        let rows = sqlx::query_as::<_, FoodRecord>(&format!(
            r#"
            SELECT {FOOD_COLUMNS}
            FROM foods
            WHERE name ILIKE $1
            ORDER BY char_length(name), name
            LIMIT $2
            "#
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Best single match for one typed meal term, shortest name first so
    /// "rice" prefers "rice" over "fried rice".
    pub async fn best_match(db: &PgPool, term: &str) -> anyhow::Result<Option<FoodRecord>> {
        let mut rows = Self::search(db, term, 1).await?;
        Ok(rows.pop())
    }
}
