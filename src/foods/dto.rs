use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::foods::repo::FoodRecord;
use crate::glucose::NutrientVector;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}
fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub nutrients: NutrientVector,
}

impl From<FoodRecord> for FoodItem {
    fn from(f: FoodRecord) -> Self {
        let nutrients = f.nutrients();
        Self {
            id: f.id,
            name: f.name,
            nutrients,
        }
    }
}
