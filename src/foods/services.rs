use sqlx::PgPool;
use tracing::debug;

use crate::foods::repo::FoodRecord;
use crate::glucose::NutrientVector;

/// Outcome of matching typed meal text against the food table. Unmatched
/// terms contribute nothing to the vector; the caller reports them back so
/// the client can tell the user what was ignored.
#[derive(Debug)]
pub struct ResolvedMeal {
    pub nutrients: NutrientVector,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Split typed meal text into lookup terms: comma-separated, trimmed,
/// empties dropped.
pub fn split_meal_text(text: &str) -> Vec<String> {
    text.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Resolve meal text to a summed nutrient vector.
pub async fn resolve_meal_text(db: &PgPool, text: &str) -> anyhow::Result<ResolvedMeal> {
    let mut nutrients = NutrientVector::default();
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for term in split_meal_text(text) {
        match FoodRecord::best_match(db, &term).await? {
            Some(food) => {
                debug!(%term, food = %food.name, "meal term matched");
                nutrients = nutrients.add(&food.nutrients());
                matched.push(food.name);
            }
            None => {
                debug!(%term, "meal term unmatched");
                unmatched.push(term);
            }
        }
    }

    Ok(ResolvedMeal {
        nutrients,
        matched,
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_and_drops_empties() {
        let terms = split_meal_text(" White Rice ,  chicken salad,, ");
        assert_eq!(terms, vec!["white rice".to_string(), "chicken salad".to_string()]);
    }

    #[test]
    fn split_of_blank_text_is_empty() {
        assert!(split_meal_text("").is_empty());
        assert!(split_meal_text("  , ,").is_empty());
    }
}
