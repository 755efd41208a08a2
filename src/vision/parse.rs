use serde_json::Value;

use crate::glucose::NutrientVector;

/// Build a nutrient vector from a vision-model response.
///
/// The model reports quantities either at the top level or under a
/// `nutrients` object. Missing, non-numeric and non-finite fields all
/// become 0.0 here, so the estimator never sees a NaN.
pub fn nutrients_from_response(resp: &Value) -> NutrientVector {
    let body = resp.get("nutrients").unwrap_or(resp);
    NutrientVector {
        total_carb_g: num_or_zero(body, "total_carb"),
        sugar_g: num_or_zero(body, "sugar"),
        protein_g: num_or_zero(body, "protein"),
        total_fat_g: num_or_zero(body, "total_fat"),
        calories_kcal: num_or_zero(body, "calories"),
    }
}

fn num_or_zero(body: &Value, key: &str) -> f64 {
    let parsed = match body.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}
