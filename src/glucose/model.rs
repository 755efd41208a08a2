use serde::{Deserialize, Serialize};

/// Lower clamp bound for a reported prediction, mg/dL.
pub const GLUCOSE_MIN_MGDL: f64 = 80.0;
/// Upper clamp bound for a reported prediction, mg/dL.
pub const GLUCOSE_MAX_MGDL: f64 = 250.0;

/// Macronutrient quantities attributed to one logged meal.
///
/// Inputs are expected non-negative; the formulas do not reject negatives.
/// Callers that parse external data (vision responses, food rows) coerce
/// missing or non-finite fields to 0.0 before building one of these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientVector {
    #[serde(default)]
    pub total_carb_g: f64,
    #[serde(default)]
    pub sugar_g: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub total_fat_g: f64,
    #[serde(default)]
    pub calories_kcal: f64,
}

impl NutrientVector {
    pub fn add(&self, other: &NutrientVector) -> NutrientVector {
        NutrientVector {
            total_carb_g: self.total_carb_g + other.total_carb_g,
            sugar_g: self.sugar_g + other.sugar_g,
            protein_g: self.protein_g + other.protein_g,
            total_fat_g: self.total_fat_g + other.total_fat_g,
            calories_kcal: self.calories_kcal + other.calories_kcal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Gender term used by the linear tables: male = 1, female = 0.
    pub fn bit(self) -> f64 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => 0.0,
        }
    }

    pub fn from_label(s: &str) -> Option<Gender> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Biometric terms derived fresh per prediction, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UserFactors {
    pub age_years: f64,
    pub bmi: f64,
    pub gender: Gender,
}

impl UserFactors {
    /// Age from birth year, BMI from height/weight. A zero or negative
    /// height yields BMI 0 rather than a division blow-up.
    pub fn derive(
        gender: Gender,
        birth_year: i32,
        height_cm: f64,
        weight_kg: f64,
        current_year: i32,
    ) -> UserFactors {
        let age_years = (current_year - birth_year).max(0) as f64;
        let bmi = if height_cm > 0.0 {
            let h_m = height_cm / 100.0;
            weight_kg / (h_m * h_m)
        } else {
            0.0
        };
        UserFactors {
            age_years,
            bmi,
            gender,
        }
    }
}

impl Default for UserFactors {
    fn default() -> Self {
        UserFactors {
            age_years: 0.0,
            bmi: 0.0,
            gender: Gender::Female,
        }
    }
}

/// Per-nutrient coefficients for the delta model, used both as the
/// normalization divisors and as the correlation weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeltaWeights {
    pub carb: f64,
    pub sugar: f64,
    pub protein: f64,
    pub fat: f64,
}

/// Starting glucose before the meal delta is added.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    Fixed(f64),
    Linear {
        intercept: f64,
        gender: f64,
        age: f64,
        bmi: f64,
    },
}

impl Baseline {
    fn value(&self, factors: Option<&UserFactors>) -> f64 {
        match *self {
            Baseline::Fixed(v) => v,
            Baseline::Linear {
                intercept,
                gender,
                age,
                bmi,
            } => {
                let f = factors.copied().unwrap_or_default();
                intercept + gender * f.gender.bit() + age * f.age_years + bmi * f.bmi
            }
        }
    }
}

/// Earliest model variant: normalized, weighted nutrient sum scaled into a
/// mg/dL delta on top of a baseline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeltaModel {
    pub divisors: DeltaWeights,
    pub weights: DeltaWeights,
    pub scale: f64,
    pub baseline: Baseline,
}

impl DeltaModel {
    /// Default coefficient table.
    pub fn baseline_preset() -> DeltaModel {
        DeltaModel {
            divisors: DeltaWeights {
                carb: 10.0,
                sugar: 5.0,
                protein: 5.0,
                fat: 1.0,
            },
            weights: DeltaWeights {
                carb: 0.20,
                sugar: 0.17,
                protein: 0.13,
                fat: 0.11,
            },
            scale: 10.0,
            baseline: Baseline::Fixed(100.0),
        }
    }

    /// Meal-attributable delta before baseline and clamping. Non-decreasing
    /// in carbs and sugar for non-negative weights.
    pub fn unclamped_delta(&self, n: &NutrientVector) -> f64 {
        let weighted = (n.total_carb_g / self.divisors.carb) * self.weights.carb
            + (n.sugar_g / self.divisors.sugar) * self.weights.sugar
            + (n.protein_g / self.divisors.protein) * self.weights.protein
            + (n.total_fat_g / self.divisors.fat) * self.weights.fat;
        weighted * self.scale
    }

    pub fn predict(&self, n: &NutrientVector, factors: Option<&UserFactors>) -> i32 {
        clamp_round(self.baseline.value(factors) + self.unclamped_delta(n))
    }
}

/// One regression table of the hybrid model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegressionTable {
    pub intercept: f64,
    pub gender: f64,
    pub age: f64,
    pub bmi: f64,
    pub calorie: f64,
    pub carb: f64,
    pub protein: f64,
    pub fat: f64,
}

impl RegressionTable {
    fn predict_raw(&self, n: &NutrientVector, f: &UserFactors) -> f64 {
        self.intercept
            + self.gender * f.gender.bit()
            + self.age * f.age_years
            + self.bmi * f.bmi
            + self.calorie * n.calories_kcal
            + self.carb * n.total_carb_g
            + self.protein * n.protein_g
            + self.fat * n.total_fat_g
    }
}

/// Later model variant: one of two fixed regression tables, selected by the
/// pre-existing-diabetes flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HybridModel {
    pub non_diabetic: RegressionTable,
    pub diabetic: RegressionTable,
}

impl HybridModel {
    pub fn regression_preset() -> HybridModel {
        HybridModel {
            non_diabetic: RegressionTable {
                intercept: 85.0,
                gender: 4.0,
                age: 0.25,
                bmi: 0.9,
                calorie: 0.015,
                carb: 0.45,
                protein: 0.12,
                fat: 0.08,
            },
            diabetic: RegressionTable {
                intercept: 110.0,
                gender: 5.0,
                age: 0.4,
                bmi: 1.3,
                calorie: 0.02,
                carb: 0.8,
                protein: 0.18,
                fat: 0.12,
            },
        }
    }

    pub fn predict(
        &self,
        n: &NutrientVector,
        factors: Option<&UserFactors>,
        has_diabetes: bool,
    ) -> i32 {
        let table = if has_diabetes {
            &self.diabetic
        } else {
            &self.non_diabetic
        };
        let f = factors.copied().unwrap_or_default();
        clamp_round(table.predict_raw(n, &f))
    }
}

/// Which preset a request or the config selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Baseline,
    Hybrid,
}

impl ModelKind {
    pub fn from_label(s: &str) -> Option<ModelKind> {
        match s {
            "baseline" => Some(ModelKind::Baseline),
            "hybrid" => Some(ModelKind::Hybrid),
            _ => None,
        }
    }
}

/// A fully-parameterized estimator. Coefficient tables are data, so revised
/// weight sets are new values of these structs, not new function bodies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum GlucoseModel {
    Delta(DeltaModel),
    Hybrid(HybridModel),
}

impl GlucoseModel {
    pub fn preset(kind: ModelKind) -> GlucoseModel {
        match kind {
            ModelKind::Baseline => GlucoseModel::Delta(DeltaModel::baseline_preset()),
            ModelKind::Hybrid => GlucoseModel::Hybrid(HybridModel::regression_preset()),
        }
    }
}

/// Clamp to [80, 250] mg/dL and round to the nearest integer.
pub fn clamp_round(raw: f64) -> i32 {
    raw.clamp(GLUCOSE_MIN_MGDL, GLUCOSE_MAX_MGDL).round() as i32
}

/// Predict post-meal glucose in mg/dL, clamped to [80, 250].
///
/// Pure and deterministic; `factors` defaults to all-zero terms for models
/// that use them, and `has_diabetes` only matters to the hybrid model.
pub fn estimate_post_meal_glucose(
    model: &GlucoseModel,
    nutrients: &NutrientVector,
    factors: Option<&UserFactors>,
    has_diabetes: bool,
) -> i32 {
    match model {
        GlucoseModel::Delta(m) => m.predict(nutrients, factors),
        GlucoseModel::Hybrid(m) => m.predict(nutrients, factors, has_diabetes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal() -> NutrientVector {
        NutrientVector {
            total_carb_g: 50.0,
            sugar_g: 10.0,
            protein_g: 20.0,
            total_fat_g: 15.0,
            calories_kcal: 0.0,
        }
    }

    #[test]
    fn default_table_regression_value() {
        let model = DeltaModel::baseline_preset();
        // 50/10*.20 + 10/5*.17 + 20/5*.13 + 15/1*.11 = 3.51, ×10 = 35.1
        let delta = model.unclamped_delta(&meal());
        assert!((delta - 35.1).abs() < 1e-9);
        assert_eq!(model.predict(&meal(), None), 135);
    }

    #[test]
    fn zero_vector_yields_baseline() {
        let model = DeltaModel::baseline_preset();
        assert_eq!(model.predict(&NutrientVector::default(), None), 100);
    }

    #[test]
    fn extreme_meal_saturates_at_upper_clamp() {
        let model = DeltaModel::baseline_preset();
        let huge = NutrientVector {
            total_carb_g: 5000.0,
            sugar_g: 2000.0,
            protein_g: 1000.0,
            total_fat_g: 500.0,
            calories_kcal: 0.0,
        };
        assert_eq!(model.predict(&huge, None), 250);
    }

    #[test]
    fn predictions_stay_in_clamp_range() {
        let model = GlucoseModel::preset(ModelKind::Baseline);
        for carbs in [0.0, 1.0, 12.5, 80.0, 400.0, 9999.0] {
            let n = NutrientVector {
                total_carb_g: carbs,
                ..NutrientVector::default()
            };
            let v = estimate_post_meal_glucose(&model, &n, None, false);
            assert!((80..=250).contains(&v), "out of range for carbs={carbs}: {v}");
        }
    }

    #[test]
    fn deterministic_across_calls() {
        let model = GlucoseModel::preset(ModelKind::Hybrid);
        let factors = UserFactors::derive(Gender::Male, 1990, 175.0, 70.0, 2026);
        let first = estimate_post_meal_glucose(&model, &meal(), Some(&factors), false);
        for _ in 0..50 {
            assert_eq!(
                estimate_post_meal_glucose(&model, &meal(), Some(&factors), false),
                first
            );
        }
    }

    #[test]
    fn unclamped_delta_monotone_in_carbs_and_sugar() {
        let model = DeltaModel::baseline_preset();
        let mut prev = f64::MIN;
        for g in 0..200 {
            let n = NutrientVector {
                total_carb_g: g as f64,
                sugar_g: g as f64,
                protein_g: 20.0,
                total_fat_g: 15.0,
                calories_kcal: 0.0,
            };
            let d = model.unclamped_delta(&n);
            assert!(d >= prev);
            prev = d;
        }
    }

    #[test]
    fn linear_baseline_uses_factors() {
        let model = DeltaModel {
            baseline: Baseline::Linear {
                intercept: 80.0,
                gender: 6.0,
                age: 0.3,
                bmi: 0.5,
            },
            ..DeltaModel::baseline_preset()
        };
        let factors = UserFactors {
            age_years: 40.0,
            bmi: 24.0,
            gender: Gender::Male,
        };
        // 80 + 6 + 12 + 12 = 110
        assert_eq!(model.predict(&NutrientVector::default(), Some(&factors)), 110);
        // Missing factors fall back to all-zero terms
        assert_eq!(model.predict(&NutrientVector::default(), None), 80);
    }

    #[test]
    fn hybrid_diabetic_table_predicts_higher() {
        let model = HybridModel::regression_preset();
        let factors = UserFactors::derive(Gender::Female, 1970, 165.0, 72.0, 2026);
        let n = NutrientVector {
            total_carb_g: 60.0,
            sugar_g: 15.0,
            protein_g: 25.0,
            total_fat_g: 20.0,
            calories_kcal: 550.0,
        };
        let healthy = model.predict(&n, Some(&factors), false);
        let diabetic = model.predict(&n, Some(&factors), true);
        assert!(diabetic > healthy);
        assert!((80..=250).contains(&healthy));
        assert!((80..=250).contains(&diabetic));
    }

    #[test]
    fn derive_factors_bmi_and_age() {
        let f = UserFactors::derive(Gender::Male, 1996, 180.0, 81.0, 2026);
        assert_eq!(f.age_years, 30.0);
        assert!((f.bmi - 25.0).abs() < 1e-9);

        // Degenerate height does not divide by zero
        let z = UserFactors::derive(Gender::Female, 2000, 0.0, 60.0, 2026);
        assert_eq!(z.bmi, 0.0);
    }
}
