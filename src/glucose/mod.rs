mod model;
mod status;

pub use model::{
    clamp_round, estimate_post_meal_glucose, Baseline, DeltaModel, DeltaWeights, Gender,
    GlucoseModel, HybridModel, ModelKind, NutrientVector, RegressionTable, UserFactors,
    GLUCOSE_MAX_MGDL, GLUCOSE_MIN_MGDL,
};
pub use status::GlucoseStatus;
