use anyhow::Context;
use time::{Date, Month, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::glucose::{
    estimate_post_meal_glucose, Gender, GlucoseModel, GlucoseStatus, ModelKind, NutrientVector,
    UserFactors,
};
use crate::predictions::dto::CalendarDay;
use crate::predictions::repo::PredictionRow;
use crate::state::AppState;

/// How the meal's nutrients were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealSource {
    Text,
    Photo,
}

impl MealSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MealSource::Text => "text",
            MealSource::Photo => "photo",
        }
    }
}

/// Derive user factors from the stored profile, run the estimator, classify
/// and persist. The core stays pure; this is the only place that joins it to
/// profile data and the database.
pub async fn run_prediction(
    state: &AppState,
    user_id: Uuid,
    nutrients: NutrientVector,
    meal_description: Option<String>,
    source: MealSource,
    has_diabetes: bool,
    model: Option<ModelKind>,
) -> anyhow::Result<(PredictionRow, GlucoseStatus)> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .context("user not found")?;
    let gender = Gender::from_label(&user.gender)
        .with_context(|| format!("unknown gender label '{}'", user.gender))?;

    let factors = UserFactors::derive(
        gender,
        user.birth_year,
        user.height_cm,
        user.weight_kg,
        OffsetDateTime::now_utc().year(),
    );

    let kind = model.unwrap_or(state.config.default_model);
    let glucose_model = GlucoseModel::preset(kind);
    let predicted = estimate_post_meal_glucose(&glucose_model, &nutrients, Some(&factors), has_diabetes);
    let status = GlucoseStatus::classify(predicted);

    let row = PredictionRow::insert(
        &state.db,
        user_id,
        meal_description.as_deref(),
        source.as_str(),
        &nutrients,
        predicted,
        status.as_str(),
    )
    .await?;

    info!(
        %user_id,
        source = source.as_str(),
        model = ?kind,
        predicted_mgdl = predicted,
        status = status.as_str(),
        "prediction stored"
    );
    Ok((row, status))
}

/// UTC bounds [start of month, start of next month) for history queries.
pub fn month_bounds(year: i32, month: u8) -> anyhow::Result<(OffsetDateTime, OffsetDateTime)> {
    let month = Month::try_from(month).context("month out of range")?;
    let start = Date::from_calendar_date(year, month, 1)?;
    let next = match month {
        Month::December => Date::from_calendar_date(year + 1, Month::January, 1)?,
        _ => Date::from_calendar_date(year, month.next(), 1)?,
    };
    Ok((start.midnight().assume_utc(), next.midnight().assume_utc()))
}

/// Collapse chronologically ordered rows into per-day calendar cells,
/// keeping the worst severity band per day.
pub fn aggregate_calendar(rows: &[PredictionRow]) -> Vec<CalendarDay> {
    let mut days: Vec<CalendarDay> = Vec::new();
    for row in rows {
        let date = row.created_at.date();
        let status = GlucoseStatus::from_label(&row.status)
            .unwrap_or_else(|| GlucoseStatus::classify(row.predicted_mgdl));
        match days.last_mut() {
            Some(day) if day.date == date => {
                day.count += 1;
                if status > day.worst_status {
                    day.worst_status = status;
                }
            }
            _ => days.push(CalendarDay {
                date,
                count: 1,
                worst_status: status,
            }),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row(at: OffsetDateTime, predicted: i32, status: &str) -> PredictionRow {
        PredictionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            meal_description: None,
            source: "text".into(),
            total_carb_g: 0.0,
            sugar_g: 0.0,
            protein_g: 0.0,
            total_fat_g: 0.0,
            calories_kcal: 0.0,
            predicted_mgdl: predicted,
            status: status.into(),
            created_at: at,
        }
    }

    #[test]
    fn month_bounds_mid_year_and_december() {
        let (from, to) = month_bounds(2026, 8).unwrap();
        assert_eq!(from, datetime!(2026-08-01 0:00 UTC));
        assert_eq!(to, datetime!(2026-09-01 0:00 UTC));

        let (from, to) = month_bounds(2026, 12).unwrap();
        assert_eq!(from, datetime!(2026-12-01 0:00 UTC));
        assert_eq!(to, datetime!(2027-01-01 0:00 UTC));

        assert!(month_bounds(2026, 13).is_err());
        assert!(month_bounds(2026, 0).is_err());
    }

    #[test]
    fn calendar_keeps_worst_status_per_day() {
        let rows = vec![
            row(datetime!(2026-08-01 08:00 UTC), 120, "normal"),
            row(datetime!(2026-08-01 13:00 UTC), 210, "danger"),
            row(datetime!(2026-08-01 19:00 UTC), 150, "pre-diabetic"),
            row(datetime!(2026-08-03 12:00 UTC), 135, "normal"),
        ];
        let days = aggregate_calendar(&rows);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].count, 3);
        assert_eq!(days[0].worst_status, GlucoseStatus::Danger);
        assert_eq!(days[1].count, 1);
        assert_eq!(days[1].worst_status, GlucoseStatus::Normal);
    }

    #[test]
    fn calendar_reclassifies_unknown_status_labels() {
        let rows = vec![row(datetime!(2026-08-02 10:00 UTC), 205, "bogus")];
        let days = aggregate_calendar(&rows);
        assert_eq!(days[0].worst_status, GlucoseStatus::Danger);
    }

    #[test]
    fn empty_history_gives_empty_calendar() {
        assert!(aggregate_calendar(&[]).is_empty());
    }
}
