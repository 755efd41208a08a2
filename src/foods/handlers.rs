use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::jwt::AuthUser,
    foods::{
        dto::{FoodItem, SearchParams},
        repo::FoodRecord,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/foods/search", get(search_foods))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(p): Query<SearchParams>,
) -> Result<Json<Vec<FoodItem>>, (StatusCode, String)> {
    if p.q.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "q is required".into()));
    }
    let limit = p.limit.clamp(1, 100);

    let rows = FoodRecord::search(&state.db, &p.q, limit)
        .await
        .map_err(|e| {
            error!(error = %e, q = %p.q, "food search failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(rows.into_iter().map(FoodItem::from).collect()))
}
