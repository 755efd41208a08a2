use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    foods,
    glucose::GlucoseStatus,
    predictions::{
        dto::{
            CalendarDay, Pagination, PhotoParams, PredictRequest, PredictionListItem,
            PredictionResponse,
        },
        repo::PredictionRow,
        services::{aggregate_calendar, month_bounds, run_prediction, MealSource},
    },
    state::AppState,
    vision,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/predictions", get(list_predictions))
        .route("/predictions/calendar/:year/:month", get(calendar_month))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict_text))
        .route("/predict/photo", post(predict_photo))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

// --- handlers ---

#[instrument(skip(state, payload))]
pub async fn predict_text(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<PredictRequest>,
) -> Result<(StatusCode, Json<PredictionResponse>), (StatusCode, String)> {
    if foods::services::split_meal_text(&payload.meal_text).is_empty() {
        return Err((StatusCode::BAD_REQUEST, "meal_text is required".into()));
    }

    let resolved = foods::services::resolve_meal_text(&state.db, &payload.meal_text)
        .await
        .map_err(internal)?;
    if resolved.matched.is_empty() {
        warn!(%user_id, meal_text = %payload.meal_text, "no meal terms matched");
    }

    let (row, status) = run_prediction(
        &state,
        user_id,
        resolved.nutrients,
        Some(payload.meal_text.clone()),
        MealSource::Text,
        payload.has_diabetes,
        payload.model,
    )
    .await
    .map_err(internal)?;

    Ok((
        StatusCode::CREATED,
        Json(PredictionResponse {
            id: row.id,
            predicted_mgdl: row.predicted_mgdl,
            status,
            nutrients: row.nutrients(),
            matched: resolved.matched,
            unmatched: resolved.unmatched,
            created_at: row.created_at,
        }),
    ))
}

/// POST /predict/photo (multipart): one meal photo under `photo` (or
/// `files`/`files[]`), forwarded to the vision endpoint.
#[instrument(skip(state, mp))]
pub async fn predict_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<PhotoParams>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<PredictionResponse>), (StatusCode, String)> {
    let photo = first_photo_field(&mut mp)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let Some((data, content_type)) = photo else {
        return Err((StatusCode::BAD_REQUEST, "photo is required".into()));
    };

    let resp = state
        .vision
        .analyze_photo(data, &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "vision inference failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let nutrients = vision::parse::nutrients_from_response(&resp);
    let label = resp
        .get("label")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let (row, status) = run_prediction(
        &state,
        user_id,
        nutrients,
        label,
        MealSource::Photo,
        params.has_diabetes,
        params.model,
    )
    .await
    .map_err(internal)?;

    Ok((
        StatusCode::CREATED,
        Json(PredictionResponse {
            id: row.id,
            predicted_mgdl: row.predicted_mgdl,
            status,
            nutrients: row.nutrients(),
            matched: Vec::new(),
            unmatched: Vec::new(),
            created_at: row.created_at,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_predictions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<PredictionListItem>>, (StatusCode, String)> {
    let (limit, offset) = p.normalized();
    let rows = PredictionRow::list_by_user(&state.db, user_id, limit, offset)
        .await
        .map_err(internal)?;
    let items = rows
        .into_iter()
        .map(|r| {
            let status = GlucoseStatus::from_label(&r.status)
                .unwrap_or_else(|| GlucoseStatus::classify(r.predicted_mgdl));
            PredictionListItem {
                id: r.id,
                meal_description: r.meal_description,
                source: r.source,
                predicted_mgdl: r.predicted_mgdl,
                status,
                created_at: r.created_at,
            }
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn calendar_month(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((year, month)): Path<(i32, u8)>,
) -> Result<Json<Vec<CalendarDay>>, (StatusCode, String)> {
    let (from, to) =
        month_bounds(year, month).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let rows = PredictionRow::list_between(&state.db, user_id, from, to)
        .await
        .map_err(internal)?;

    Ok(Json(aggregate_calendar(&rows)))
}

/// First field named `photo` (or `files`/`files[]`), with its content type.
/// Decode errors propagate so a corrupt body is reported as such rather
/// than as a missing photo.
async fn first_photo_field(
    mp: &mut Multipart,
) -> Result<Option<(bytes::Bytes, String)>, axum::extract::multipart::MultipartError> {
    while let Some(field) = mp.next_field().await? {
        let name = field.name().map(|s| s.to_string());
        if matches!(name.as_deref(), Some("photo") | Some("files") | Some("files[]")) {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field.bytes().await?;
            return Ok(Some((data, content_type)));
        }
    }
    Ok(None)
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    fn multipart_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .header(
                "content-type",
                "multipart/form-data; boundary=MEALBOUNDARY",
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn photo_field_is_extracted_with_content_type() {
        let req = multipart_request(
            "--MEALBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"lunch.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n\
             jpeg-bytes\r\n\
             --MEALBOUNDARY--\r\n",
        );
        let mut mp = Multipart::from_request(req, &()).await.unwrap();
        let (data, content_type) = first_photo_field(&mut mp).await.unwrap().unwrap();
        assert_eq!(content_type, "image/jpeg");
        assert_eq!(&data[..], b"jpeg-bytes");
    }

    #[tokio::test]
    async fn unrelated_fields_yield_none() {
        let req = multipart_request(
            "--MEALBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"notes\"\r\n\r\n\
             just text\r\n\
             --MEALBOUNDARY--\r\n",
        );
        let mut mp = Multipart::from_request(req, &()).await.unwrap();
        assert!(first_photo_field(&mut mp).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_body_surfaces_a_decode_error() {
        // Stream ends without the closing boundary
        let req = multipart_request(
            "--MEALBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"photo\"\r\n\r\n\
             partial",
        );
        let mut mp = Multipart::from_request(req, &()).await.unwrap();
        assert!(first_photo_field(&mut mp).await.is_err());
    }
}
