use crate::infra::{deserialize_optional_date, AppState};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use return_tracker::error::AppError;
use return_tracker::lookup::{
    queue_listing, search_snapshot, QueueEntryView, SearchOutcome, SearchQuery,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct LookupRequest {
    pub(crate) query: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueueParams {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QueueResponse {
    pub(crate) today: NaiveDate,
    pub(crate) demo: bool,
    pub(crate) last_updated: String,
    pub(crate) entries: Vec<QueueEntryView>,
}

pub(crate) fn tracker_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/status/lookup", post(status_lookup_endpoint))
        .route("/api/v1/queue", get(queue_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Validates the query, refreshes the shared snapshot, and answers from the snapshot this request
/// retrieved.
pub(crate) async fn status_lookup_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<LookupRequest>,
) -> Result<Json<SearchOutcome>, AppError> {
    let query = SearchQuery::parse(&payload.query)?;
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());

    state
        .tracker
        .update(|tracker| (tracker.remember_search(&query), ()));
    let snapshot = state.tracker.refresh(&state.lookup, today).await?;
    Ok(Json(search_snapshot(&snapshot, &query)))
}

/// Lists the whole queue, reusing the held snapshot when it was projected for the same day.
pub(crate) async fn queue_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<QueueParams>,
) -> Result<Json<QueueResponse>, AppError> {
    let today = params.today.unwrap_or_else(|| Local::now().date_naive());

    let held = state
        .tracker
        .current()
        .snapshot()
        .filter(|snapshot| snapshot.projected_from == today);
    let snapshot = match held {
        Some(snapshot) => {
            debug!(%today, "serving queue from held snapshot");
            snapshot
        }
        None => state.tracker.refresh(&state.lookup, today).await?,
    };

    Ok(Json(QueueResponse {
        today,
        demo: snapshot.is_demo(),
        last_updated: snapshot.last_updated_label(),
        entries: queue_listing(&snapshot),
    }))
}
