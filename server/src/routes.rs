//! HTTP routes.

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use usdrub_rates::{CacheStats, MetricsSnapshot};

use crate::state::AppState;

mod urls {
    pub const ROOT: &str = "/";
    pub const HISTORY: &str = "/history";
    pub const METRICS: &str = "/metrics";
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    course: f64,
    date: String,
}

/// Fetch pipeline figures served on `/metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub fetch: MetricsSnapshot,
    pub cache: CacheStats,
    pub hit_ratio: f64,
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(urls::ROOT, get(index))
        .route(urls::HISTORY, get(history))
        .route(urls::METRICS, get(metrics))
        .with_state(state)
}

/// Rate page. A failed query degrades to a zero rate or an empty date.
async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let course = state.service.get_usd_rate().await.unwrap_or_else(|e| {
        error!(error = %e, "Error getting USD rate");
        0.0
    });

    let date = state.service.get_rate_date().await.unwrap_or_else(|e| {
        error!(error = %e, "Error getting rate date");
        String::new()
    });

    IndexTemplate { course, date }
        .render()
        .map(Html)
        .map_err(|e| {
            error!(error = %e, "Error rendering index page");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn history(State(state): State<AppState>) -> Response {
    match state.service.get_usd_rate_history().await {
        Ok(points) => Json(points).into_response(),
        Err(e) => {
            error!(error = %e, "Error getting rate history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let fetcher = state.service.fetcher();
    let fetch = fetcher.metrics().snapshot();

    Json(MetricsResponse {
        fetch,
        cache: fetcher.cache().stats(),
        hit_ratio: fetch.hit_ratio(),
    })
}
