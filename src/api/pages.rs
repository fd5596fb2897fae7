//! HTML read paths: fridge list, per-fridge history, daily log, emergencies.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Json,
};

use super::{
    dto::{DailyRecordDto, DailyRecordsResponse, LogParams},
    errors::AppError,
    html::{self, Filter},
    AppState,
};
use crate::{
    fridges,
    history::{self, filters},
};

/// The daily log answers XHR requests with JSON instead of a page.
fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// Every registered fridge, ordered by id.
#[utoipa::path(
    get,
    path = "/fridges",
    responses(
        (status = 200, description = "Fridge list page", content_type = "text/html", body = String),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pages"
)]
pub async fn fridge_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let rows = fridges::list(&state.pool, None).await?;
    Ok(Html(html::fridge_list(&rows)))
}

/// Readings of one fridge, newest first, 100 per page.
#[utoipa::path(
    get,
    path = "/fridges/{fridge_id}",
    params(
        ("fridge_id" = i64, Path, description = "Fridge id"),
        LogParams,
    ),
    responses(
        (status = 200, description = "History page", content_type = "text/html", body = String),
        (status = 404, description = "Fridge does not exist"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pages"
)]
pub async fn fridge_history(
    State(state): State<AppState>,
    Path(fridge_id): Path<i64>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let params = LogParams::from_pairs(pairs);
    let fridge = fridges::find(&state.pool, fridge_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("fridge {fridge_id} does not exist")))?;

    let start = params.start_date.as_deref();
    let end = params.end_date.as_deref();
    let range = filters::history_range(start, end, state.utc_offset);
    let page = history::fridge_history(&state.pool, fridge_id, range, params.page.as_deref()).await?;

    let query = filters::filter_query(start, end);
    let filter = Filter {
        start_date: start.unwrap_or_default(),
        end_date: end.unwrap_or_default(),
        query: &query,
    };
    Ok(Html(html::fridge_history(&fridge, &page, &filter, state.utc_offset)))
}

/// Readings of every fridge between two dates (today by default), 20 per
/// page. With `X-Requested-With: XMLHttpRequest` the current page is
/// returned as JSON.
#[utoipa::path(
    get,
    path = "/daily",
    params(LogParams),
    responses(
        (status = 200, description = "Daily log page, or its records as JSON for XHR requests", content(
            (String = "text/html"),
            (DailyRecordsResponse = "application/json"),
        )),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pages"
)]
pub async fn daily_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let params = LogParams::from_pairs(pairs);
    let tz = state.utc_offset;
    let start = params.start_date.as_deref();
    let end = params.end_date.as_deref();
    let range = filters::daily_range(start, end, filters::today(tz), tz);
    let page = history::daily_log(&state.pool, range, params.page.as_deref()).await?;

    if is_ajax(&headers) {
        let records = page
            .items
            .into_iter()
            .map(|entry| DailyRecordDto::new(entry, tz))
            .collect();
        return Ok(Json(DailyRecordsResponse { records }).into_response());
    }

    let query = filters::filter_query(start, end);
    let filter = Filter {
        start_date: start.unwrap_or_default(),
        end_date: end.unwrap_or_default(),
        query: &query,
    };
    Ok(Html(html::daily_log(&page, &filter, tz)).into_response())
}

/// Out-of-range readings of every fridge, 20 per page.
#[utoipa::path(
    get,
    path = "/emergencies",
    params(LogParams),
    responses(
        (status = 200, description = "Emergency log page", content_type = "text/html", body = String),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pages"
)]
pub async fn emergency_log(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let params = LogParams::from_pairs(pairs);
    let start = params.start_date.as_deref();
    let end = params.end_date.as_deref();
    let range = filters::emergency_range(start, end, state.utc_offset);
    let page = history::emergency_log(&state.pool, range, params.page.as_deref()).await?;

    let query = filters::filter_query(start, end);
    let filter = Filter {
        start_date: start.unwrap_or_default(),
        end_date: end.unwrap_or_default(),
        query: &query,
    };
    Ok(Html(html::emergency_log(&page, &filter, state.utc_offset)))
}
