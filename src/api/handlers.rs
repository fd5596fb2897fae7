use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use utoipa::OpenApi;

use super::{
    dto::{
        CreateFridgeRequest, DailyRecordDto, DailyRecordsResponse, FridgeDto, FridgeListParams,
        MessageResponse, ReadingPayload,
    },
    errors::AppError,
    pages, AppState,
};
use crate::{
    fridges::{self, NewFridge},
    validation::FieldErrors,
};

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Store one reading. Readings flagged `is_out_of_range` also raise a
/// Telegram alert; delivery of that alert never affects this response.
#[utoipa::path(
    post,
    path = "/api/readings",
    request_body = ReadingPayload,
    responses(
        (status = 201, description = "Reading stored", body = MessageResponse),
        (status = 400, description = "Invalid payload, keyed by field", body = FieldErrors),
        (status = 404, description = "Fridge does not exist"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn create_reading(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    // The alert handle is dropped: the task is detached and only logs.
    let _submission = state
        .ingest
        .submit(&payload)
        .await
        .map_err(AppError::from_ingest)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Reading saved".to_owned(),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Fridges
// ---------------------------------------------------------------------------

/// List fridges ordered by id, optionally only those at one location.
#[utoipa::path(
    get,
    path = "/api/fridges",
    params(FridgeListParams),
    responses(
        (status = 200, description = "Registered fridges", body = Vec<FridgeDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "fridges"
)]
pub async fn list_fridges(
    State(state): State<AppState>,
    Query(params): Query<FridgeListParams>,
) -> Result<Json<Vec<FridgeDto>>, AppError> {
    let rows = fridges::list(&state.pool, params.location.as_deref()).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Register a fridge.
#[utoipa::path(
    post,
    path = "/api/fridges",
    request_body = CreateFridgeRequest,
    responses(
        (status = 201, description = "Fridge created", body = FridgeDto),
        (status = 400, description = "Invalid payload, keyed by field", body = FieldErrors),
        (status = 500, description = "Internal server error"),
    ),
    tag = "fridges"
)]
pub async fn create_fridge(
    State(state): State<AppState>,
    payload: Result<Json<CreateFridgeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FridgeDto>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let fridge = NewFridge::from(request)
        .normalize()
        .map_err(AppError::Validation)?;

    let created = fridges::create(&state.pool, &fridge).await?;
    tracing::info!(fridge_id = created.id, name = %created.name, "Fridge registered");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Delete a fridge together with all of its readings.
#[utoipa::path(
    delete,
    path = "/api/fridges/{fridge_id}",
    params(("fridge_id" = i64, Path, description = "Fridge id")),
    responses(
        (status = 204, description = "Fridge and its readings deleted"),
        (status = 404, description = "Fridge does not exist"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "fridges"
)]
pub async fn delete_fridge(
    State(state): State<AppState>,
    Path(fridge_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if fridges::delete(&state.pool, fridge_id).await? {
        tracing::info!(fridge_id, "Fridge deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("fridge {fridge_id} does not exist")))
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        create_reading,
        list_fridges,
        create_fridge,
        delete_fridge,
        pages::fridge_list,
        pages::fridge_history,
        pages::daily_log,
        pages::emergency_log,
        health,
    ),
    components(schemas(
        ReadingPayload,
        MessageResponse,
        FieldErrors,
        FridgeDto,
        CreateFridgeRequest,
        DailyRecordDto,
        DailyRecordsResponse,
    )),
    tags(
        (name = "readings", description = "Telemetry ingestion"),
        (name = "fridges",  description = "Fridge registry"),
        (name = "pages",    description = "Dashboard pages"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Fridge Monitor API",
        version = "0.1.0",
        description = "Temperature telemetry, history, and alerts for refrigeration units"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
