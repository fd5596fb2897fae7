pub mod dto;
pub mod errors;
pub mod handlers;
pub mod html;
pub mod pages;

use axum::{
    routing::{delete, get, post},
    Router,
};
use chrono::FixedOffset;
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{ingest::IngestService, notifier::Notifier};
use handlers::ApiDoc;

/// Shared by every handler. Cloning is cheap: the pool and the notifier are
/// both reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ingest: IngestService,
    /// Local offset used for calendar-day filters and displayed times.
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(pool: PgPool, notifier: Notifier, utc_offset: FixedOffset) -> Self {
        Self {
            ingest: IngestService::new(pool.clone(), notifier),
            pool,
            utc_offset,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/readings", post(handlers::create_reading))
        .route(
            "/api/fridges",
            get(handlers::list_fridges).post(handlers::create_fridge),
        )
        .route("/api/fridges/{fridge_id}", delete(handlers::delete_fridge))
        .route("/", get(pages::fridge_list))
        .route("/fridges", get(pages::fridge_list))
        .route("/fridges/{fridge_id}", get(pages::fridge_history))
        .route("/daily", get(pages::daily_log))
        .route("/emergencies", get(pages::emergency_log))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
