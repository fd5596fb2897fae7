//! Read paths over stored readings: per-fridge history, the daily log, and
//! the emergency log. All of them are newest first and paginated.

pub mod filters;
pub mod pagination;

use sqlx::PgPool;

use crate::db::models::{LogEntry, Reading};

use self::{
    filters::DateRange,
    pagination::{Page, PageWindow, HISTORY_PAGE_SIZE, LOG_PAGE_SIZE},
};

/// Readings of one fridge, 100 per page.
pub async fn fridge_history(
    pool: &PgPool,
    fridge_id: i64,
    range: DateRange,
    page: Option<&str>,
) -> Result<Page<Reading>, sqlx::Error> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM readings
        WHERE fridge_id = $1
          AND ($2::timestamptz IS NULL OR event_date >= $2)
          AND ($3::timestamptz IS NULL OR event_date <= $3)
        "#,
    )
    .bind(fridge_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_one(pool)
    .await?;

    let window = PageWindow::resolve(total, HISTORY_PAGE_SIZE, page);

    let items = sqlx::query_as::<_, Reading>(
        r#"
        SELECT id, fridge_id, sensor1_temp, sensor2_temp, humidity, air_temp,
               is_out_of_range, event_date
        FROM readings
        WHERE fridge_id = $1
          AND ($2::timestamptz IS NULL OR event_date >= $2)
          AND ($3::timestamptz IS NULL OR event_date <= $3)
        ORDER BY event_date DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(fridge_id)
    .bind(range.start)
    .bind(range.end)
    .bind(window.per_page)
    .bind(window.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page { items, window })
}

/// Readings of every fridge in `range`, 20 per page.
pub async fn daily_log(
    pool: &PgPool,
    range: DateRange,
    page: Option<&str>,
) -> Result<Page<LogEntry>, sqlx::Error> {
    log_page(pool, range, false, page).await
}

/// Out-of-range readings of every fridge in `range`, 20 per page.
pub async fn emergency_log(
    pool: &PgPool,
    range: DateRange,
    page: Option<&str>,
) -> Result<Page<LogEntry>, sqlx::Error> {
    log_page(pool, range, true, page).await
}

async fn log_page(
    pool: &PgPool,
    range: DateRange,
    only_out_of_range: bool,
    page: Option<&str>,
) -> Result<Page<LogEntry>, sqlx::Error> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM readings
        WHERE ($1::timestamptz IS NULL OR event_date >= $1)
          AND ($2::timestamptz IS NULL OR event_date <= $2)
          AND (NOT $3::boolean OR is_out_of_range)
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .bind(only_out_of_range)
    .fetch_one(pool)
    .await?;

    let window = PageWindow::resolve(total, LOG_PAGE_SIZE, page);

    let items = sqlx::query_as::<_, LogEntry>(
        r#"
        SELECT r.id, r.fridge_id, f.name AS fridge_name,
               r.sensor1_temp, r.sensor2_temp, r.humidity, r.air_temp,
               r.is_out_of_range, r.event_date
        FROM readings r
        JOIN fridges f ON f.id = r.fridge_id
        WHERE ($1::timestamptz IS NULL OR r.event_date >= $1)
          AND ($2::timestamptz IS NULL OR r.event_date <= $2)
          AND (NOT $3::boolean OR r.is_out_of_range)
        ORDER BY r.event_date DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .bind(only_out_of_range)
    .bind(window.per_page)
    .bind(window.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page { items, window })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
