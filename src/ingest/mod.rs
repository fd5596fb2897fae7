pub mod validator;

use serde_json::Value;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    db::models::{Fridge, Reading},
    notifier::{Notifier, NotifyError},
    validation::FieldErrors,
};

use self::validator::{ReadingDraft, ValidatedReading};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid reading: {0}")]
    Validation(#[from] FieldErrors),

    #[error("fridge {0} does not exist")]
    FridgeNotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Outcome of a successful submission.
#[derive(Debug)]
pub struct Submission {
    pub reading: Reading,
    /// Set when the reading was flagged and an alert was dispatched. The HTTP
    /// layer drops it; tests await it.
    pub alert: Option<JoinHandle<Result<(), NotifyError>>>,
}

#[derive(Debug, Clone)]
pub struct IngestService {
    pool: PgPool,
    notifier: Notifier,
}

impl IngestService {
    pub fn new(pool: PgPool, notifier: Notifier) -> Self {
        Self { pool, notifier }
    }

    /// Validates `payload`, stores one reading, and, if the client flagged it
    /// as out of range, hands an alert to the notifier.
    ///
    /// The alert is dispatched only after the insert has returned, on a
    /// detached task, so its latency or failure cannot change the outcome.
    pub async fn submit(&self, payload: &Value) -> Result<Submission, IngestError> {
        let ValidatedReading { fridge, draft } = match validator::validate(&self.pool, payload).await
        {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "Reading rejected");
                return Err(e);
            }
        };

        let reading = self.persist(&draft).await?;
        info!(
            fridge_id = reading.fridge_id,
            reading_id = %reading.id,
            is_out_of_range = reading.is_out_of_range,
            "Reading stored"
        );

        let alert = reading.is_out_of_range.then(|| {
            info!(fridge_id = fridge.id, fridge = %fridge.name, "Out-of-range reading, dispatching alert");
            self.notifier.dispatch(alert_text(&fridge, &reading))
        });

        Ok(Submission { reading, alert })
    }

    /// A fridge deleted after validation surfaces as a foreign-key violation
    /// and is reported as `FridgeNotFound`.
    async fn persist(&self, draft: &ReadingDraft) -> Result<Reading, IngestError> {
        sqlx::query_as::<_, Reading>(
            r#"
            INSERT INTO readings (fridge_id, sensor1_temp, sensor2_temp, humidity, air_temp, is_out_of_range)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, fridge_id, sensor1_temp, sensor2_temp, humidity, air_temp,
                      is_out_of_range, event_date
            "#,
        )
        .bind(draft.fridge_id)
        .bind(draft.sensor1_temp)
        .bind(draft.sensor2_temp)
        .bind(draft.humidity)
        .bind(draft.air_temp)
        .bind(draft.is_out_of_range)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                IngestError::FridgeNotFound(draft.fridge_id)
            }
            other => IngestError::Storage(other),
        })
    }
}

/// Alert body for an out-of-range reading.
pub fn alert_text(fridge: &Fridge, reading: &Reading) -> String {
    format!(
        "🚨 Out-of-range temperature in {}!\n🌡 Sensor 1: {}°C\n🌡 Sensor 2: {}°C",
        fridge.name, reading.sensor1_temp, reading.sensor2_temp
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
