use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A monitored refrigeration unit. Mirrors the `fridges` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Fridge {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    /// Path or URL of a picture of the unit.
    pub image: Option<String>,
}

/// One telemetry sample. Mirrors the `readings` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub fridge_id: i64,
    /// Degrees Celsius
    pub sensor1_temp: f64,
    /// Degrees Celsius
    pub sensor2_temp: f64,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    /// Degrees Celsius
    pub air_temp: Option<f64>,
    /// Client-asserted emergency flag.
    pub is_out_of_range: bool,
    /// Assigned by the database on insert.
    pub event_date: DateTime<Utc>,
}

/// A reading joined with the name of its fridge, for the cross-fridge logs.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub fridge_id: i64,
    pub fridge_name: String,
    pub sensor1_temp: f64,
    pub sensor2_temp: f64,
    pub humidity: Option<f64>,
    pub air_temp: Option<f64>,
    pub is_out_of_range: bool,
    pub event_date: DateTime<Utc>,
}
