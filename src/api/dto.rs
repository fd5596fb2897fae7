use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    db::models::{Fridge, LogEntry},
    fridges::NewFridge,
};

/// Timestamp format used in the daily-log JSON records.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Body of `POST /api/readings`.
///
/// Documentation only: the handler reads the body as loose JSON so that every
/// malformed field can be reported, not just the first one serde trips over.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReadingPayload {
    /// Fridge primary key.
    pub fridge: i64,
    /// Degrees Celsius
    pub sensor1_temp: f64,
    /// Degrees Celsius
    pub sensor2_temp: f64,
    /// Client-asserted emergency flag; triggers a Telegram alert when `true`.
    pub is_out_of_range: bool,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    /// Degrees Celsius
    pub air_temp: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FridgeDto {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl From<Fridge> for FridgeDto {
    fn from(f: Fridge) -> Self {
        Self {
            id: f.id,
            name: f.name,
            location: f.location,
            image: f.image,
        }
    }
}

/// Body of `POST /api/fridges`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFridgeRequest {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Path or URL of a picture of the unit.
    #[serde(default)]
    pub image: Option<String>,
}

impl From<CreateFridgeRequest> for NewFridge {
    fn from(r: CreateFridgeRequest) -> Self {
        Self {
            name: r.name,
            location: r.location,
            image: r.image,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FridgeListParams {
    /// Exact location to filter by.
    pub location: Option<String>,
}

/// Query string shared by the three read paths. Kept as raw strings: each
/// path has its own policy for values that do not parse.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogParams {
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive up to 23:59:59.
    pub end_date: Option<String>,
    /// 1-based page number; clamped into range.
    pub page: Option<String>,
}

impl LogParams {
    /// Build from raw query pairs. A repeated key keeps its last value and
    /// unknown keys are ignored, so no query string is ever rejected.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "start_date" => params.start_date = Some(value),
                "end_date" => params.end_date = Some(value),
                "page" => params.page = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// One row of the daily log in its JSON form.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyRecordDto {
    pub fridge_name: String,
    pub sensor1_temp: f64,
    pub sensor2_temp: f64,
    pub humidity: Option<f64>,
    pub air_temp: Option<f64>,
    /// Local time, `YYYY-MM-DD HH:MM`.
    pub event_date: String,
    pub is_out_of_range: bool,
}

impl DailyRecordDto {
    pub fn new(entry: LogEntry, tz: FixedOffset) -> Self {
        Self {
            event_date: entry
                .event_date
                .with_timezone(&tz)
                .format(RECORD_TIME_FORMAT)
                .to_string(),
            fridge_name: entry.fridge_name,
            sensor1_temp: entry.sensor1_temp,
            sensor2_temp: entry.sensor2_temp,
            humidity: entry.humidity,
            air_temp: entry.air_temp,
            is_out_of_range: entry.is_out_of_range,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyRecordsResponse {
    pub records: Vec<DailyRecordDto>,
}
