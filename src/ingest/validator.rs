use serde_json::Value;
use sqlx::PgPool;

use super::IngestError;
use crate::{
    db::models::Fridge,
    fridges,
    validation::{self, FieldErrors, Fields},
};

/// A reading that passed the field checks but is not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingDraft {
    pub fridge_id: i64,
    pub sensor1_temp: f64,
    pub sensor2_temp: f64,
    pub humidity: Option<f64>,
    pub air_temp: Option<f64>,
    pub is_out_of_range: bool,
}

/// A draft bound to the fridge it references.
#[derive(Debug, Clone)]
pub struct ValidatedReading {
    pub fridge: Fridge,
    pub draft: ReadingDraft,
}

/// Check the shape and types of an ingestion payload.
///
/// Every offending field is reported. `is_out_of_range` is taken as sent;
/// it is never derived from the temperatures.
pub fn check_fields(payload: &Value) -> Result<ReadingDraft, FieldErrors> {
    let mut fields = Fields::from_payload(payload)?;

    let fridge_id = fields.required("fridge", validation::primary_key);
    let sensor1_temp = fields.required("sensor1_temp", validation::number);
    let sensor2_temp = fields.required("sensor2_temp", validation::number);
    let humidity = fields.optional("humidity", validation::number);
    let air_temp = fields.optional("air_temp", validation::number);
    let is_out_of_range = fields.required("is_out_of_range", validation::boolean);

    let errors = fields.finish();
    match (fridge_id, sensor1_temp, sensor2_temp, is_out_of_range) {
        (Some(fridge_id), Some(sensor1_temp), Some(sensor2_temp), Some(is_out_of_range))
            if errors.is_empty() =>
        {
            Ok(ReadingDraft {
                fridge_id,
                sensor1_temp,
                sensor2_temp,
                humidity,
                air_temp,
                is_out_of_range,
            })
        }
        _ => Err(errors),
    }
}

/// Check the payload, then resolve the fridge it points at.
pub async fn validate(pool: &PgPool, payload: &Value) -> Result<ValidatedReading, IngestError> {
    let draft = check_fields(payload)?;
    let fridge = fridges::find(pool, draft.fridge_id)
        .await?
        .ok_or(IngestError::FridgeNotFound(draft.fridge_id))?;
    Ok(ValidatedReading { fridge, draft })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validation::{INVALID_BOOL, INVALID_NUMBER, NULL, REQUIRED};

    fn valid() -> Value {
        json!({
            "fridge": 1,
            "sensor1_temp": 4.5,
            "sensor2_temp": 5.0,
            "is_out_of_range": false,
        })
    }

    #[test]
    fn minimal_payload_is_accepted() {
        let draft = check_fields(&valid()).unwrap();
        assert_eq!(
            draft,
            ReadingDraft {
                fridge_id: 1,
                sensor1_temp: 4.5,
                sensor2_temp: 5.0,
                humidity: None,
                air_temp: None,
                is_out_of_range: false,
            }
        );
    }

    #[test]
    fn optional_readings_are_kept() {
        let mut payload = valid();
        payload["humidity"] = json!(61.2);
        payload["air_temp"] = json!("3.1");
        let draft = check_fields(&payload).unwrap();
        assert_eq!(draft.humidity, Some(61.2));
        assert_eq!(draft.air_temp, Some(3.1));
    }

    #[test]
    fn null_optional_readings_are_none() {
        let mut payload = valid();
        payload["humidity"] = Value::Null;
        payload["air_temp"] = Value::Null;
        let draft = check_fields(&payload).unwrap();
        assert_eq!(draft.humidity, None);
        assert_eq!(draft.air_temp, None);
    }

    #[test]
    fn anomaly_flag_is_taken_as_sent() {
        // Temperatures are normal, but the client says it is an emergency.
        let mut payload = valid();
        payload["is_out_of_range"] = json!(true);
        assert!(check_fields(&payload).unwrap().is_out_of_range);

        // And the reverse: extreme temperatures, flag false.
        let mut payload = valid();
        payload["sensor1_temp"] = json!(40.0);
        assert!(!check_fields(&payload).unwrap().is_out_of_range);
    }

    #[test]
    fn missing_sensor_temperatures_are_reported_per_field() {
        let payload = json!({ "fridge": 1, "is_out_of_range": false });
        let errors = check_fields(&payload).unwrap_err();
        assert_eq!(errors.get("sensor1_temp").unwrap(), [REQUIRED.to_owned()]);
        assert_eq!(errors.get("sensor2_temp").unwrap(), [REQUIRED.to_owned()]);
        assert!(!errors.contains("fridge"));
    }

    #[test]
    fn every_bad_field_is_reported_at_once() {
        let payload = json!({
            "fridge": "abc",
            "sensor1_temp": null,
            "sensor2_temp": "cold",
            "humidity": [],
            "air_temp": {},
            "is_out_of_range": "sometimes",
        });
        let errors = check_fields(&payload).unwrap_err();
        assert!(errors.get("fridge").unwrap()[0].starts_with("Incorrect type"));
        assert_eq!(errors.get("sensor1_temp").unwrap(), [NULL.to_owned()]);
        assert_eq!(errors.get("sensor2_temp").unwrap(), [INVALID_NUMBER.to_owned()]);
        assert_eq!(errors.get("humidity").unwrap(), [INVALID_NUMBER.to_owned()]);
        assert_eq!(errors.get("air_temp").unwrap(), [INVALID_NUMBER.to_owned()]);
        assert_eq!(errors.get("is_out_of_range").unwrap(), [INVALID_BOOL.to_owned()]);
    }

    #[test]
    fn invalid_optional_field_fails_the_whole_payload() {
        let mut payload = valid();
        payload["humidity"] = json!("damp");
        let errors = check_fields(&payload).unwrap_err();
        assert!(errors.contains("humidity"));
    }

    #[test]
    fn missing_anomaly_flag_is_required() {
        let payload = json!({ "fridge": 1, "sensor1_temp": 1, "sensor2_temp": 2 });
        let errors = check_fields(&payload).unwrap_err();
        assert_eq!(errors.get("is_out_of_range").unwrap(), [REQUIRED.to_owned()]);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let errors = check_fields(&json!("reading")).unwrap_err();
        assert!(errors.contains(validation::NON_FIELD_ERRORS));
    }
}
