use sqlx::PgPool;

use crate::{
    db::models::Fridge,
    validation::{FieldErrors, BLANK},
};

const NAME_MAX_CHARS: usize = 100;
const LOCATION_MAX_CHARS: usize = 255;

/// Input for registering a fridge.
#[derive(Debug, Clone)]
pub struct NewFridge {
    pub name: String,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl NewFridge {
    /// Trims every field, maps empty optional fields to `None`, and enforces
    /// the column limits.
    pub fn normalize(self) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim().to_owned();
        if name.is_empty() {
            errors.add("name", BLANK);
        } else if name.chars().count() > NAME_MAX_CHARS {
            errors.add("name", too_long(NAME_MAX_CHARS));
        }

        let location = blank_to_none(self.location);
        if location
            .as_deref()
            .is_some_and(|l| l.chars().count() > LOCATION_MAX_CHARS)
        {
            errors.add("location", too_long(LOCATION_MAX_CHARS));
        }

        let image = blank_to_none(self.image);

        errors.into_result(Self {
            name,
            location,
            image,
        })
    }
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Fridge>, sqlx::Error> {
    sqlx::query_as::<_, Fridge>("SELECT id, name, location, image FROM fridges WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All fridges ordered by id, optionally restricted to one location.
pub async fn list(pool: &PgPool, location: Option<&str>) -> Result<Vec<Fridge>, sqlx::Error> {
    sqlx::query_as::<_, Fridge>(
        r#"
        SELECT id, name, location, image
        FROM fridges
        WHERE ($1::text IS NULL OR location = $1)
        ORDER BY id
        "#,
    )
    .bind(location)
    .fetch_all(pool)
    .await
}

pub async fn create(pool: &PgPool, fridge: &NewFridge) -> Result<Fridge, sqlx::Error> {
    sqlx::query_as::<_, Fridge>(
        r#"
        INSERT INTO fridges (name, location, image)
        VALUES ($1, $2, $3)
        RETURNING id, name, location, image
        "#,
    )
    .bind(&fridge.name)
    .bind(&fridge.location)
    .bind(&fridge.image)
    .fetch_one(pool)
    .await
}

/// Deletes the fridge and, through the foreign key, all of its readings.
/// Returns `false` when no such fridge existed.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM fridges WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
