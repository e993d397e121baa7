use serde_json::Value;
use tracing::info;

use crate::models::testimonial::{NewTestimonial, Testimonial};
use crate::store::{QueryExecutor, Row, SqlParam, StoreError};

/// Number of approved testimonials returned by a listing.
pub const APPROVED_PAGE_SIZE: usize = 10;

/// New rows always start unapproved; only external moderation flips the flag.
pub const INSERT_TESTIMONIAL: &str = r#"
    INSERT INTO testimonials (name, position, company, message, rating, approved, created_at)
    VALUES ($1, $2, $3, $4, $5, false, NOW())
    RETURNING id, name, position, company, message, rating, created_at
"#;

pub const LIST_APPROVED: &str = r#"
    SELECT id, name, position, company, message, rating, created_at
    FROM testimonials
    WHERE approved = true
    ORDER BY created_at DESC
    LIMIT 10
"#;

/// Inserts a pending testimonial and returns the stored row.
pub async fn insert_testimonial(
    store: &dyn QueryExecutor,
    new: &NewTestimonial,
) -> Result<Testimonial, StoreError> {
    let params = [
        SqlParam::Text(new.name.clone()),
        SqlParam::NullableText(new.position.clone()),
        SqlParam::NullableText(new.company.clone()),
        SqlParam::Text(new.message.clone()),
        SqlParam::Int(new.rating),
    ];

    let row = store
        .query(INSERT_TESTIMONIAL, &params)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))?;

    let testimonial = decode_testimonial(row)?;
    info!(
        "Inserted testimonial {} (rating {}) pending review",
        testimonial.id, testimonial.rating
    );
    Ok(testimonial)
}

/// Returns the most recent approved testimonials, newest first.
pub async fn list_approved(store: &dyn QueryExecutor) -> Result<Vec<Testimonial>, StoreError> {
    store
        .query(LIST_APPROVED, &[])
        .await?
        .into_iter()
        .map(decode_testimonial)
        .collect()
}

fn decode_testimonial(row: Row) -> Result<Testimonial, StoreError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}
