use axum::{extract::State, http::StatusCode, Json};
use bytes::Bytes;

use crate::errors::AppError;
use crate::models::testimonial::{SubmitTestimonialResponse, Testimonial};
use crate::state::AppState;
use crate::testimonials::queries::{insert_testimonial, list_approved};
use crate::testimonials::validation::parse_submission;

const FETCH_FAILED: &str = "Failed to fetch testimonials";
const SUBMIT_FAILED: &str = "Failed to submit testimonial";
const SUBMITTED_MESSAGE: &str =
    "Testimonial submitted successfully! It will be reviewed before being published.";

/// GET /testimonials
pub async fn handle_list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>, AppError> {
    let store = state.store()?;
    let testimonials = list_approved(store)
        .await
        .map_err(|e| AppError::store(FETCH_FAILED, e))?;
    Ok(Json(testimonials))
}

/// POST /testimonials
///
/// Validation runs before the store is consulted, so a bad body is a 400 even
/// when no database is configured.
pub async fn handle_submit_testimonial(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitTestimonialResponse>), AppError> {
    let new = parse_submission(&body)?;
    let store = state.store()?;
    let testimonial = insert_testimonial(store, &new)
        .await
        .map_err(|e| AppError::store(SUBMIT_FAILED, e))?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitTestimonialResponse {
            success: true,
            message: SUBMITTED_MESSAGE.to_string(),
            testimonial,
        }),
    ))
}

pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
