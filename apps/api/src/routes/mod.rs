pub mod health;

use axum::{
    http::{header, Method},
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;
use crate::testimonials::handlers::{
    handle_list_testimonials, handle_method_not_allowed, handle_submit_testimonial,
};

/// Open cross-origin policy: any origin, `Content-Type` header, GET/POST/OPTIONS.
/// The layer answers every OPTIONS request itself with an empty 200.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}

fn testimonials_routes() -> MethodRouter<AppState> {
    get(handle_list_testimonials)
        .post(handle_submit_testimonial)
        .fallback(handle_method_not_allowed)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/testimonials", testimonials_routes())
        // Legacy serverless function paths used by existing front-ends
        .route(
            "/.netlify/functions/get-testimonials",
            get(handle_list_testimonials)
                        .fallback(handle_method_not_allowed),
        )
        .route(
            "/.netlify/functions/submit-testimonial",
            post(handle_submit_testimonial)
                        .fallback(handle_method_not_allowed),
        )
        .with_state(state)
        .layer(cors_layer())
}
